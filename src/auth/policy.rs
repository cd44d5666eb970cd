//! Per-method access rules and the client-side set of methods that carry a token.

// std
use std::collections::BTreeMap;
// self
use crate::{_prelude::*, auth::Role, error::ConfigError, rpc::Method};

/// Maps each protected method to the roles allowed to invoke it.
///
/// Methods without a rule are public. Deserializes from a method-path → roles map.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<Role>>")]
pub struct AccessPolicy {
	rules: HashMap<Method, BTreeSet<Role>>,
}
impl AccessPolicy {
	/// Creates a policy where every method is public.
	pub fn public() -> Self {
		Self { rules: HashMap::new() }
	}

	/// Restricts `method` to `roles`, replacing any previous rule.
	pub fn allow(mut self, method: Method, roles: impl IntoIterator<Item = Role>) -> Self {
		self.rules.insert(method, roles.into_iter().collect());

		self
	}

	/// Builds a policy from method paths, rejecting unknown paths and empty role sets.
	pub fn from_paths(rules: &BTreeMap<String, Vec<Role>>) -> Result<Self, ConfigError> {
		let mut policy = Self::public();

		for (path, roles) in rules {
			let method = Method::from_path(path)?;

			if roles.is_empty() {
				return Err(ConfigError::EmptyRoleSet { method: method.path() });
			}

			policy = policy.allow(method, roles.iter().cloned());
		}

		Ok(policy)
	}

	/// Roles allowed to call `method`, or `None` when the method is public.
	pub fn allowed_roles(&self, method: Method) -> Option<&BTreeSet<Role>> {
		self.rules.get(&method)
	}

	/// Returns `true` when `method` requires a token.
	pub fn is_protected(&self, method: Method) -> bool {
		self.rules.contains_key(&method)
	}

	/// Fails when a protected method is missing from the client's authenticated set.
	///
	/// Such a client would always be rejected with `Unauthenticated` on that method.
	pub fn verify_client_coverage(&self, client: &AuthenticatedMethods) -> Result<(), ConfigError> {
		let mut protected = self.rules.keys().copied().collect::<Vec<_>>();

		protected.sort();

		match protected.into_iter().find(|method| !client.contains(*method)) {
			Some(method) => Err(ConfigError::UnauthenticatedMethod { method: method.path() }),
			None => Ok(()),
		}
	}
}
impl TryFrom<BTreeMap<String, Vec<Role>>> for AccessPolicy {
	type Error = ConfigError;

	fn try_from(rules: BTreeMap<String, Vec<Role>>) -> Result<Self, Self::Error> {
		Self::from_paths(&rules)
	}
}
impl Default for AccessPolicy {
	fn default() -> Self {
		Self::public()
			.allow(Method::CreateLaptop, [Role::admin()])
			.allow(Method::UploadImage, [Role::admin()])
			.allow(Method::RateLaptop, [Role::admin(), Role::user()])
	}
}

/// Methods for which the client attaches its session token.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct AuthenticatedMethods(BTreeSet<Method>);
impl AuthenticatedMethods {
	/// Creates a set from method identifiers.
	pub fn new(methods: impl IntoIterator<Item = Method>) -> Self {
		Self(methods.into_iter().collect())
	}

	/// Parses method paths, rejecting anything that is not an exposed method.
	pub fn from_paths<I, S>(paths: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		paths
			.into_iter()
			.map(|path| Method::from_path(path.as_ref()))
			.collect::<Result<BTreeSet<_>, _>>()
			.map(Self)
	}

	/// Returns `true` when calls to `method` carry the token.
	pub fn contains(&self, method: Method) -> bool {
		self.0.contains(&method)
	}

	/// Iterates the methods in the set.
	pub fn iter(&self) -> impl Iterator<Item = Method> + '_ {
		self.0.iter().copied()
	}
}
impl TryFrom<Vec<String>> for AuthenticatedMethods {
	type Error = ConfigError;

	fn try_from(paths: Vec<String>) -> Result<Self, Self::Error> {
		Self::from_paths(paths)
	}
}
impl Default for AuthenticatedMethods {
	fn default() -> Self {
		Self::new([Method::CreateLaptop, Method::UploadImage, Method::RateLaptop])
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_rules_protect_mutating_methods() {
		let policy = AccessPolicy::default();

		assert!(!policy.is_protected(Method::SearchLaptop));
		assert!(!policy.is_protected(Method::Login));
		assert_eq!(
			policy.allowed_roles(Method::CreateLaptop).map(|roles| roles.len()),
			Some(1)
		);
		assert!(
			policy
				.allowed_roles(Method::RateLaptop)
				.is_some_and(|roles| roles.contains("user") && roles.contains("admin"))
		);
	}

	#[test]
	fn from_paths_rejects_mangled_paths_and_empty_rules() {
		let mut rules = BTreeMap::new();

		rules.insert(" /techschool.pcbook.LaptopService/CreateLaptop".to_owned(), vec![Role::admin()]);

		assert!(matches!(
			AccessPolicy::from_paths(&rules),
			Err(ConfigError::UnknownMethod { .. })
		));

		let mut rules = BTreeMap::new();

		rules.insert(Method::UploadImage.path().to_owned(), Vec::new());

		assert!(matches!(
			AccessPolicy::from_paths(&rules),
			Err(ConfigError::EmptyRoleSet { method }) if method == Method::UploadImage.path()
		));
	}

	#[test]
	fn client_coverage_reports_first_gap() {
		let policy = AccessPolicy::default();

		policy
			.verify_client_coverage(&AuthenticatedMethods::default())
			.expect("Default client set should cover default rules.");

		let partial = AuthenticatedMethods::new([Method::CreateLaptop, Method::RateLaptop]);
		let err = policy
			.verify_client_coverage(&partial)
			.expect_err("Missing upload coverage must be reported.");

		assert!(matches!(
			err,
			ConfigError::UnauthenticatedMethod { method } if method == Method::UploadImage.path()
		));
		assert!(
			AccessPolicy::public().verify_client_coverage(&AuthenticatedMethods::new([])).is_ok()
		);
	}

	#[test]
	fn authenticated_methods_parse_paths() {
		let methods = AuthenticatedMethods::from_paths([
			"/techschool.pcbook.LaptopService/CreateLaptop",
			"/techschool.pcbook.LaptopService/RateLaptop",
		])
		.expect("Exposed paths should parse.");

		assert!(methods.contains(Method::CreateLaptop));
		assert!(!methods.contains(Method::UploadImage));
		assert_eq!(methods.iter().count(), 2);
		assert!(AuthenticatedMethods::from_paths(["/x/y"]).is_err());
	}

	#[test]
	fn policy_deserializes_from_path_map() {
		let policy: AccessPolicy = serde_json::from_str(
			r#"{"/techschool.pcbook.LaptopService/SearchLaptop":["user"]}"#,
		)
		.expect("Known path should deserialize.");

		assert!(policy.is_protected(Method::SearchLaptop));
		assert!(!policy.is_protected(Method::CreateLaptop));
		assert!(
			serde_json::from_str::<AccessPolicy>(r#"{"LaptopService/SearchLaptop":["user"]}"#)
				.is_err()
		);
	}
}
