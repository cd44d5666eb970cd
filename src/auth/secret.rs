//! Redacted wrapper for bearer tokens and passwords.

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Secret string kept out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Short SHA-256 fingerprint that identifies the secret in logs without revealing it.
	pub fn fingerprint(&self) -> String {
		Sha256::digest(self.0.as_bytes()).iter().take(6).map(|b| format!("{b:02x}")).collect()
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn fingerprint_is_stable_and_short() {
		let a = TokenSecret::new("token-a");

		assert_eq!(a.fingerprint().len(), 12);
		assert_eq!(a.fingerprint(), TokenSecret::new("token-a").fingerprint());
		assert_ne!(a.fingerprint(), TokenSecret::new("token-b").fingerprint());
		assert!(!a.fingerprint().contains("token"));
	}
}
