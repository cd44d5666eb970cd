// crates.io
use time::macros;
// self
use laptop_catalog::{
	_preludet::*,
	auth::{
		AccessPolicy, Argon2Scheme, AuthenticatedMethods, JwtManager, RequestAuthorizer, Role,
		TokenSecret, User, Username,
	},
	catalog::Filter,
	client::LaptopClient,
	rpc::{self, Method},
	sample,
	service::{CreateLaptopRequest, LoginRequest, SearchLaptopRequest},
};

fn create_request(token: Option<&str>) -> Request<CreateLaptopRequest> {
	let mut request = Request::new(CreateLaptopRequest { laptop: sample::new_laptop() });

	if let Some(token) = token {
		rpc::attach_bearer(request.metadata_mut(), token).expect("Token should be valid metadata.");
	}

	request
}

#[tokio::test]
async fn protected_method_requires_token_and_role() {
	let dir = tempfile::tempdir().expect("Temporary image folder should be created.");
	let services = build_test_services(dir.path()).await;
	let missing = services
		.laptop
		.create_laptop(create_request(None))
		.await
		.expect_err("Calls without a token must be rejected.");

	assert_eq!(missing.code(), Code::Unauthenticated);

	let garbage = services
		.laptop
		.create_laptop(create_request(Some("not-a-token")))
		.await
		.expect_err("Unverifiable tokens must be rejected.");

	assert_eq!(garbage.code(), Code::Unauthenticated);

	let (_, user) = build_test_client(&services, USER).await;
	let denied = services
		.laptop
		.create_laptop(create_request(Some(user.current_token().expose())))
		.await
		.expect_err("The user role must not create laptops.");

	assert_eq!(denied.code(), Code::PermissionDenied);

	let (_, admin) = build_test_client(&services, ADMIN).await;

	services
		.laptop
		.create_laptop(create_request(Some(admin.current_token().expose())))
		.await
		.expect("The admin role may create laptops.");
}

#[tokio::test]
async fn public_methods_need_no_token() {
	let dir = tempfile::tempdir().expect("Temporary image folder should be created.");
	let services = build_test_services(dir.path()).await;
	let response = services
		.laptop
		.search_laptop(Request::new(SearchLaptopRequest { filter: Filter::default() }))
		.await
		.expect("Search is public.");

	assert!(response.into_inner().next().await.is_none());

	let token = services
		.auth
		.login(Request::new(LoginRequest {
			username: ADMIN.0.into(),
			password: TokenSecret::new(ADMIN.1),
		}))
		.await
		.expect("Login is public.")
		.into_inner()
		.access_token;

	assert!(!token.expose().is_empty());
}

#[tokio::test]
async fn login_rejects_unknown_users_and_bad_passwords() {
	let dir = tempfile::tempdir().expect("Temporary image folder should be created.");
	let services = build_test_services(dir.path()).await;
	let login = |username: &str, password: &str| {
		services.auth.login(Request::new(LoginRequest {
			username: username.into(),
			password: TokenSecret::new(password),
		}))
	};

	assert_eq!(
		login("nobody", "x").await.expect_err("Unknown users must fail.").code(),
		Code::NotFound
	);
	assert_eq!(
		login(ADMIN.0, "wrong").await.expect_err("Bad passwords must fail.").code(),
		Code::Unauthenticated
	);
}

#[tokio::test]
async fn token_is_rejected_at_and_after_expiry() {
	let admin = User::new(
		Username::new("admin").expect("Username fixture should be valid."),
		"pw",
		Role::admin(),
		&Argon2Scheme,
	)
	.expect("Hashing should succeed.");

	let jwt = JwtManager::new(TEST_SECRET, Duration::minutes(20));
	let authorizer = RequestAuthorizer::new(jwt.clone(), AccessPolicy::default());
	let issued = macros::datetime!(2025-03-01 08:00 UTC);
	let token = jwt.issue_at(&admin, issued).expect("Signing should succeed.");
	let mut metadata = tonic::metadata::MetadataMap::new();

	rpc::attach_bearer(&mut metadata, token.expose()).expect("Token should be valid metadata.");

	authorizer
		.authorize_at(Method::CreateLaptop, &metadata, issued + Duration::minutes(19))
		.expect("Token should be valid before expiry.");

	for later in [Duration::minutes(20), Duration::hours(3)] {
		let status = authorizer
			.authorize_at(Method::CreateLaptop, &metadata, issued + later)
			.expect_err("Expired tokens must be rejected.");

		assert_eq!(status.code(), Code::Unauthenticated);
	}

	// A token minted long ago is also rejected by the live services.
	let dir = tempfile::tempdir().expect("Temporary image folder should be created.");
	let services = build_test_services(dir.path()).await;
	let stale = jwt
		.issue_at(&admin, OffsetDateTime::now_utc() - Duration::hours(1))
		.expect("Signing should succeed.");
	let status = services
		.laptop
		.create_laptop(create_request(Some(stale.expose())))
		.await
		.expect_err("Stale tokens must be rejected.");

	assert_eq!(status.code(), Code::Unauthenticated);
}

#[tokio::test]
async fn client_without_coverage_is_detected_up_front() {
	let dir = tempfile::tempdir().expect("Temporary image folder should be created.");
	let services = build_test_services(dir.path()).await;
	let config = test_client_config(ADMIN);
	let policy = services.authorizer.policy();

	policy
		.verify_client_coverage(&config.authenticated_methods)
		.expect("Default client set should cover the default rules.");

	let misspelled = AuthenticatedMethods::from_paths([
		" /techschool.pcbook.LaptopService/CreateLaptop",
	]);

	assert!(misspelled.is_err(), "A mangled path must not silently skip authentication.");

	let partial = AuthenticatedMethods::new([Method::CreateLaptop]);

	assert!(policy.verify_client_coverage(&partial).is_err());

	// Without a refresher the client sends no token and is rejected.
	let anonymous = LaptopClient::new(services.laptop.clone(), &config);
	let err = anonymous
		.create_laptop(sample::new_laptop())
		.await
		.expect_err("Anonymous create must fail.");

	assert!(matches!(err, Error::Rpc(status) if status.code() == Code::Unauthenticated));
}
