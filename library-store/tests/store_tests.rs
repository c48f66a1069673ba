//! Backend client tests against a mock REST surface.
//!
//! wiremock stands in for the backend so the tests can check the exact
//! PostgREST requests the client sends and how it reacts to failures.
//!
//! Covered:
//! 1. Reference lookups by id and by name
//! 2. Scope resolution end to end, including fail-open on server errors
//! 3. Active-company queries for subspecialty and empty scopes
//! 4. Profile reads through the lenient boundary

use library_catalog::Profile;
use library_rbac::{Role, UserType};
use library_store::{
    fetch_active_companies, fetch_profile, RestReferenceLookup, RetryConfig, StoreClient,
    StoreConfig, StoreError,
};
use library_visibility::{LookupError, NamedRef, ReferenceLookup, Scope, ScopeResolver};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANON_KEY: &str = "test-anon-key";

/// Test fixture providing a mock backend.
struct TestFixture {
    server: MockServer,
    client: StoreClient,
}

impl TestFixture {
    async fn new() -> Self {
        let server = MockServer::start().await;
        let client = StoreClient::new(StoreConfig::new(server.uri(), ANON_KEY))
            .unwrap()
            .with_retry(RetryConfig {
                max_attempts: 2,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                exponential_base: 2.0,
            });
        Self { server, client }
    }

    fn lookup(&self) -> RestReferenceLookup {
        RestReferenceLookup::new(self.client.clone())
    }

    async fn mount_rows(&self, table: &str, filters: &[(&str, &str)], body: serde_json::Value) {
        let mut mock = Mock::given(method("GET")).and(path(format!("/rest/v1/{}", table)));
        for (key, value) in filters {
            mock = mock.and(query_param(*key, *value));
        }
        mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}

// ============================================================================
// Reference lookups
// ============================================================================

#[tokio::test]
async fn test_subspecialty_by_id() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/subspecialties"))
        .and(query_param("select", "id,name"))
        .and(query_param("id", "eq.sub-1"))
        .and(query_param("limit", "1"))
        .and(header("apikey", ANON_KEY))
        .and(header("Authorization", "Bearer test-anon-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": "sub-1", "name": "Foot and Ankle" }])),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;

    let found = fixture.lookup().subspecialty("sub-1").await.unwrap();
    assert_eq!(found, Some(NamedRef::new("sub-1", "Foot and Ankle")));
}

#[tokio::test]
async fn test_missing_row_is_none() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_rows("specialties", &[("id", "eq.nope")], json!([]))
        .await;

    assert_eq!(fixture.lookup().specialty("nope").await, Ok(None));
}

#[tokio::test]
async fn test_name_search_uses_ilike() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_rows(
            "subspecialties",
            &[
                ("specialty_id", "eq.spec-ortho"),
                ("name", "ilike.foot and ankle"),
                ("order", "id.asc"),
                ("limit", "1"),
            ],
            json!([{ "id": "fa-123", "name": "Foot and Ankle" }]),
        )
        .await;

    let found = fixture
        .lookup()
        .find_subspecialty_by_name("spec-ortho", "foot and ankle")
        .await
        .unwrap();
    assert_eq!(found.map(|r| r.id), Some("fa-123".to_string()));
}

#[tokio::test]
async fn test_malformed_body_is_reported() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&fixture.server)
        .await;

    assert!(matches!(
        fixture.lookup().specialty("spec-1").await,
        Err(LookupError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let result: Result<Vec<NamedRef>, StoreError> =
        fixture.client.select("specialties", "id,name", &[]).await;
    assert!(matches!(result, Err(StoreError::AuthenticationFailed)));
}

#[tokio::test]
async fn test_access_token_is_bearer() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .and(header("apikey", ANON_KEY))
        .and(header("Authorization", "Bearer user-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let client = fixture.client.with_access_token("user-jwt");
    let rows: Vec<NamedRef> = client.select("specialties", "id,name", &[]).await.unwrap();
    assert!(rows.is_empty());
}

// ============================================================================
// Scope resolution over REST
// ============================================================================

#[tokio::test]
async fn test_podiatry_resolves_to_foot_and_ankle() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_rows(
            "specialties",
            &[("id", "eq.spec-pod")],
            json!([{ "id": "spec-pod", "name": "Podiatry" }]),
        )
        .await;
    fixture
        .mount_rows("specialties", &[("name", "ilike.orthopaedic surgery")], json!([]))
        .await;
    fixture
        .mount_rows(
            "specialties",
            &[("name", "ilike.orthopedic surgery")],
            json!([{ "id": "spec-ortho", "name": "Orthopedic Surgery" }]),
        )
        .await;
    fixture
        .mount_rows(
            "subspecialties",
            &[("specialty_id", "eq.spec-ortho"), ("name", "ilike.foot and ankle")],
            json!([{ "id": "fa-123", "name": "Foot and Ankle" }]),
        )
        .await;

    let resolver = ScopeResolver::new(fixture.lookup());
    let profile = Profile::new("u1", "u1@example.com").with_specialty("spec-pod");

    assert_eq!(resolver.resolve_scope(&profile).await, Scope::subspecialty("fa-123"));
}

#[tokio::test]
async fn test_server_error_fails_open() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/subspecialties"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .expect(2)
        .mount(&fixture.server)
        .await;

    let resolver = ScopeResolver::new(fixture.lookup());
    let profile = Profile::new("u1", "u1@example.com").with_subspecialty("sub-1");

    assert_eq!(resolver.resolve_scope(&profile).await, Scope::all());
}

#[tokio::test]
async fn test_generalist_subspecialty_loads_all() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_rows(
            "subspecialties",
            &[("id", "eq.gen-1")],
            json!([{ "id": "gen-1", "name": "GENERALIST" }]),
        )
        .await;

    let resolver = ScopeResolver::new(fixture.lookup());
    let profile = Profile::new("u1", "u1@example.com").with_subspecialty("gen-1");

    assert_eq!(resolver.resolve_scope(&profile).await, Scope::all());
}

// ============================================================================
// Active companies
// ============================================================================

#[tokio::test]
async fn test_active_companies_for_subspecialty() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_rows(
            "company_contacts",
            &[("subspecialty_id", "eq.sub-1")],
            json!([
                {
                    "id": "rc-1",
                    "company_id": "co-1",
                    "subspecialty_id": "sub-1",
                    "name": "Pat Rep",
                    "email": "pat@acme.example",
                    "phone": null
                },
                {
                    "id": "rc-2",
                    "company_id": "co-1",
                    "subspecialty_id": "sub-1",
                    "name": "Sam Rep",
                    "email": "sam@acme.example",
                    "phone": "555-0100"
                }
            ]),
        )
        .await;
    fixture
        .mount_rows(
            "companies",
            &[("id", "in.(\"co-1\")")],
            json!([{ "id": "co-1", "name": "Acme Ortho" }]),
        )
        .await;

    let active = fetch_active_companies(&fixture.client, &Scope::subspecialty("sub-1"))
        .await
        .unwrap();

    assert_eq!(active.len(), 1);
    assert!(active.contains("acme ortho"));
    assert!(!active.contains("Other Co"));
}

#[tokio::test]
async fn test_catalog_wide_scope_keeps_contact_subspecialty() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_rows(
            "company_contacts",
            &[],
            json!([{
                "id": "rc-1",
                "company_id": "co-1",
                "subspecialty_id": "fa-123",
                "name": "Pat Rep",
                "email": "pat@acme.example",
                "phone": null
            }]),
        )
        .await;
    fixture
        .mount_rows("companies", &[], json!([{ "id": "co-1", "name": "Acme Ortho" }]))
        .await;

    let active = fetch_active_companies(&fixture.client, &Scope::all()).await.unwrap();

    assert!(active.contains("Acme Ortho"));
    assert!(active.contains_in("Acme Ortho", "fa-123"));
    assert!(!active.contains_in("Acme Ortho", "hand"));
}

#[tokio::test]
async fn test_no_contacts_skips_company_query() {
    let fixture = TestFixture::new().await;
    fixture.mount_rows("company_contacts", &[], json!([])).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&fixture.server)
        .await;

    let active = fetch_active_companies(&fixture.client, &Scope::all()).await.unwrap();
    assert!(active.is_empty());
}

#[tokio::test]
async fn test_empty_scope_skips_backend() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&fixture.server)
        .await;

    let active = fetch_active_companies(&fixture.client, &Scope::nothing())
        .await
        .unwrap();
    assert!(active.is_empty());
}

// ============================================================================
// Profiles
// ============================================================================

#[tokio::test]
async fn test_profile_read_is_lenient() {
    let fixture = TestFixture::new().await;
    fixture
        .mount_rows(
            "profiles",
            &[("id", "eq.u1")],
            json!([{
                "id": "u1",
                "email": "u1@example.com",
                "role": 42,
                "user_type": "Surgeon ",
                "subspecialty_id": "sub-1"
            }]),
        )
        .await;

    let profile = fetch_profile(&fixture.client, "u1").await.unwrap().unwrap();
    assert_eq!(profile.role, Role::User);
    assert_eq!(profile.user_type, Some(UserType::Surgeon));
    assert_eq!(profile.subspecialty_id.as_deref(), Some("sub-1"));
}

#[tokio::test]
async fn test_missing_profile_is_none() {
    let fixture = TestFixture::new().await;
    fixture.mount_rows("profiles", &[("id", "eq.ghost")], json!([])).await;

    assert!(fetch_profile(&fixture.client, "ghost").await.unwrap().is_none());
}
