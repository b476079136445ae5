mod common;

use common::TestApp;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn mount_token(app: &TestApp, expected_calls: u64) {
    mount_token_lasting(app, 3600, expected_calls).await;
}

async fn mount_token_lasting(app: &TestApp, expires_in: u64, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/v2/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(query_param("refresh_token", "test-refresh"))
        .and(query_param("client_id", "test-client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "zoho-at-1",
            "expires_in": expires_in,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(&app.zoho)
        .await;
}

async fn mount_items(app: &TestApp) {
    Mock::given(method("GET"))
        .and(path("/books/v3/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "success",
            "items": [{ "item_id": "1", "name": "Old Monk 500ml", "rate": 15.99 }]
        })))
        .mount(&app.zoho)
        .await;
}

#[tokio::test]
async fn customers_are_flattened_and_token_is_reused() {
    let app = TestApp::spawn().await;
    mount_token(&app, 1).await;

    Mock::given(method("GET"))
        .and(path("/books/v3/contacts"))
        .and(query_param("contact_type", "customer"))
        .and(query_param("organization_id", "60000001"))
        .and(header("authorization", "Zoho-oauthtoken zoho-at-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "success",
            "contacts": [{
                "contact_id": "4600001",
                "contact_name": "Total Wines & More",
                "phone": "",
                "mobile": "305-555-0199",
                "email": "orders@totalwine.com",
                "billing_address": {
                    "address": "1 Vine St",
                    "city": "Miami",
                    "state": "FL",
                    "zip": "33101",
                    "country": "USA"
                }
            }]
        })))
        .expect(2)
        .mount(&app.zoho)
        .await;

    for _ in 0..2 {
        let response = app
            .client
            .get(app.url("/api/zoho-customers"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body["customers"][0],
            json!({
                "id": "4600001",
                "name": "Total Wines & More",
                "email": "orders@totalwine.com",
                "phone": "305-555-0199",
                "address": "1 Vine St, Miami, FL 33101"
            })
        );
    }
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let app = TestApp::spawn().await;
    mount_token(&app, 1).await;
    mount_items(&app).await;

    let url = app.url("/api/zoho-items");
    let calls = (0..5).map(|_| app.client.get(&url).send());
    for response in spawn_all(calls).await {
        assert_eq!(response.unwrap().status().as_u16(), 200);
    }
}

async fn spawn_all<F, T>(futures: impl Iterator<Item = F>) -> Vec<T>
where
    F: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = futures.map(tokio::spawn).collect();
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test]
async fn zoho_error_code_is_bad_gateway() {
    let app = TestApp::spawn().await;
    mount_token(&app, 1).await;

    Mock::given(method("GET"))
        .and(path("/books/v3/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 57,
            "message": "You are not authorized to perform this operation"
        })))
        .mount(&app.zoho)
        .await;

    let response = app
        .client
        .get(app.url("/api/zoho-customers"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("You are not authorized"));
}

#[tokio::test]
async fn failed_token_refresh_is_bad_gateway() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/oauth/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "invalid_code" })))
        .mount(&app.zoho)
        .await;

    let response = app
        .client
        .get(app.url("/api/zoho-items"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 502);
}

#[tokio::test]
async fn token_within_refresh_margin_is_not_reused() {
    let app = TestApp::spawn().await;
    // 300 s is all margin, so the token is stale as soon as it arrives.
    mount_token_lasting(&app, 300, 2).await;
    mount_items(&app).await;

    for _ in 0..2 {
        let response = app.client.get(app.url("/api/zoho-items")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }
}

#[tokio::test]
async fn books_unauthorized_forces_a_new_token() {
    let app = TestApp::spawn().await;
    mount_token(&app, 2).await;

    Mock::given(method("GET"))
        .and(path("/books/v3/items"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 57,
            "message": "You are not authorized to perform this operation"
        })))
        .up_to_n_times(1)
        .mount(&app.zoho)
        .await;
    mount_items(&app).await;

    let rejected = app.client.get(app.url("/api/zoho-items")).send().await.unwrap();
    assert_eq!(rejected.status().as_u16(), 502);

    let retried = app.client.get(app.url("/api/zoho-items")).send().await.unwrap();
    assert_eq!(retried.status().as_u16(), 200);
    let body: Value = retried.json().await.unwrap();
    assert_eq!(body["items"][0]["name"], "Old Monk 500ml");
}
