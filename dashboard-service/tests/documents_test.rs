mod common;

use common::TestApp;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn pdf_part(name: &str) -> Part {
    Part::bytes(b"%PDF-1.4 test".to_vec())
        .file_name(name.to_string())
        .mime_str("application/pdf")
        .unwrap()
}

#[tokio::test]
async fn single_pdf_is_forwarded() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/api/upload-process-pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "processed" })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app
        .client
        .post(app.url("/api/upload-process-pdf"))
        .multipart(Form::new().part("pdf", pdf_part("order.pdf")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "processed");

    let received = app.backend.received_requests().await.unwrap();
    let forwarded = String::from_utf8_lossy(&received[0].body);
    assert!(forwarded.contains("name=\"pdf\""));
    assert!(forwarded.contains("filename=\"order.pdf\""));
}

#[tokio::test]
async fn non_pdf_upload_is_rejected() {
    let app = TestApp::spawn().await;

    let part = Part::bytes(b"hello".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();
    let response = app
        .client
        .post(app.url("/api/upload-process-pdf"))
        .multipart(Form::new().part("pdf", part))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn batch_over_the_file_limit_is_rejected() {
    let app = TestApp::spawn().await;

    let mut form = Form::new();
    for i in 0..4 {
        form = form.part("pdfs", pdf_part(&format!("order-{}.pdf", i)));
    }
    let response = app
        .client
        .post(app.url("/api/process-folder-pdfs"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Too many files. Maximum is 3");
}

#[tokio::test]
async fn batch_is_forwarded_with_every_file() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/api/process-folder-pdfs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "processed": 2 })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let form = Form::new()
        .part("pdfs", pdf_part("a.pdf"))
        .part("pdfs", pdf_part("b.pdf"));
    let response = app
        .client
        .post(app.url("/api/process-folder-pdfs"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let received = app.backend.received_requests().await.unwrap();
    let forwarded = String::from_utf8_lossy(&received[0].body);
    assert!(forwarded.contains("filename=\"a.pdf\""));
    assert!(forwarded.contains("filename=\"b.pdf\""));
}

#[tokio::test]
async fn voice_without_input_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/voice"))
        .multipart(Form::new().text("text", "  "))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Please either record/upload voice or enter text");
}

#[tokio::test]
async fn voice_transcript_result_becomes_a_draft() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/api/voice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "purchase_order": {
                "po_number": "PO-VOICE-1",
                "customer_name": "abc liquor",
                "items": [
                    { "item_description": "Bacardi 750ml", "quantity": 3, "unit_price": 19.99 }
                ],
                "zoho_customer_match": {
                    "contact_id": "4600002",
                    "contact_name": "ABC Liquor",
                    "email": "buy@abcliquor.com"
                }
            }
        })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app
        .client
        .post(app.url("/api/voice"))
        .multipart(Form::new().text("text", "three bacardi for abc liquor"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["purchase_order"]["po_number"], "PO-VOICE-1");
    assert_eq!(body["draft"]["customerName"], "ABC Liquor");
    assert_eq!(body["draft"]["totalAmount"], 59.97);

    let stored = app
        .client
        .get(app.url("/api/orders/PO-VOICE-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(stored.status().as_u16(), 200);
}

#[tokio::test]
async fn backend_customer_list_is_relayed() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "name": "Total Wines" }])),
        )
        .mount(&app.backend)
        .await;

    let body: Value = app
        .client
        .get(app.url("/api/customers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body[0]["name"], "Total Wines");
}

#[tokio::test]
async fn backend_client_errors_are_relayed() {
    let app = TestApp::spawn().await;

    // No mock mounted for /api/items: wiremock answers 404, a client error
    // that is relayed as is.
    let response = app.client.get(app.url("/api/items")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn voice_order_with_overflowing_price_is_rejected() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/api/voice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "purchase_order": {
                "po_number": "PO-VOICE-9",
                "items": [{ "item_description": "Gold Reserve", "quantity": 10, "unit_price": 1e28 }]
            }
        })))
        .mount(&app.backend)
        .await;

    let response = app
        .client
        .post(app.url("/api/voice"))
        .multipart(Form::new().text("text", "ten gold reserve"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let stored = app
        .client
        .get(app.url("/api/orders/PO-VOICE-9"))
        .send()
        .await
        .unwrap();
    assert_eq!(stored.status().as_u16(), 404);
}

#[tokio::test]
async fn repeated_voice_po_number_does_not_replace_draft() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/api/voice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "purchase_order": {
                "po_number": "PO-VOICE-2",
                "customer_name": "ABC Liquor",
                "items": [{ "item_description": "Old Monk 500ml", "quantity": 2, "unit_price": 15.99 }]
            }
        })))
        .expect(2)
        .mount(&app.backend)
        .await;

    let mut drafts = Vec::new();
    for _ in 0..2 {
        let body: Value = app
            .client
            .post(app.url("/api/voice"))
            .multipart(Form::new().text("text", "two old monk for abc liquor"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        drafts.push(body["draft"].clone());
    }

    assert_eq!(drafts[0]["id"], "PO-VOICE-2");
    assert_ne!(drafts[1]["id"], "PO-VOICE-2");
    assert!(drafts[1]["id"].as_str().unwrap().starts_with("PO-"));

    let first: Value = app
        .client
        .get(app.url("/api/orders/PO-VOICE-2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first, drafts[0]);
}
