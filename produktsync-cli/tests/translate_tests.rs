//! Translation client against a scripted service endpoint.

use produktsync_cli::record::ProductRecord;
use produktsync_cli::translate::Translator;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fn start_mock_service(status: u16, body: &'static str) -> (String, Arc<AtomicUsize>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();

    thread::spawn(move || {
        for request in server.incoming_requests() {
            counter.fetch_add(1, Ordering::SeqCst);
            let header: tiny_http::Header = "Content-Type: application/json".parse().unwrap();
            let response = tiny_http::Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
    });

    (format!("http://127.0.0.1:{port}"), requests)
}

fn record_with_description(description: &str) -> ProductRecord {
    ProductRecord {
        artikelnummer: Some("4711".to_string()),
        beschreibung: Some(description.to_string()),
        ..ProductRecord::default()
    }
}

#[tokio::test]
async fn empty_description_never_contacts_the_service() {
    let (url, requests) = start_mock_service(200, r#"{"translations":[{"text":"x"}]}"#);
    let translator = Translator::with_api_url("test-key", url);

    let mut record = record_with_description("");
    translator.translate_product(&mut record).await;
    assert_eq!(record.beschreibung_en, None);
    assert_eq!(record.beschreibung_fr, None);

    let mut record = ProductRecord::default();
    translator.translate_product(&mut record).await;
    assert_eq!(record.beschreibung_en, None);
    assert_eq!(record.beschreibung_fr, None);

    assert_eq!(requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn both_target_languages_are_requested_once() {
    let (url, requests) = start_mock_service(
        200,
        r#"{"translations":[{"text":"<p>Very sturdy</p>"}]}"#,
    );
    let translator = Translator::with_api_url("test-key", url);

    let mut record = record_with_description("<p>Sehr robust</p>");
    translator.translate_product(&mut record).await;

    assert_eq!(record.beschreibung_en.as_deref(), Some("<p>Very sturdy</p>"));
    assert_eq!(record.beschreibung_fr.as_deref(), Some("<p>Very sturdy</p>"));
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn service_errors_degrade_to_empty_strings() {
    let (url, requests) = start_mock_service(500, r#"{"message":"internal error"}"#);
    let translator = Translator::with_api_url("test-key", url);

    let mut record = record_with_description("<p>Sehr robust</p>");
    translator.translate_product(&mut record).await;

    // Degraded, not absent: the caller decides what an empty value means.
    assert_eq!(record.beschreibung_en.as_deref(), Some(""));
    assert_eq!(record.beschreibung_fr.as_deref(), Some(""));
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unreachable_service_degrades_to_empty_strings() {
    // Nothing listens on this port.
    let translator = Translator::with_api_url("test-key", "http://127.0.0.1:9/v2/translate");

    let mut record = record_with_description("<p>Sehr robust</p>");
    translator.translate_product(&mut record).await;

    assert_eq!(record.beschreibung_en.as_deref(), Some(""));
    assert_eq!(record.beschreibung_fr.as_deref(), Some(""));
}
