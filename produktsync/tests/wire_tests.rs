//! Wire client against a scripted WebDriver endpoint.

use produktsync::driver::wire::{FirefoxOptions, WireEngine};
use produktsync::driver::{DriverEngine, ElementRef};
use produktsync::{AutomationError, Selector};
use std::io::Read;
use std::sync::Arc;
use std::thread;

fn json_response(status: u16, body: &str) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let header: tiny_http::Header = "Content-Type: application/json".parse().unwrap();
    tiny_http::Response::from_string(body)
        .with_status_code(status)
        .with_header(header)
}

/// Minimal geckodriver stand-in: one session, two elements, one of which
/// only reports stale.
fn start_mock_webdriver() -> (String, Arc<tiny_http::Server>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let server_arc = Arc::new(server);
    let server_clone = server_arc.clone();

    thread::spawn(move || {
        for mut request in server_clone.incoming_requests() {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let url = request.url().to_string();
            let method = request.method().as_str().to_string();

            let response = match (method.as_str(), url.as_str()) {
                ("GET", "/status") => json_response(200, r#"{"value":{"ready":true}}"#),
                ("POST", "/session") => json_response(
                    200,
                    r#"{"value":{"sessionId":"abc123","capabilities":{}}}"#,
                ),
                ("POST", "/session/abc123/element") => {
                    if body.contains("missing") {
                        json_response(
                            404,
                            r#"{"value":{"error":"no such element","message":"Unable to locate element"}}"#,
                        )
                    } else if body.contains("shaky") {
                        json_response(
                            200,
                            r#"{"value":{"element-6066-11e4-a52e-4f735466cecf":"el-stale"}}"#,
                        )
                    } else {
                        json_response(
                            200,
                            r#"{"value":{"element-6066-11e4-a52e-4f735466cecf":"el-1"}}"#,
                        )
                    }
                }
                ("POST", "/session/abc123/element/el-1/click") => {
                    json_response(200, r#"{"value":null}"#)
                }
                ("GET", "/session/abc123/element/el-1/enabled") => {
                    json_response(200, r#"{"value":true}"#)
                }
                ("GET", "/session/abc123/element/el-1/property/value") => {
                    json_response(200, r#"{"value":"4711"}"#)
                }
                ("GET", "/session/abc123/element/el-stale/enabled") => json_response(
                    404,
                    r#"{"value":{"error":"stale element reference","message":"The element reference is stale"}}"#,
                ),
                _ => json_response(
                    500,
                    r#"{"value":{"error":"unknown command","message":"unexpected request"}}"#,
                ),
            };
            let _ = request.respond(response);
        }
    });

    (format!("http://127.0.0.1:{port}"), server_arc)
}

#[tokio::test]
async fn session_creation_and_element_round_trip() {
    let (server_url, _server) = start_mock_webdriver();
    let engine = WireEngine::connect(&server_url, FirefoxOptions::default())
        .await
        .expect("session should be created");

    let element = engine
        .find(&Selector::Id("feld44".to_string()), None)
        .await
        .expect("element lookup should succeed");
    assert_eq!(element, ElementRef("el-1".to_string()));

    engine.click(&element).await.expect("click should succeed");
    let value = engine
        .property(&element, "value")
        .await
        .expect("property read should succeed");
    assert_eq!(value.as_deref(), Some("4711"));
}

#[tokio::test]
async fn wire_errors_map_to_domain_errors() {
    let (server_url, _server) = start_mock_webdriver();
    let engine = WireEngine::connect(&server_url, FirefoxOptions::default())
        .await
        .expect("session should be created");

    let missing = engine
        .find(&Selector::Id("missing".to_string()), None)
        .await;
    assert!(matches!(missing, Err(AutomationError::ElementNotFound(_))));

    let shaky = engine
        .find(&Selector::Id("shaky".to_string()), None)
        .await
        .expect("the element itself resolves");
    let probed = engine.is_enabled(&shaky).await;
    assert!(matches!(probed, Err(AutomationError::StaleElement(_))));
}
