//! Wire client for a local geckodriver.
//!
//! Speaks the W3C WebDriver protocol over JSON-HTTP. The client either
//! spawns geckodriver itself ([`WireEngine::launch`]) or attaches to a
//! server that is already listening ([`WireEngine::connect`]).

use crate::driver::{DriverEngine, ElementRef};
use crate::errors::AutomationError;
use crate::selector::Selector;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Key the protocol uses to tag element references in JSON payloads.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const STARTUP_PROBE_INTERVAL: Duration = Duration::from_millis(200);
const STARTUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Encode an element reference as a script argument.
pub fn element_arg(element: &ElementRef) -> Value {
    json!({ ELEMENT_KEY: element.0 })
}

/// Options for the Firefox session behind the wire client.
#[derive(Debug, Clone, Default)]
pub struct FirefoxOptions {
    /// Path to the Firefox binary. Defaults to whatever geckodriver finds.
    pub binary: Option<String>,
    /// Dedicated profile directory, so the operator's logins survive restarts.
    pub profile: Option<String>,
}

pub struct WireEngine {
    http: reqwest::Client,
    session_url: String,
    driver: Mutex<Option<Child>>,
}

impl WireEngine {
    /// Spawn geckodriver on `port` and open a new Firefox session.
    pub async fn launch(
        geckodriver: &Path,
        port: u16,
        options: FirefoxOptions,
    ) -> Result<Self, AutomationError> {
        info!(
            "Initializing Firefox with geckodriver and dedicated profile ({})",
            geckodriver.display()
        );
        let child = Command::new(geckodriver)
            .arg("--port")
            .arg(port.to_string())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AutomationError::DriverError(format!(
                    "failed to spawn geckodriver at {}: {e}",
                    geckodriver.display()
                ))
            })?;

        let server = format!("http://127.0.0.1:{port}");
        let http = reqwest::Client::new();
        wait_for_server(&http, &server).await?;

        let engine = Self::create_session(http, &server, options).await?;
        *engine.driver.lock().unwrap() = Some(child);
        Ok(engine)
    }

    /// Attach to a WebDriver server that is already running.
    pub async fn connect(server: &str, options: FirefoxOptions) -> Result<Self, AutomationError> {
        let http = reqwest::Client::new();
        Self::create_session(http, server.trim_end_matches('/'), options).await
    }

    async fn create_session(
        http: reqwest::Client,
        server: &str,
        options: FirefoxOptions,
    ) -> Result<Self, AutomationError> {
        let mut firefox = serde_json::Map::new();
        if let Some(binary) = &options.binary {
            firefox.insert("binary".into(), Value::String(binary.clone()));
        }
        if let Some(profile) = &options.profile {
            firefox.insert(
                "args".into(),
                json!(["-profile", profile]),
            );
        }
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "moz:firefoxOptions": Value::Object(firefox),
                }
            }
        });

        let response = http
            .post(format!("{server}/session"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AutomationError::DriverError(format!("session request failed: {e}")))?;
        let value = unwrap_value(response).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AutomationError::DriverError("session response carried no sessionId".into())
            })?
            .to_string();
        debug!("WebDriver session {session_id} created");

        Ok(Self {
            http,
            session_url: format!("{server}/session/{session_id}"),
            driver: Mutex::new(None),
        })
    }

    async fn cmd(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, AutomationError> {
        let url = if path.is_empty() {
            self.session_url.clone()
        } else {
            format!("{}/{path}", self.session_url)
        };
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| AutomationError::DriverError(format!("wire request failed: {e}")))?;
        unwrap_value(response).await
    }

    async fn get(&self, path: &str) -> Result<Value, AutomationError> {
        self.cmd(reqwest::Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, AutomationError> {
        self.cmd(reqwest::Method::POST, path, Some(body)).await
    }

    fn extract_element(value: &Value) -> Result<ElementRef, AutomationError> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| ElementRef(id.to_string()))
            .ok_or_else(|| {
                AutomationError::DriverError(format!("malformed element payload: {value}"))
            })
    }
}

async fn wait_for_server(http: &reqwest::Client, server: &str) -> Result<(), AutomationError> {
    let deadline = std::time::Instant::now() + STARTUP_TIMEOUT;
    loop {
        match http.get(format!("{server}/status")).send().await {
            Ok(response) if response.status().is_success() => return Ok(()),
            _ if std::time::Instant::now() >= deadline => {
                return Err(AutomationError::Timeout(format!(
                    "geckodriver did not become ready at {server} within {STARTUP_TIMEOUT:?}"
                )));
            }
            _ => tokio::time::sleep(STARTUP_PROBE_INTERVAL).await,
        }
    }
}

/// Pull the `value` field out of a wire response, mapping protocol errors.
async fn unwrap_value(response: reqwest::Response) -> Result<Value, AutomationError> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| AutomationError::DriverError(format!("unparseable wire response: {e}")))?;
    let value = body.get("value").cloned().unwrap_or(Value::Null);
    if status.is_success() {
        return Ok(value);
    }
    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    Err(map_wire_error(code, message))
}

fn map_wire_error(code: &str, message: String) -> AutomationError {
    match code {
        "no such element" => AutomationError::ElementNotFound(message),
        "stale element reference" => AutomationError::StaleElement(message),
        "no such window" => AutomationError::TabNotFound(message),
        "no such frame" => AutomationError::FrameNotFound(message),
        "invalid selector" => AutomationError::InvalidSelector(message),
        "timeout" | "script timeout" => AutomationError::Timeout(message),
        _ => AutomationError::DriverError(format!("{code}: {message}")),
    }
}

#[async_trait::async_trait]
impl DriverEngine for WireEngine {
    async fn window_handles(&self) -> Result<Vec<String>, AutomationError> {
        let value = self.get("window/handles").await?;
        let handles = value
            .as_array()
            .ok_or_else(|| {
                AutomationError::DriverError(format!("malformed handle list: {value}"))
            })?
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        Ok(handles)
    }

    async fn switch_to_window(&self, handle: &str) -> Result<(), AutomationError> {
        self.post("window", json!({ "handle": handle })).await?;
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), AutomationError> {
        self.post("url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn switch_to_default_content(&self) -> Result<(), AutomationError> {
        self.post("frame", json!({ "id": null })).await?;
        Ok(())
    }

    async fn switch_to_frame(&self, frame: &ElementRef) -> Result<(), AutomationError> {
        self.post("frame", json!({ "id": element_arg(frame) }))
            .await?;
        Ok(())
    }

    async fn switch_to_parent_frame(&self) -> Result<(), AutomationError> {
        self.post("frame/parent", json!({})).await?;
        Ok(())
    }

    async fn find(
        &self,
        selector: &Selector,
        root: Option<&ElementRef>,
    ) -> Result<ElementRef, AutomationError> {
        let (using, value) = selector.to_wire();
        let path = match root {
            Some(root) => format!("element/{}/element", root.0),
            None => "element".to_string(),
        };
        let found = self
            .post(&path, json!({ "using": using, "value": value }))
            .await?;
        Self::extract_element(&found)
    }

    async fn find_all(
        &self,
        selector: &Selector,
        root: Option<&ElementRef>,
    ) -> Result<Vec<ElementRef>, AutomationError> {
        let (using, value) = selector.to_wire();
        let path = match root {
            Some(root) => format!("element/{}/elements", root.0),
            None => "elements".to_string(),
        };
        let found = self
            .post(&path, json!({ "using": using, "value": value }))
            .await?;
        found
            .as_array()
            .ok_or_else(|| AutomationError::DriverError(format!("malformed element list: {found}")))?
            .iter()
            .map(Self::extract_element)
            .collect()
    }

    async fn click(&self, element: &ElementRef) -> Result<(), AutomationError> {
        self.post(&format!("element/{}/click", element.0), json!({}))
            .await?;
        Ok(())
    }

    async fn double_click(&self, element: &ElementRef) -> Result<(), AutomationError> {
        let actions = json!({
            "actions": [{
                "type": "pointer",
                "id": "mouse",
                "parameters": { "pointerType": "mouse" },
                "actions": [
                    { "type": "pointerMove", "duration": 0, "origin": element_arg(element), "x": 0, "y": 0 },
                    { "type": "pointerDown", "button": 0 },
                    { "type": "pointerUp", "button": 0 },
                    { "type": "pointerDown", "button": 0 },
                    { "type": "pointerUp", "button": 0 },
                ],
            }]
        });
        self.post("actions", actions).await?;
        if let Err(e) = self.cmd(reqwest::Method::DELETE, "actions", None).await {
            warn!("failed to release input actions: {e}");
        }
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> Result<(), AutomationError> {
        self.post(&format!("element/{}/clear", element.0), json!({}))
            .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), AutomationError> {
        self.post(
            &format!("element/{}/value", element.0),
            json!({ "text": text }),
        )
        .await?;
        Ok(())
    }

    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, AutomationError> {
        let value = self
            .get(&format!("element/{}/attribute/{name}", element.0))
            .await?;
        Ok(json_to_optional_string(value))
    }

    async fn property(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, AutomationError> {
        let value = self
            .get(&format!("element/{}/property/{name}", element.0))
            .await?;
        Ok(json_to_optional_string(value))
    }

    async fn text(&self, element: &ElementRef) -> Result<String, AutomationError> {
        let value = self.get(&format!("element/{}/text", element.0)).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool, AutomationError> {
        let value = self
            .get(&format!("element/{}/displayed", element.0))
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self, element: &ElementRef) -> Result<bool, AutomationError> {
        let value = self.get(&format!("element/{}/enabled", element.0)).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn execute_script(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, AutomationError> {
        self.post("execute/sync", json!({ "script": script, "args": args }))
            .await
    }

    async fn set_window_rect(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), AutomationError> {
        self.post(
            "window/rect",
            json!({ "x": x, "y": y, "width": width, "height": height }),
        )
        .await?;
        Ok(())
    }

    async fn quit(&self) -> Result<(), AutomationError> {
        let result = self.cmd(reqwest::Method::DELETE, "", None).await;
        if let Some(mut child) = self.driver.lock().unwrap().take() {
            if let Err(e) = child.start_kill() {
                warn!("failed to stop geckodriver: {e}");
            }
        }
        result.map(|_| ())
    }
}

fn json_to_optional_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
