use crate::errors::AutomationError;
use crate::selector::Selector;
use serde_json::Value;

pub mod wire;

/// Opaque handle to an element held by the remote driver.
///
/// The handle is only valid for as long as the underlying DOM node exists;
/// once the node is replaced, every operation on the handle fails with
/// [`AutomationError::StaleElement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The subset of the WebDriver protocol the copier sequences are built on.
///
/// Lookup calls are single attempts with no polling; waiting and timeouts
/// live in [`Locator`](crate::Locator). Implementations map the remote
/// driver's error codes onto [`AutomationError`] variants so callers can
/// distinguish a missing element from a stale handle or a dead tab.
#[async_trait::async_trait]
pub trait DriverEngine: Send + Sync {
    /// Handles of all open top-level tabs, in creation order.
    async fn window_handles(&self) -> Result<Vec<String>, AutomationError>;

    async fn switch_to_window(&self, handle: &str) -> Result<(), AutomationError>;

    async fn navigate(&self, url: &str) -> Result<(), AutomationError>;

    /// Return to the top-level document of the current tab.
    async fn switch_to_default_content(&self) -> Result<(), AutomationError>;

    /// Descend into the given frame element.
    async fn switch_to_frame(&self, frame: &ElementRef) -> Result<(), AutomationError>;

    async fn switch_to_parent_frame(&self) -> Result<(), AutomationError>;

    /// Single-attempt element lookup, optionally scoped to a root element.
    async fn find(
        &self,
        selector: &Selector,
        root: Option<&ElementRef>,
    ) -> Result<ElementRef, AutomationError>;

    /// Single-attempt lookup of all matches. An empty result is not an error.
    async fn find_all(
        &self,
        selector: &Selector,
        root: Option<&ElementRef>,
    ) -> Result<Vec<ElementRef>, AutomationError>;

    async fn click(&self, element: &ElementRef) -> Result<(), AutomationError>;

    async fn double_click(&self, element: &ElementRef) -> Result<(), AutomationError>;

    async fn clear(&self, element: &ElementRef) -> Result<(), AutomationError>;

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), AutomationError>;

    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, AutomationError>;

    async fn property(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, AutomationError>;

    async fn text(&self, element: &ElementRef) -> Result<String, AutomationError>;

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool, AutomationError>;

    async fn is_enabled(&self, element: &ElementRef) -> Result<bool, AutomationError>;

    /// Execute synchronous script in the current browsing context. Element
    /// arguments are encoded with [`wire::element_arg`].
    async fn execute_script(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, AutomationError>;

    async fn set_window_rect(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), AutomationError>;

    /// End the session and release the browser.
    async fn quit(&self) -> Result<(), AutomationError>;
}
