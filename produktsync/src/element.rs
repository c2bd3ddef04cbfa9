use crate::driver::{wire, DriverEngine, ElementRef};
use crate::errors::AutomationError;
use crate::selector::Selector;
use serde_json::Value;
use std::sync::Arc;

/// A resolved handle to an element in one of the target applications.
///
/// Handles carry the selector that resolved them, which keeps log output
/// readable when a handle later goes stale.
#[derive(Clone)]
pub struct WebElement {
    engine: Arc<dyn DriverEngine>,
    reference: ElementRef,
    selector: Selector,
}

impl std::fmt::Debug for WebElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebElement")
            .field("reference", &self.reference)
            .field("selector", &self.selector)
            .finish()
    }
}

impl WebElement {
    pub(crate) fn new(
        engine: Arc<dyn DriverEngine>,
        reference: ElementRef,
        selector: Selector,
    ) -> Self {
        Self {
            engine,
            reference,
            selector,
        }
    }

    pub fn reference(&self) -> &ElementRef {
        &self.reference
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Native click through the driver's input pipeline.
    pub async fn click(&self) -> Result<(), AutomationError> {
        self.engine.click(&self.reference).await
    }

    /// Script-dispatched click. The target UIs stack overlays and sticky
    /// toolbars over half their controls, so a native click is frequently
    /// intercepted; dispatching the click from script sidesteps that.
    pub async fn js_click(&self) -> Result<(), AutomationError> {
        self.engine
            .execute_script(
                "arguments[0].click();",
                vec![wire::element_arg(&self.reference)],
            )
            .await?;
        Ok(())
    }

    /// Double click, needed by data grids that render read-only text until
    /// the cell is activated.
    pub async fn double_click(&self) -> Result<(), AutomationError> {
        self.engine.double_click(&self.reference).await
    }

    pub async fn clear(&self) -> Result<(), AutomationError> {
        self.engine.clear(&self.reference).await
    }

    pub async fn type_text(&self, text: &str) -> Result<(), AutomationError> {
        self.engine.send_keys(&self.reference, text).await
    }

    /// Clear the field, then type the replacement value.
    pub async fn fill(&self, text: &str) -> Result<(), AutomationError> {
        self.clear().await?;
        self.type_text(text).await
    }

    /// Current value of a form control.
    pub async fn value(&self) -> Result<Option<String>, AutomationError> {
        self.engine.property(&self.reference, "value").await
    }

    pub async fn attribute(&self, name: &str) -> Result<Option<String>, AutomationError> {
        self.engine.attribute(&self.reference, name).await
    }

    pub async fn text(&self) -> Result<String, AutomationError> {
        self.engine.text(&self.reference).await
    }

    pub async fn inner_html(&self) -> Result<String, AutomationError> {
        Ok(self
            .engine
            .property(&self.reference, "innerHTML")
            .await?
            .unwrap_or_default())
    }

    /// Set a `<select>` control to the option with the given value and fire
    /// the change event the page's scripts listen for.
    pub async fn select_value(&self, value: &str) -> Result<(), AutomationError> {
        self.engine
            .execute_script(
                "arguments[0].value = arguments[1]; \
                 arguments[0].dispatchEvent(new Event('change', { bubbles: true }));",
                vec![
                    wire::element_arg(&self.reference),
                    Value::String(value.to_string()),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn scroll_into_view(&self) -> Result<(), AutomationError> {
        self.engine
            .execute_script(
                "arguments[0].scrollIntoView(true);",
                vec![wire::element_arg(&self.reference)],
            )
            .await?;
        Ok(())
    }

    pub async fn is_displayed(&self) -> Result<bool, AutomationError> {
        self.engine.is_displayed(&self.reference).await
    }

    pub async fn is_enabled(&self) -> Result<bool, AutomationError> {
        self.engine.is_enabled(&self.reference).await
    }

    /// Cheap liveness check used by the staleness-tolerant locator: any
    /// read fails with `StaleElement` once the node has been replaced.
    pub async fn probe(&self) -> Result<(), AutomationError> {
        self.engine.is_enabled(&self.reference).await.map(|_| ())
    }
}
