use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Element reference went stale: {0}")]
    StaleElement(String),

    #[error("Stale element retries exhausted: {0}")]
    StaleRetriesExhausted(String),

    #[error("Tab not available: {0}")]
    TabNotFound(String),

    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    #[error("WebDriver error: {0}")]
    DriverError(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
