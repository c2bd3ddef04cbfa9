//! Browser automation over the WebDriver protocol
//!
//! This crate is the plumbing under the CRM-to-Shop product copier: a wire
//! client for geckodriver, a polling locator with staleness-tolerant
//! re-resolution, and a frame/tab navigator that re-derives its context
//! instead of trusting it. Business sequences live in the companion CLI
//! crate; nothing in here knows what a product is.

use std::sync::Arc;
use std::time::Duration;

pub mod driver;
pub mod element;
pub mod errors;
pub mod locator;
pub mod navigator;
pub mod selector;
#[cfg(test)]
mod tests;

pub use driver::{DriverEngine, ElementRef};
pub use element::WebElement;
pub use errors::AutomationError;
pub use locator::{Locator, WaitFor};
pub use navigator::Navigator;
pub use selector::Selector;

/// Polling cadence for waits.
///
/// Every wait budget in the sequences is expressed in ticks, so shrinking
/// the tick turns the minutes-long production timeouts into milliseconds
/// under test without touching the sequences themselves.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    /// The unit a timeout of "1" denotes.
    pub tick: Duration,
    /// Interval between polling rounds.
    pub poll: Duration,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            poll: Duration::from_millis(250),
        }
    }
}

/// The main entry point: one live automation session driving one browser.
pub struct Session {
    engine: Arc<dyn DriverEngine>,
    clock: Clock,
}

impl Session {
    pub fn new(engine: Arc<dyn DriverEngine>) -> Self {
        Self::with_clock(engine, Clock::default())
    }

    pub fn with_clock(engine: Arc<dyn DriverEngine>, clock: Clock) -> Self {
        Self { engine, clock }
    }

    pub fn engine(&self) -> Arc<dyn DriverEngine> {
        self.engine.clone()
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        Locator::new(self.engine.clone(), selector.into(), self.clock)
    }

    pub fn navigator(&self) -> Navigator {
        Navigator::new(self.engine.clone(), self.clock)
    }

    /// Load `url` in the current tab.
    pub async fn navigate(&self, url: &str) -> Result<(), AutomationError> {
        self.engine.navigate(url).await
    }

    /// Open `url` in a fresh tab without leaving the current one.
    pub async fn open_new_tab(&self, url: &str) -> Result<(), AutomationError> {
        self.engine
            .execute_script(
                "window.open(arguments[0], '_blank');",
                vec![serde_json::Value::String(url.to_string())],
            )
            .await?;
        Ok(())
    }

    pub async fn execute_script(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, AutomationError> {
        self.engine.execute_script(script, args).await
    }

    pub async fn quit(&self) -> Result<(), AutomationError> {
        self.engine.quit().await
    }
}

impl Clone for Session {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            clock: self.clock,
        }
    }
}
