use crate::driver::{DriverEngine, ElementRef};
use crate::element::WebElement;
use crate::errors::AutomationError;
use crate::selector::Selector;
use crate::Clock;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Default wait budget when a step does not name one, in ticks.
pub const DEFAULT_WAIT_TICKS: u64 = 10;

/// What a wait has to observe before it hands the element back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitFor {
    /// The element exists in the document.
    Presence,
    /// The element exists and is rendered.
    Visible,
    /// The element is rendered and enabled.
    Clickable,
}

/// A polling element lookup.
///
/// All timeouts are expressed in ticks (see [`Clock`]); the sequences that
/// drive the two applications state their budgets in the 1–60 tick range
/// depending on how slow the targeted page fragment typically is.
#[derive(Clone)]
pub struct Locator {
    engine: Arc<dyn DriverEngine>,
    selector: Selector,
    root: Option<ElementRef>,
    clock: Clock,
    timeout_ticks: u64,
}

impl Locator {
    pub(crate) fn new(engine: Arc<dyn DriverEngine>, selector: Selector, clock: Clock) -> Self {
        Self {
            engine,
            selector,
            root: None,
            clock,
            timeout_ticks: DEFAULT_WAIT_TICKS,
        }
    }

    /// Set the wait budget for this locator, in ticks.
    pub fn timeout(mut self, ticks: u64) -> Self {
        self.timeout_ticks = ticks;
        self
    }

    /// Scope the lookup to descendants of the given element.
    pub fn within(mut self, root: &WebElement) -> Self {
        self.root = Some(root.reference().clone());
        self
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Wait until an element matching the selector satisfies `condition`.
    pub async fn wait(&self, condition: WaitFor) -> Result<WebElement, AutomationError> {
        debug!("waiting for {} ({condition:?})", self.selector);
        let deadline = Instant::now() + self.clock.tick * self.timeout_ticks as u32;
        loop {
            match self.try_once(condition).await {
                Ok(Some(element)) => return Ok(element),
                Ok(None) => {}
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Err(AutomationError::Timeout(format!(
                    "no match for {} ({condition:?}) after {} ticks",
                    self.selector, self.timeout_ticks
                )));
            }
            tokio::time::sleep(self.clock.poll).await;
        }
    }

    /// One polling round: `Ok(None)` means "not there yet, keep polling".
    async fn try_once(&self, condition: WaitFor) -> Result<Option<WebElement>, AutomationError> {
        let found = self.engine.find(&self.selector, self.root.as_ref()).await;
        let reference = match found {
            Ok(reference) => reference,
            Err(AutomationError::ElementNotFound(_)) | Err(AutomationError::StaleElement(_)) => {
                return Ok(None)
            }
            Err(e) => return Err(e),
        };
        let satisfied = match condition {
            WaitFor::Presence => true,
            WaitFor::Visible => match self.engine.is_displayed(&reference).await {
                Ok(displayed) => displayed,
                Err(AutomationError::StaleElement(_)) => return Ok(None),
                Err(e) => return Err(e),
            },
            WaitFor::Clickable => {
                let displayed = match self.engine.is_displayed(&reference).await {
                    Ok(displayed) => displayed,
                    Err(AutomationError::StaleElement(_)) => return Ok(None),
                    Err(e) => return Err(e),
                };
                let enabled = match self.engine.is_enabled(&reference).await {
                    Ok(enabled) => enabled,
                    Err(AutomationError::StaleElement(_)) => return Ok(None),
                    Err(e) => return Err(e),
                };
                displayed && enabled
            }
        };
        if satisfied {
            Ok(Some(WebElement::new(
                self.engine.clone(),
                reference,
                self.selector.clone(),
            )))
        } else {
            Ok(None)
        }
    }

    pub async fn present(&self) -> Result<WebElement, AutomationError> {
        self.wait(WaitFor::Presence).await
    }

    pub async fn visible(&self) -> Result<WebElement, AutomationError> {
        self.wait(WaitFor::Visible).await
    }

    pub async fn clickable(&self) -> Result<WebElement, AutomationError> {
        self.wait(WaitFor::Clickable).await
    }

    /// Single-attempt lookup of the first match, no polling.
    pub async fn first(&self) -> Result<WebElement, AutomationError> {
        let reference = self.engine.find(&self.selector, self.root.as_ref()).await?;
        Ok(WebElement::new(
            self.engine.clone(),
            reference,
            self.selector.clone(),
        ))
    }

    /// Single-attempt lookup of all matches, no polling. Empty is not an
    /// error; the delete-rule loop relies on that.
    pub async fn all(&self) -> Result<Vec<WebElement>, AutomationError> {
        let references = self
            .engine
            .find_all(&self.selector, self.root.as_ref())
            .await?;
        Ok(references
            .into_iter()
            .map(|reference| {
                WebElement::new(self.engine.clone(), reference, self.selector.clone())
            })
            .collect())
    }

    /// Wait until at least one element matches, then return all matches.
    pub async fn wait_all(&self) -> Result<Vec<WebElement>, AutomationError> {
        self.wait(WaitFor::Presence).await?;
        self.all().await
    }

    /// Staleness-tolerant resolution: locate the element, then verify the
    /// handle is still live. When the underlying node was replaced between
    /// the two steps (a partial reload mid-poll), the full
    /// locate-and-check is re-executed, up to `retries` attempts.
    pub async fn fresh(&self, retries: u32) -> Result<WebElement, AutomationError> {
        for attempt in 1..=retries {
            let element = self.wait(WaitFor::Presence).await?;
            match element.probe().await {
                Ok(()) => return Ok(element),
                Err(AutomationError::StaleElement(_)) => {
                    warn!(
                        "stale reference while resolving {}, attempt {attempt}/{retries}",
                        self.selector
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Err(AutomationError::StaleRetriesExhausted(format!(
            "{} kept going stale after {retries} attempts",
            self.selector
        )))
    }
}
