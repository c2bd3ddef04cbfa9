use crate::driver::DriverEngine;
use crate::errors::AutomationError;
use crate::locator::Locator;
use crate::selector::Selector;
use crate::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Tracks which top-level tab and which nested frame the driver currently
/// targets.
///
/// The one discipline that keeps multi-frame automation from going flaky:
/// any operation that targets a specific page fragment first returns to the
/// top-level document and re-enters the full frame chain from there
/// ([`Navigator::descend`]). A chain left over from an earlier operation is
/// never trusted, because any click in between may have torn it down.
pub struct Navigator {
    engine: Arc<dyn DriverEngine>,
    clock: Clock,
    frame_chain: Vec<Selector>,
}

impl Navigator {
    pub(crate) fn new(engine: Arc<dyn DriverEngine>, clock: Clock) -> Self {
        Self {
            engine,
            clock,
            frame_chain: Vec::new(),
        }
    }

    /// The frames entered since the last reset, outermost first.
    pub fn frame_chain(&self) -> &[Selector] {
        &self.frame_chain
    }

    /// Switch to the tab at `index` (0 = CRM, 1 = Shop). Fails when fewer
    /// tabs are open than the index requires.
    pub async fn switch_to_tab(&mut self, index: usize) -> Result<(), AutomationError> {
        let handles = self.engine.window_handles().await?;
        let handle = handles.get(index).ok_or_else(|| {
            AutomationError::TabNotFound(format!(
                "tab {index} requested but only {} open",
                handles.len()
            ))
        })?;
        self.engine.switch_to_window(handle).await?;
        // A window switch lands on that tab's top-level document.
        self.frame_chain.clear();
        info!("switched to tab {index}");
        Ok(())
    }

    /// Return to the top-level document of the current tab.
    pub async fn reset_to_top(&mut self) -> Result<(), AutomationError> {
        self.engine.switch_to_default_content().await?;
        self.frame_chain.clear();
        Ok(())
    }

    /// Descend one level into the frame matching `selector`, waiting up to
    /// `timeout_ticks` for the frame element to exist.
    pub async fn enter_frame(
        &mut self,
        selector: impl Into<Selector>,
        timeout_ticks: u64,
    ) -> Result<(), AutomationError> {
        let selector = selector.into();
        let frame = Locator::new(self.engine.clone(), selector.clone(), self.clock)
            .timeout(timeout_ticks)
            .present()
            .await
            .map_err(|e| match e {
                AutomationError::Timeout(_) => {
                    AutomationError::FrameNotFound(format!("frame {selector} never appeared"))
                }
                other => other,
            })?;
        self.engine.switch_to_frame(frame.reference()).await?;
        self.frame_chain.push(selector.clone());
        debug!("entered frame {selector}, depth {}", self.frame_chain.len());
        Ok(())
    }

    /// Pop one level off the frame chain.
    pub async fn exit_to_parent(&mut self) -> Result<(), AutomationError> {
        self.engine.switch_to_parent_frame().await?;
        self.frame_chain.pop();
        Ok(())
    }

    /// Reset to the top-level document, then re-enter the full chain.
    /// Callable any number of times from any prior depth.
    pub async fn descend(
        &mut self,
        frames: &[Selector],
        timeout_ticks: u64,
    ) -> Result<(), AutomationError> {
        self.reset_to_top().await?;
        for frame in frames {
            self.enter_frame(frame.clone(), timeout_ticks).await?;
        }
        Ok(())
    }
}
