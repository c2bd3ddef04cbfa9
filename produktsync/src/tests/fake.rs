//! Scripted in-memory engine for exercising the locator and navigator
//! without a browser.

use crate::driver::{DriverEngine, ElementRef};
use crate::errors::AutomationError;
use crate::selector::Selector;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct FakeElement {
    /// Find attempts that fail before the element shows up.
    pub appear_after: u32,
    pub displayed: bool,
    pub enabled: bool,
    /// Probes that report a stale handle before the element settles.
    pub stale_probes: u32,
}

impl Default for FakeElement {
    fn default() -> Self {
        Self {
            appear_after: 0,
            displayed: true,
            enabled: true,
            stale_probes: 0,
        }
    }
}

#[derive(Default)]
struct State {
    tabs: usize,
    current_tab: usize,
    frame_depth: usize,
    elements: HashMap<String, FakeElement>,
    find_attempts: HashMap<String, u32>,
}

pub struct FakeEngine {
    state: Mutex<State>,
}

impl FakeEngine {
    pub fn with_tabs(tabs: usize) -> Self {
        Self {
            state: Mutex::new(State {
                tabs,
                ..State::default()
            }),
        }
    }

    pub fn add(&self, selector: &Selector, element: FakeElement) {
        self.state
            .lock()
            .unwrap()
            .elements
            .insert(selector.to_string(), element);
    }

    pub fn current_tab(&self) -> usize {
        self.state.lock().unwrap().current_tab
    }

    pub fn frame_depth(&self) -> usize {
        self.state.lock().unwrap().frame_depth
    }
}

#[async_trait::async_trait]
impl DriverEngine for FakeEngine {
    async fn window_handles(&self) -> Result<Vec<String>, AutomationError> {
        let state = self.state.lock().unwrap();
        Ok((0..state.tabs).map(|i| format!("tab-{i}")).collect())
    }

    async fn switch_to_window(&self, handle: &str) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        let index: usize = handle
            .strip_prefix("tab-")
            .and_then(|i| i.parse().ok())
            .ok_or_else(|| AutomationError::TabNotFound(handle.to_string()))?;
        if index >= state.tabs {
            return Err(AutomationError::TabNotFound(handle.to_string()));
        }
        state.current_tab = index;
        state.frame_depth = 0;
        Ok(())
    }

    async fn navigate(&self, _url: &str) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn switch_to_default_content(&self) -> Result<(), AutomationError> {
        self.state.lock().unwrap().frame_depth = 0;
        Ok(())
    }

    async fn switch_to_frame(&self, _frame: &ElementRef) -> Result<(), AutomationError> {
        self.state.lock().unwrap().frame_depth += 1;
        Ok(())
    }

    async fn switch_to_parent_frame(&self) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        state.frame_depth = state.frame_depth.saturating_sub(1);
        Ok(())
    }

    async fn find(
        &self,
        selector: &Selector,
        _root: Option<&ElementRef>,
    ) -> Result<ElementRef, AutomationError> {
        let key = selector.to_string();
        let mut state = self.state.lock().unwrap();
        let attempts = state.find_attempts.entry(key.clone()).or_insert(0);
        *attempts += 1;
        let seen = *attempts;
        match state.elements.get(&key) {
            Some(element) if seen > element.appear_after => Ok(ElementRef(key)),
            _ => Err(AutomationError::ElementNotFound(key)),
        }
    }

    async fn find_all(
        &self,
        selector: &Selector,
        root: Option<&ElementRef>,
    ) -> Result<Vec<ElementRef>, AutomationError> {
        match self.find(selector, root).await {
            Ok(reference) => Ok(vec![reference]),
            Err(AutomationError::ElementNotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn click(&self, _element: &ElementRef) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn double_click(&self, _element: &ElementRef) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn clear(&self, _element: &ElementRef) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn send_keys(&self, _element: &ElementRef, _text: &str) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn attribute(
        &self,
        _element: &ElementRef,
        _name: &str,
    ) -> Result<Option<String>, AutomationError> {
        Ok(None)
    }

    async fn property(
        &self,
        _element: &ElementRef,
        _name: &str,
    ) -> Result<Option<String>, AutomationError> {
        Ok(None)
    }

    async fn text(&self, _element: &ElementRef) -> Result<String, AutomationError> {
        Ok(String::new())
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool, AutomationError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .elements
            .get(&element.0)
            .map(|e| e.displayed)
            .unwrap_or(false))
    }

    async fn is_enabled(&self, element: &ElementRef) -> Result<bool, AutomationError> {
        let mut state = self.state.lock().unwrap();
        let fake = state
            .elements
            .get_mut(&element.0)
            .ok_or_else(|| AutomationError::ElementNotFound(element.0.clone()))?;
        if fake.stale_probes > 0 {
            fake.stale_probes -= 1;
            return Err(AutomationError::StaleElement(element.0.clone()));
        }
        Ok(fake.enabled)
    }

    async fn execute_script(
        &self,
        _script: &str,
        _args: Vec<Value>,
    ) -> Result<Value, AutomationError> {
        Ok(Value::Null)
    }

    async fn set_window_rect(
        &self,
        _x: i32,
        _y: i32,
        _width: u32,
        _height: u32,
    ) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn quit(&self) -> Result<(), AutomationError> {
        Ok(())
    }
}
