//! Scripted driver for exercising the CRM and Shop sequences without a
//! browser. Tests register nodes under the selectors the sequences use
//! and assert on the recorded interactions afterwards.

// Each test binary uses its own subset of the fake.
#![allow(dead_code)]

use produktsync::driver::wire::ELEMENT_KEY;
use produktsync::driver::{DriverEngine, ElementRef};
use produktsync::{AutomationError, Clock, Selector, Session};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Node {
    pub value: Option<String>,
    pub text: String,
    pub html: String,
    pub class: String,
    pub displayed: bool,
    pub enabled: bool,
    /// Find attempts that miss before the node shows up.
    pub appear_after: u32,
    /// Probes that report stale before the node settles.
    pub stale_probes: u32,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            value: None,
            text: String::new(),
            html: String::new(),
            class: String::new(),
            displayed: true,
            enabled: true,
            appear_after: 0,
            stale_probes: 0,
        }
    }
}

impl Node {
    pub fn with_value(value: &str) -> Self {
        Node {
            value: Some(value.to_string()),
            ..Node::default()
        }
    }

    pub fn with_text(text: &str) -> Self {
        Node {
            text: text.to_string(),
            ..Node::default()
        }
    }

    pub fn with_html(html: &str) -> Self {
        Node {
            html: html.to_string(),
            ..Node::default()
        }
    }
}

struct Entry {
    node: Node,
    removed: bool,
    /// Node ids removed when this node is clicked.
    on_click_remove: Vec<String>,
}

type Key = (String, Option<String>);

#[derive(Default)]
struct State {
    tabs: usize,
    current_tab: usize,
    frame_depth: usize,
    entries: HashMap<String, Entry>,
    by_key: HashMap<Key, Vec<String>>,
    find_attempts: HashMap<Key, u32>,
    clicks: Vec<String>,
    double_clicks: Vec<String>,
    fills: Vec<(String, String)>,
    ace_sets: Vec<(String, String)>,
    scripts: Vec<String>,
}

pub struct FakeDriver {
    state: Mutex<State>,
}

impl FakeDriver {
    pub fn with_tabs(tabs: usize) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                tabs,
                ..State::default()
            }),
        })
    }

    /// Millisecond clock: a 60-tick production wait is 120 ms here.
    pub fn session(self: &Arc<Self>) -> Session {
        Session::with_clock(
            self.clone(),
            Clock {
                tick: Duration::from_millis(2),
                poll: Duration::from_millis(1),
            },
        )
    }

    pub fn add(&self, id: &str, selector: &Selector, node: Node) {
        self.add_scoped(id, selector, None, node);
    }

    pub fn add_in(&self, root: &str, id: &str, selector: &Selector, node: Node) {
        self.add_scoped(id, selector, Some(root.to_string()), node);
    }

    fn add_scoped(&self, id: &str, selector: &Selector, root: Option<String>, node: Node) {
        let mut state = self.state.lock().unwrap();
        state.entries.insert(
            id.to_string(),
            Entry {
                node,
                removed: false,
                on_click_remove: Vec::new(),
            },
        );
        state
            .by_key
            .entry((selector.to_string(), root))
            .or_default()
            .push(id.to_string());
    }

    /// Clicking `id` removes `target` (and `id` itself if they are equal).
    pub fn on_click_remove(&self, id: &str, target: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.entries.get_mut(id) {
            entry.on_click_remove.push(target.to_string());
        }
    }

    pub fn value_of(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .entries
            .get(id)
            .and_then(|e| e.node.value.clone())
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn double_clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().double_clicks.clone()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().fills.clone()
    }

    pub fn ace_sets(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().ace_sets.clone()
    }

    pub fn was_clicked(&self, id: &str) -> bool {
        self.state.lock().unwrap().clicks.iter().any(|c| c == id)
    }

    pub fn frame_depth(&self) -> usize {
        self.state.lock().unwrap().frame_depth
    }

    fn run_click(state: &mut State, id: &str) {
        state.clicks.push(id.to_string());
        let targets = state
            .entries
            .get(id)
            .map(|e| e.on_click_remove.clone())
            .unwrap_or_default();
        for target in targets {
            if let Some(entry) = state.entries.get_mut(&target) {
                entry.removed = true;
            }
        }
    }

    fn eligible(state: &State, key: &Key, attempts: u32) -> Vec<String> {
        state
            .by_key
            .get(key)
            .map(|ids| {
                ids.iter()
                    .filter(|id| {
                        state
                            .entries
                            .get(*id)
                            .map(|e| !e.removed && attempts > e.node.appear_after)
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lookup(&self, selector: &Selector, root: Option<&ElementRef>) -> Vec<String> {
        let key = (selector.to_string(), root.map(|r| r.0.clone()));
        let mut state = self.state.lock().unwrap();
        let attempts = state.find_attempts.entry(key.clone()).or_insert(0);
        *attempts += 1;
        let seen = *attempts;
        Self::eligible(&state, &key, seen)
    }
}

fn script_element(args: &[Value]) -> Option<String> {
    args.first()
        .and_then(|a| a.get(ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait::async_trait]
impl DriverEngine for FakeDriver {
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
        root: Option<&ElementRef>,
    ) -> Result<ElementRef, AutomationError> {
        self.lookup(selector, root)
            .into_iter()
            .next()
            .map(ElementRef)
            .ok_or_else(|| AutomationError::ElementNotFound(selector.to_string()))
    }

    async fn find_all(
        &self,
        selector: &Selector,
        root: Option<&ElementRef>,
    ) -> Result<Vec<ElementRef>, AutomationError> {
        Ok(self.lookup(selector, root).into_iter().map(ElementRef).collect())
    }

    async fn click(&self, element: &ElementRef) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        Self::run_click(&mut state, &element.0);
        Ok(())
    }

    async fn double_click(&self, element: &ElementRef) -> Result<(), AutomationError> {
        self.state
            .lock()
            .unwrap()
            .double_clicks
            .push(element.0.clone());
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.entries.get_mut(&element.0) {
            entry.node.value = Some(String::new());
        }
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        state.fills.push((element.0.clone(), text.to_string()));
        if let Some(entry) = state.entries.get_mut(&element.0) {
            let current = entry.node.value.get_or_insert_with(String::new);
            current.push_str(text);
        }
        Ok(())
    }

    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, AutomationError> {
        let state = self.state.lock().unwrap();
        let entry = state
            .entries
            .get(&element.0)
            .ok_or_else(|| AutomationError::StaleElement(element.0.clone()))?;
        Ok(match name {
            "class" => Some(entry.node.class.clone()),
            _ => None,
        })
    }

    async fn property(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, AutomationError> {
        let state = self.state.lock().unwrap();
        let entry = state
            .entries
            .get(&element.0)
            .ok_or_else(|| AutomationError::StaleElement(element.0.clone()))?;
        Ok(match name {
            "value" => entry.node.value.clone(),
            "innerHTML" => Some(entry.node.html.clone()),
            _ => None,
        })
    }

    async fn text(&self, element: &ElementRef) -> Result<String, AutomationError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .entries
            .get(&element.0)
            .map(|e| e.node.text.clone())
            .unwrap_or_default())
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool, AutomationError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .entries
            .get(&element.0)
            .map(|e| e.node.displayed)
            .unwrap_or(false))
    }

    async fn is_enabled(&self, element: &ElementRef) -> Result<bool, AutomationError> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .entries
            .get_mut(&element.0)
            .ok_or_else(|| AutomationError::ElementNotFound(element.0.clone()))?;
        if entry.node.stale_probes > 0 {
            entry.node.stale_probes -= 1;
            return Err(AutomationError::StaleElement(element.0.clone()));
        }
        Ok(entry.node.enabled)
    }

    async fn execute_script(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, AutomationError> {
        let target = script_element(&args);
        let mut state = self.state.lock().unwrap();
        state.scripts.push(script.to_string());
        if script.contains("window.open") {
            state.tabs += 1;
        } else if script.contains("arguments[0].click()") {
            if let Some(id) = target {
                Self::run_click(&mut state, &id);
            }
        } else if script.contains("ace.edit") {
            if let (Some(id), Some(text)) = (target, args.get(1).and_then(Value::as_str)) {
                if let Some(entry) = state.entries.get_mut(&id) {
                    entry.node.value = Some(text.to_string());
                }
                state.ace_sets.push((id, text.to_string()));
            }
        } else if script.contains("dispatchEvent(new Event('change'") {
            if let (Some(id), Some(value)) = (target, args.get(1).and_then(Value::as_str)) {
                if let Some(entry) = state.entries.get_mut(&id) {
                    entry.node.value = Some(value.to_string());
                }
                state.fills.push((id, value.to_string()));
            }
        } else if script.contains("screen.availWidth") {
            return Ok(serde_json::json!([1920.0, 1080.0]));
        } else if script.contains("window.innerHeight") {
            return Ok(serde_json::json!(1080.0));
        }
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
