use super::{test_clock, FakeElement, FakeEngine};
use crate::errors::AutomationError;
use crate::selector::Selector;
use crate::Session;
use std::sync::Arc;

fn frames() -> (Selector, Selector) {
    (
        Selector::Id("contentframeprodukte".to_string()),
        Selector::Id("frameunten".to_string()),
    )
}

fn session_with_frames(tabs: usize) -> (Session, Arc<FakeEngine>) {
    let engine = FakeEngine::with_tabs(tabs);
    let (outer, inner) = frames();
    engine.add(&outer, FakeElement::default());
    engine.add(&inner, FakeElement::default());
    let engine = Arc::new(engine);
    (
        Session::with_clock(engine.clone(), test_clock()),
        engine,
    )
}

#[tokio::test]
async fn switch_to_tab_requires_the_tab_to_exist() {
    let (session, engine) = session_with_frames(2);
    let mut nav = session.navigator();
    nav.switch_to_tab(1).await.expect("second tab is open");
    assert_eq!(engine.current_tab(), 1);

    let (session, _) = session_with_frames(1);
    let mut nav = session.navigator();
    let result = nav.switch_to_tab(1).await;
    assert!(matches!(result, Err(AutomationError::TabNotFound(_))));
}

#[tokio::test]
async fn descend_is_idempotent_with_respect_to_prior_depth() {
    let (session, engine) = session_with_frames(2);
    let (outer, inner) = frames();
    let chain = [outer, inner];
    let mut nav = session.navigator();

    // Repeated descents from arbitrary prior depth always land at depth 2.
    for _ in 0..3 {
        nav.descend(&chain, 5).await.expect("descend");
        assert_eq!(nav.frame_chain().len(), 2);
        assert_eq!(engine.frame_depth(), 2);
    }
}

#[tokio::test]
async fn reset_clears_the_chain() {
    let (session, engine) = session_with_frames(2);
    let (outer, _) = frames();
    let mut nav = session.navigator();
    nav.enter_frame(outer, 5).await.expect("enter frame");
    assert_eq!(nav.frame_chain().len(), 1);

    nav.reset_to_top().await.expect("reset");
    assert!(nav.frame_chain().is_empty());
    assert_eq!(engine.frame_depth(), 0);
}

#[tokio::test]
async fn entering_a_missing_frame_is_a_frame_error() {
    let (session, _) = session_with_frames(2);
    let mut nav = session.navigator();
    let result = nav
        .enter_frame(Selector::Id("no-such-frame".to_string()), 2)
        .await;
    assert!(matches!(result, Err(AutomationError::FrameNotFound(_))));
}

#[tokio::test]
async fn exit_to_parent_pops_one_level() {
    let (session, engine) = session_with_frames(2);
    let (outer, inner) = frames();
    let mut nav = session.navigator();
    nav.descend(&[outer, inner], 5).await.expect("descend");

    nav.exit_to_parent().await.expect("exit");
    assert_eq!(nav.frame_chain().len(), 1);
    assert_eq!(engine.frame_depth(), 1);
}
