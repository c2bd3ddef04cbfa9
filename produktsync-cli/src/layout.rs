//! Window geometry for the shared operator screen: browser sized by
//! screen ratios, then zoomed out until the CRM's stacked frames fit.

use crate::config::LayoutConfig;
use crate::error::SyncError;
use produktsync::Session;
use serde_json::Value;
use tracing::info;

pub async fn setup_layout(session: &Session, cfg: &LayoutConfig) -> Result<(), SyncError> {
    let size = session
        .execute_script("return [screen.availWidth, screen.availHeight];", vec![])
        .await?;
    let (screen_w, screen_h) = match (
        size.get(0).and_then(Value::as_f64),
        size.get(1).and_then(Value::as_f64),
    ) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            return Err(SyncError::Config(
                "screen size could not be determined".into(),
            ))
        }
    };

    let width = (screen_w * cfg.browser_width_ratio) as u32;
    let height = (screen_h * cfg.browser_height_ratio) as u32;
    session.engine().set_window_rect(0, 0, width, height).await?;
    info!("browser window set to {width} x {height} px");

    let step = cfg.zoom_step_pct.max(1);
    let mut zoom: u32 = 100;
    let mut inner = viewport_height(session).await?;
    while inner < cfg.min_browser_height && zoom > 50 {
        zoom = zoom.saturating_sub(step);
        session
            .execute_script(
                "document.body.style.zoom = arguments[0] + '%';",
                vec![Value::from(zoom)],
            )
            .await?;
        inner = viewport_height(session).await?;
        info!("zoom reduced to {zoom}% (viewport height {inner} px)");
    }
    Ok(())
}

async fn viewport_height(session: &Session) -> Result<u32, SyncError> {
    let value = session
        .execute_script("return window.innerHeight;", vec![])
        .await?;
    Ok(value.as_f64().unwrap_or(0.0) as u32)
}
