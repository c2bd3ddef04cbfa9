//! Description HTML cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

// Inline `style` plus the editor's own style-tracking attribute. Both must
// go before storage, or the CRM's inline presentation overrides the Shop's
// styling after upload.
static INLINE_STYLE_ATTRS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+(?:style|data-mce-style)\s*=\s*("[^"]*"|'[^']*')"#).unwrap()
});

pub fn strip_inline_styles(html: &str) -> String {
    INLINE_STYLE_ATTRS.replace_all(html, "").into_owned()
}
