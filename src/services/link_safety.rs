// Startpage link safety
// Bookmark URLs are stored exactly as entered. Scripting schemes are only
// neutralized when a bookmark is opened.

use serde::Serialize;
use tracing::warn;

use crate::types::bookmark::Bookmark;

/// Schemes that execute code or embed content instead of navigating.
pub const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Target used in place of an unsafe URL.
pub const BLOCKED_HREF: &str = "#";

/// Returns `false` for URLs with a blocked scheme. Whitespace and control
/// characters are ignored and the comparison is case-insensitive, matching how
/// browsers normalize the scheme.
pub fn is_safe_url(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .flat_map(char::to_lowercase)
        .collect();
    !BLOCKED_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

/// The href to render for `url`.
pub fn secure_href(url: &str) -> &str {
    if is_safe_url(url) {
        url
    } else {
        BLOCKED_HREF
    }
}

/// Result of opening a bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Navigation {
    Open { href: String },
    Blocked { warning: String },
}

pub fn navigate(bookmark: &Bookmark) -> Navigation {
    if is_safe_url(&bookmark.url) {
        Navigation::Open {
            href: bookmark.url.clone(),
        }
    } else {
        warn!(id = %bookmark.id, "[LinkSafety] blocked navigation to unsafe URL");
        Navigation::Blocked {
            warning: format!(
                "\"{}\" points to an unsafe link and was not opened.",
                bookmark.title
            ),
        }
    }
}
