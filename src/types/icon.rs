//! Bookmark icon identifiers.
//!
//! Icon names are free text in storage. Rendering only ever sees a name from
//! [`ICON_CATALOG`]; anything else resolves to [`DEFAULT_ICON`].

use serde::{Serialize, Serializer};

pub const DEFAULT_ICON: &str = "Globe";

/// Allow-list of icon names a bookmark may use, sorted.
pub const ICON_CATALOG: &[&str] = &[
    "Bike", "BookOpen", "Briefcase", "Building2", "Calendar", "Camera", "Car",
    "CheckSquare", "ClipboardList", "Cloud", "Code2", "Coffee", "Cpu", "CreditCard",
    "Database", "FileText", "Flame", "Gamepad2", "Github", "Globe", "GraduationCap",
    "Headphones", "Heart", "IceCream2", "Image", "Lock", "Mail", "Map", "MessageSquare",
    "Monitor", "Moon", "Music", "Navigation", "Palette", "Pizza", "Plane", "Rocket",
    "Search", "ShoppingBag", "Smartphone", "Smile", "Speaker", "Star", "Sun", "Train",
    "Tv", "Utensils", "Video", "Wifi", "Zap",
];

/// Keyword rules for suggesting an icon while a bookmark is being typed.
/// First matching rule wins.
const SUGGESTIONS: &[(&[&str], &str)] = &[
    (&["school", "edu", "class"], "GraduationCap"),
    (&["work", "job", "office"], "Briefcase"),
    (&["padlet", "board"], "ClipboardList"),
    (&["ice", "scream"], "IceCream2"),
    (&["mail"], "Mail"),
    (&["shop", "store"], "ShoppingBag"),
    (&["bank", "pay"], "CreditCard"),
    (&["tube", "video"], "Video"),
    (&["game"], "Gamepad2"),
    (&["music"], "Music"),
    (&["code", "github"], "Code2"),
    (&["travel", "map"], "Map"),
];

/// A validated icon name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconName(&'static str);

impl IconName {
    /// Resolves a stored icon name against the catalog, falling back to the
    /// default for missing or unknown names.
    pub fn resolve(name: Option<&str>) -> Self {
        name.and_then(Self::lookup).unwrap_or_default()
    }

    /// Exact, case-sensitive catalog lookup.
    pub fn lookup(name: &str) -> Option<Self> {
        ICON_CATALOG
            .binary_search(&name)
            .ok()
            .map(|idx| Self(ICON_CATALOG[idx]))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Default for IconName {
    fn default() -> Self {
        Self(DEFAULT_ICON)
    }
}

impl Serialize for IconName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// Suggests an icon from a title or URL being typed. Keeps `current` when no
/// keyword matches.
pub fn suggest_icon(input: &str, current: IconName) -> IconName {
    let lower = input.to_lowercase();
    SUGGESTIONS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .and_then(|(_, icon)| IconName::lookup(icon))
        .unwrap_or(current)
}
