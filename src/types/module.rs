use std::fmt;

use serde::{Deserialize, Serialize};

/// The content kinds a tag can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Card,
    Plant,
    Mug,
    Gift,
    Page,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::Card,
        ModuleKind::Plant,
        ModuleKind::Mug,
        ModuleKind::Gift,
        ModuleKind::Page,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ModuleKind::Card => "card",
            ModuleKind::Plant => "plant",
            ModuleKind::Mug => "mug",
            ModuleKind::Gift => "gift",
            ModuleKind::Page => "page",
        }
    }

    /// Name of the table holding modules of this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            ModuleKind::Card => "cards",
            ModuleKind::Plant => "plants",
            ModuleKind::Mug => "mugs",
            ModuleKind::Gift => "gifts",
            ModuleKind::Page => "pages",
        }
    }

    pub fn parse(s: &str) -> Option<ModuleKind> {
        match s {
            "card" => Some(ModuleKind::Card),
            "plant" => Some(ModuleKind::Plant),
            "mug" => Some(ModuleKind::Mug),
            "gift" => Some(ModuleKind::Gift),
            "page" => Some(ModuleKind::Page),
            _ => None,
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to one module instance in the store of its kind.
///
/// A tag holds at most one of these, which is what keeps the
/// one-tag-to-one-module binding exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRef {
    pub kind: ModuleKind,
    pub id: String,
}

impl ModuleRef {
    pub fn new(kind: ModuleKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
