use serde::{Deserialize, Serialize};

/// Classification tag for an uploaded mesh.
///
/// The set is fixed: it drives default display colors and grouping in the
/// viewer sidebar. Serialized in SCREAMING case on the wire (`"UPPER"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Upper arch.
    Upper,
    /// Lower arch.
    Lower,
    /// Support bar.
    Bar,
    /// Gum / gingiva.
    Gum,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 4] = [
        Category::Upper,
        Category::Lower,
        Category::Bar,
        Category::Gum,
    ];

    /// Parse a wire-format category string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UPPER" => Some(Category::Upper),
            "LOWER" => Some(Category::Lower),
            "BAR" => Some(Category::Bar),
            "GUM" => Some(Category::Gum),
            _ => None,
        }
    }

    /// Wire-format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Upper => "UPPER",
            Category::Lower => "LOWER",
            Category::Bar => "BAR",
            Category::Gum => "GUM",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guess a category from a filename.
///
/// Pure substring heuristic over the lowercased name. Used only as a default
/// when no explicit category was supplied; explicit metadata always wins.
pub fn guess_category(name: &str) -> Option<Category> {
    let lower = name.to_lowercase();

    if lower.contains("upper") || lower.contains("maxilla") {
        Some(Category::Upper)
    } else if lower.contains("lower") || lower.contains("mandib") {
        Some(Category::Lower)
    } else if lower.contains("bar") {
        Some(Category::Bar)
    } else if lower.contains("gum") || lower.contains("gingiva") {
        Some(Category::Gum)
    } else {
        None
    }
}
