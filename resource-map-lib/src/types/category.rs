use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ResourceMapError;

/// Marker color used when a category identifier is not recognised.
pub const DEFAULT_MARKER_COLOR: &str = "#FF0000";

/// Keyword table scanned in order; the first keyword contained in the
/// category text decides the category.
const CATEGORY_KEYWORDS: [(&str, Category); 12] = [
    ("基金", Category::Foundation),
    ("基金會", Category::Foundation),
    ("財團", Category::Foundation),
    ("里長", Category::Chief),
    ("里辦", Category::Chief),
    ("里辦公室", Category::Chief),
    ("教會", Category::Church),
    ("堂會", Category::Church),
    ("教堂", Category::Church),
    ("鎖匠", Category::Locksmith),
    ("鎖行", Category::Locksmith),
    ("開鎖", Category::Locksmith),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Foundation,
    Chief,
    Church,
    Locksmith,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Foundation,
        Category::Chief,
        Category::Church,
        Category::Locksmith,
    ];

    /// Map free text from a CSV cell to a canonical category.
    ///
    /// Exact canonical identifiers map to themselves; otherwise the keyword
    /// table decides, and anything unmatched (including empty text) is a
    /// foundation.
    pub fn normalize(text: &str) -> Category {
        let text = text.trim().to_lowercase();
        if let Some(category) = Category::from_identifier(&text) {
            return category;
        }

        CATEGORY_KEYWORDS
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map(|(_, category)| *category)
            .unwrap_or(Category::Foundation)
    }

    pub fn from_identifier(identifier: &str) -> Option<Category> {
        match identifier {
            "foundation" => Some(Category::Foundation),
            "chief" => Some(Category::Chief),
            "church" => Some(Category::Church),
            "locksmith" => Some(Category::Locksmith),
            _ => None,
        }
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            Category::Foundation => "foundation",
            Category::Chief => "chief",
            Category::Church => "church",
            Category::Locksmith => "locksmith",
        }
    }

    /// Label shown in popups and list items, and matched by the search box.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Foundation => "基金會",
            Category::Chief => "里長",
            Category::Church => "教會",
            Category::Locksmith => "鎖匠",
        }
    }

    pub fn marker_color(&self) -> &'static str {
        match self {
            Category::Foundation => "#FF5722",
            Category::Chief => "#4CAF50",
            Category::Church => "#2196F3",
            Category::Locksmith => "#FFC107",
        }
    }
}

/// Marker color for a raw category identifier, falling back to the default
/// color for anything that is not canonical.
pub fn marker_color_for(identifier: &str) -> &'static str {
    Category::from_identifier(identifier)
        .map(|c| c.marker_color())
        .unwrap_or(DEFAULT_MARKER_COLOR)
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// State of the mutually exclusive category buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => *selected == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ResourceMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "all" {
            return Ok(CategoryFilter::All);
        }
        Category::from_identifier(&s)
            .map(CategoryFilter::Only)
            .ok_or_else(|| {
                ResourceMapError::Processing(format!(
                    "Unknown category filter '{}' [Expected: all, foundation, chief, church, locksmith]",
                    s
                ))
            })
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => category.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_map_to_categories() {
        assert_eq!(Category::normalize("基金會"), Category::Foundation);
        assert_eq!(Category::normalize("財團法人"), Category::Foundation);
        assert_eq!(Category::normalize("里辦公室"), Category::Chief);
        assert_eq!(Category::normalize("  長老教會 "), Category::Church);
        assert_eq!(Category::normalize("教堂"), Category::Church);
        assert_eq!(Category::normalize("24小時開鎖"), Category::Locksmith);
        assert_eq!(Category::normalize("鎖行"), Category::Locksmith);
    }

    #[test]
    fn test_unmatched_text_defaults_to_foundation() {
        assert_eq!(Category::normalize(""), Category::Foundation);
        assert_eq!(Category::normalize("   "), Category::Foundation);
        assert_eq!(Category::normalize("社區關懷據點"), Category::Foundation);
    }

    #[test]
    fn test_canonical_identifiers_are_idempotent() {
        for category in Category::ALL {
            assert_eq!(Category::normalize(category.identifier()), category);
            assert_eq!(
                Category::normalize(&category.identifier().to_uppercase()),
                category
            );
        }
    }

    #[test]
    fn test_first_keyword_in_table_wins() {
        // Both a foundation and a church keyword are present; foundation comes first.
        assert_eq!(Category::normalize("教會基金會"), Category::Foundation);
        // Chief keywords precede locksmith keywords.
        assert_eq!(Category::normalize("鎖匠里長"), Category::Chief);
    }

    #[test]
    fn test_marker_colors() {
        assert_eq!(marker_color_for("church"), "#2196F3");
        assert_eq!(marker_color_for("bakery"), DEFAULT_MARKER_COLOR);
    }

    #[test]
    fn test_category_filter_parsing() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "Chief".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Chief)
        );
        assert!("bakery".parse::<CategoryFilter>().is_err());
    }
}
