//! Keyword-based task categorization.
//!
//! # Invariants
//! - Matching is a case-insensitive substring test.
//! - Rules are evaluated in table order; the first hit wins.
//! - Text matching no rule is `Category::General`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Category label attached to a priority. Serialized as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Campaign,
    Admin,
    Creative,
    Meeting,
    Development,
    Review,
    Documentation,
    Planning,
    General,
}

const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Campaign, &["campaign", "marketing", "promotion"]),
    (Category::Admin, &["admin", "administrative", "paperwork"]),
    (
        Category::Creative,
        &["creative", "design", "mockup", "artistic"],
    ),
    (Category::Meeting, &["meeting", "call"]),
    (Category::Development, &["code", "develop", "bug"]),
    (Category::Review, &["review", "approve"]),
    (Category::Documentation, &["write", "document"]),
    (Category::Planning, &["plan", "prepare"]),
];

static CATEGORY_RULES: Lazy<Vec<(Category, Regex)>> = Lazy::new(|| {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let alternation = keywords
                .iter()
                .map(|keyword| regex::escape(keyword))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!("(?i){alternation}");
            (
                *category,
                Regex::new(&pattern).expect("valid category keyword regex"),
            )
        })
        .collect()
});

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Campaign,
        Category::Admin,
        Category::Creative,
        Category::Meeting,
        Category::Development,
        Category::Review,
        Category::Documentation,
        Category::Planning,
        Category::General,
    ];

    /// Derives a category from free-form task text.
    pub fn classify(text: &str) -> Category {
        CATEGORY_RULES
            .iter()
            .find(|(_, rule)| rule.is_match(text))
            .map_or(Category::General, |(category, _)| *category)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Campaign => "Campaign",
            Category::Admin => "Admin",
            Category::Creative => "Creative",
            Category::Meeting => "Meeting",
            Category::Development => "Development",
            Category::Review => "Review",
            Category::Documentation => "Documentation",
            Category::Planning => "Planning",
            Category::General => "General",
        }
    }

    /// Parses a stored label. Exact match only.
    pub fn from_label(value: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| category.label() == value)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::Category;

    #[test]
    fn first_matching_rule_wins() {
        assert_eq!(
            Category::classify("Review the marketing campaign"),
            Category::Campaign
        );
        assert_eq!(
            Category::classify("Write code review notes"),
            Category::Development
        );
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert_eq!(Category::classify("Call client"), Category::Meeting);
        assert_eq!(Category::classify("REDESIGN landing page"), Category::Creative);
        assert_eq!(Category::classify("Write docs"), Category::Documentation);
        assert_eq!(Category::classify("Prepare Q3 roadmap"), Category::Planning);
        assert_eq!(Category::classify("Approve expenses"), Category::Review);
        assert_eq!(Category::classify("File paperwork"), Category::Admin);
    }

    #[test]
    fn substring_matches_inside_longer_words() {
        // "recall" contains "call".
        assert_eq!(Category::classify("Recall shipment"), Category::Meeting);
        assert_eq!(Category::classify("Developer onboarding"), Category::Development);
    }

    #[test]
    fn unmatched_text_is_general() {
        assert_eq!(Category::classify("Lunch with team"), Category::General);
        assert_eq!(Category::classify(""), Category::General);
    }

    #[test]
    fn labels_round_trip_through_from_label() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("campaign"), None);
    }

    #[test]
    fn serializes_as_display_label() {
        let json = serde_json::to_value(Category::Documentation).unwrap();
        assert_eq!(json, "Documentation");
    }
}
