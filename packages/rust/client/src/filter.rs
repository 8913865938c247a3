//! Structured query filters.
//!
//! Serializes to the store's boolean filter tree, e.g.
//! `{"and":[{"property":"Status","select":{"equals":"Active"}}]}`.

use serde::Serialize;

use notionsite_shared::Page;

/// A boolean filter tree over named properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Filter {
    And {
        and: Vec<Filter>,
    },
    Or {
        or: Vec<Filter>,
    },
    Property {
        property: String,
        #[serde(flatten)]
        condition: Condition,
    },
}

/// A typed condition on one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Select(SelectCondition),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectCondition {
    pub equals: String,
}

impl Filter {
    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And { and: filters }
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or { or: filters }
    }

    /// `property` is a select whose option equals `value`.
    pub fn select_equals(property: &str, value: &str) -> Self {
        Filter::Property {
            property: property.to_string(),
            condition: Condition::Select(SelectCondition {
                equals: value.to_string(),
            }),
        }
    }

    /// `property` is a select whose option is one of `values`.
    pub fn select_in(property: &str, values: &[&str]) -> Self {
        Filter::or(
            values
                .iter()
                .map(|value| Filter::select_equals(property, value))
                .collect(),
        )
    }

    /// Evaluate the filter against a page, the way the store would.
    pub fn matches(&self, page: &Page) -> bool {
        match self {
            Filter::And { and } => and.iter().all(|f| f.matches(page)),
            Filter::Or { or } => or.iter().any(|f| f.matches(page)),
            Filter::Property {
                property,
                condition: Condition::Select(SelectCondition { equals }),
            } => page.select(property) == Some(equals.as_str()),
        }
    }
}
