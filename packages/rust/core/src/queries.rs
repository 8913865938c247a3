//! The five datasets a build reads, and the filters that select them.

use notionsite_client::Filter;
use notionsite_shared::{SourceConfig, SourcesConfig};

use crate::people::SUBSCRIBED_ROLES;

/// A filtered query against one of the configured databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Projects,
    Subscriptions,
    Members,
    WorkingGroups,
    Committees,
}

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::Projects,
        Dataset::Subscriptions,
        Dataset::Members,
        Dataset::WorkingGroups,
        Dataset::Committees,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dataset::Projects => "projects",
            Dataset::Subscriptions => "subscriptions",
            Dataset::Members => "members",
            Dataset::WorkingGroups => "working-groups",
            Dataset::Committees => "committees",
        }
    }

    /// The configured database this dataset is read from, with its label.
    ///
    /// Working groups and committees live in the projects database.
    pub fn source(self, sources: &SourcesConfig) -> (&'static str, &SourceConfig) {
        match self {
            Dataset::Projects | Dataset::WorkingGroups | Dataset::Committees => {
                ("projects", &sources.projects)
            }
            Dataset::Subscriptions => ("subscriptions", &sources.subscriptions),
            Dataset::Members => ("members", &sources.members),
        }
    }

    pub fn filter(self) -> Filter {
        match self {
            Dataset::Projects => Filter::and(vec![
                active("Internal Status"),
                Filter::select_in("Type", &["Committee Project", "WG Project"]),
                Filter::select_equals("Offer Subscription", "Yes"),
            ]),
            Dataset::Subscriptions => Filter::and(vec![
                active("Subscription Status"),
                Filter::select_in("Role for Subscription", &SUBSCRIBED_ROLES),
            ]),
            Dataset::Members => Filter::and(vec![active("Status")]),
            Dataset::WorkingGroups => Filter::and(vec![
                active("Internal Status"),
                Filter::select_equals("Type", "Working Group"),
            ]),
            Dataset::Committees => Filter::and(vec![
                active("Internal Status"),
                Filter::select_equals("Type", "Committee"),
            ]),
        }
    }
}

fn active(property: &str) -> Filter {
    Filter::select_equals(property, "Active")
}

#[cfg(test)]
mod tests {
    use super::*;
    use notionsite_shared::{Page, PropertyValue, SelectOption};
    use serde_json::json;

    fn page(selects: &[(&str, &str)]) -> Page {
        selects.iter().fold(Page::new("p"), |page, (name, value)| {
            page.with_property(
                *name,
                PropertyValue::Select {
                    select: Some(SelectOption {
                        name: (*value).into(),
                    }),
                },
            )
        })
    }

    #[test]
    fn projects_filter_shape() {
        assert_eq!(
            serde_json::to_value(Dataset::Projects.filter()).unwrap(),
            json!({
                "and": [
                    { "property": "Internal Status", "select": { "equals": "Active" } },
                    { "or": [
                        { "property": "Type", "select": { "equals": "Committee Project" } },
                        { "property": "Type", "select": { "equals": "WG Project" } }
                    ] },
                    { "property": "Offer Subscription", "select": { "equals": "Yes" } }
                ]
            })
        );
    }

    #[test]
    fn subscriptions_filter_lists_every_role() {
        let value = serde_json::to_value(Dataset::Subscriptions.filter()).unwrap();
        assert_eq!(value["and"][1]["or"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn group_filters_select_by_type() {
        let wg = page(&[("Internal Status", "Active"), ("Type", "Working Group")]);
        let committee = page(&[("Internal Status", "Active"), ("Type", "Committee")]);
        let inactive = page(&[("Internal Status", "Paused"), ("Type", "Committee")]);

        assert!(Dataset::WorkingGroups.filter().matches(&wg));
        assert!(!Dataset::WorkingGroups.filter().matches(&committee));
        assert!(Dataset::Committees.filter().matches(&committee));
        assert!(!Dataset::Committees.filter().matches(&inactive));
    }

    #[test]
    fn groups_read_the_projects_database() {
        let sources = SourcesConfig {
            projects: SourceConfig {
                database_id: "db-projects".into(),
                data_source_id: None,
            },
            ..SourcesConfig::default()
        };

        for dataset in [Dataset::Projects, Dataset::WorkingGroups, Dataset::Committees] {
            let (label, source) = dataset.source(&sources);
            assert_eq!(label, "projects");
            assert_eq!(source.database_id, "db-projects");
        }
        assert_eq!(Dataset::Members.source(&sources).0, "members");
    }
}
