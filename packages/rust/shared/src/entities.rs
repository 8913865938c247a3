//! Normalized entity shapes consumed by the site's presentation layer.
//!
//! Serialized with camelCase keys; absent optional fields are omitted.

use serde::{Deserialize, Serialize};

/// A person derived from a role-assignment record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

/// The group a project belongs to, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub working_group: ParentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_group: Option<String>,
    pub page_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_date: Option<String>,
    pub leads: Vec<Person>,
}

/// Project summary listed under a working group or committee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedProject {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub working_group: ParentRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_since: Option<String>,
    /// People whose company matches this member's name; `None` when nobody matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leads: Option<Vec<Person>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingGroup {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_group: Option<String>,
    pub page_content: String,
    pub leads: Vec<Person>,
    pub projects: Vec<RelatedProject>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Committee {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_group: Option<String>,
    pub page_content: String,
    pub leads: Vec<Person>,
    pub members: Vec<Person>,
    pub projects: Vec<RelatedProject>,
}

/// The four collections produced by one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collections {
    pub projects: Vec<Project>,
    pub members: Vec<Member>,
    pub working_groups: Vec<WorkingGroup>,
    pub committees: Vec<Committee>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_serializes_camel_case() {
        let project = Project {
            id: "p1".into(),
            title: "Open Data".into(),
            kind: "WG Project".into(),
            google_group: Some("od@example.org".into()),
            working_group: ParentRef {
                name: "Data WG".into(),
            },
            ..Project::default()
        };

        let json = serde_json::to_value(&project).expect("serialize");
        assert_eq!(json["type"], "WG Project");
        assert_eq!(json["googleGroup"], "od@example.org");
        assert_eq!(json["workingGroup"]["name"], "Data WG");
        assert_eq!(json["pageContent"], "");
        assert!(json.get("icon").is_none());
        assert!(json.get("launchDate").is_none());
    }

    #[test]
    fn member_without_leads_omits_field() {
        let member = Member {
            id: "m1".into(),
            name: "Acme".into(),
            ..Member::default()
        };
        let json = serde_json::to_value(&member).expect("serialize");
        assert!(json.get("leads").is_none());
        assert_eq!(json["name"], "Acme");
    }
}
