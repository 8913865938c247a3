//! Page → entity mapping.
//!
//! Mappers are pure: every remote input (subscriptions, sibling projects,
//! rendered content) is fetched beforehand and passed in, so mapping the same
//! inputs twice yields identical entities.

use chrono::NaiveDate;

use notionsite_shared::{
    Committee, Member, Page, ParentRef, Project, RelatedProject, WorkingGroup,
};

use crate::assets::{AssetFolder, asset_path};
use crate::people::{OrgLeads, people_for, split_committee_people};

/// Select holding the working group or committee a project belongs to.
pub const PARENT_PROPERTY: &str = "Parent";

/// Format an ISO date (or the date part of a date-time) as `Mar 5 2024`.
pub fn format_date(value: &str) -> Option<String> {
    let date_part = value.trim().split('T').next()?;
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some(date.format("%b %-d %Y").to_string())
}

/// Local path of a page's icon, when it has an image icon.
pub fn icon_path(page: &Page, folder: AssetFolder) -> Option<String> {
    asset_path(folder, &page.id, page.icon_url()?)
}

fn title(page: &Page) -> String {
    page.title("Name").unwrap_or_default().to_string()
}

fn description(page: &Page) -> String {
    page.rich_text("Description").unwrap_or_default().to_string()
}

fn kind_or(page: &Page, default: &str) -> String {
    page.select("Type").unwrap_or(default).to_string()
}

fn url(page: &Page, name: &str) -> Option<String> {
    page.url(name).map(String::from)
}

fn google_group(page: &Page) -> Option<String> {
    page.email("Google Group").map(|email| email.trim().to_string())
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

pub fn map_project(page: &Page, subscriptions: &[Page], page_content: String) -> Project {
    Project {
        id: page.id.clone(),
        title: title(page),
        kind: kind_or(page, ""),
        description: description(page),
        working_group: ParentRef {
            name: page.select(PARENT_PROPERTY).unwrap_or_default().to_string(),
        },
        icon: icon_path(page, AssetFolder::Projects),
        website: url(page, "Website URL"),
        repo: url(page, "Repo URL"),
        google_group: google_group(page),
        page_content,
        lifecycle_stage: page.select("Lifecycle Stage").map(String::from),
        launch_date: page.date_start("Launch date").and_then(format_date),
        leads: people_for(&page.id, subscriptions),
    }
}

/// Summary of a project listed under `parent_title`.
pub fn map_related_project(project: &Page, parent_title: &str) -> RelatedProject {
    RelatedProject {
        id: project.id.clone(),
        title: title(project),
        description: description(project),
        kind: kind_or(project, ""),
        icon: icon_path(project, AssetFolder::Projects),
        working_group: ParentRef {
            name: parent_title.to_string(),
        },
    }
}

/// Projects whose parent select names `parent_title`.
///
/// This is a name join: two groups with the same title list the same
/// projects.
pub fn related_projects(projects: &[Page], parent_title: &str) -> Vec<RelatedProject> {
    projects
        .iter()
        .filter(|project| project.select(PARENT_PROPERTY) == Some(parent_title))
        .map(|project| map_related_project(project, parent_title))
        .collect()
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// Map a member organization; its leads are looked up by member name.
pub fn map_member(page: &Page, org_leads: &OrgLeads) -> Member {
    let name = page.title("Member Name ").unwrap_or_default().to_string();
    let logo = page
        .first_file_url("Logo")
        .and_then(|url| asset_path(AssetFolder::Members, &page.id, url));

    Member {
        id: page.id.clone(),
        logo,
        description: page.rich_text("Description").map(String::from),
        level: page.select("Membership Level ").map(String::from),
        website: url(page, "Website"),
        membership_since: page
            .date_start("Membership Start Date")
            .and_then(format_date),
        leads: org_leads.get(&name).cloned(),
        name,
    }
}

// ---------------------------------------------------------------------------
// Working groups and committees
// ---------------------------------------------------------------------------

pub fn map_working_group(
    page: &Page,
    subscriptions: &[Page],
    projects: &[Page],
    page_content: String,
) -> WorkingGroup {
    let title = title(page);

    WorkingGroup {
        id: page.id.clone(),
        kind: kind_or(page, "Working Group"),
        description: description(page),
        icon: icon_path(page, AssetFolder::WorkingGroups),
        website: url(page, "Website URL"),
        repo: url(page, "Repo URL"),
        google_group: google_group(page),
        page_content,
        leads: people_for(&page.id, subscriptions),
        projects: related_projects(projects, &title),
        title,
    }
}

pub fn map_committee(
    page: &Page,
    subscriptions: &[Page],
    projects: &[Page],
    page_content: String,
) -> Committee {
    let title = title(page);
    let (leads, members) = split_committee_people(&page.id, subscriptions);

    Committee {
        id: page.id.clone(),
        kind: kind_or(page, "Committee"),
        description: description(page),
        icon: icon_path(page, AssetFolder::Committees),
        website: url(page, "Website URL"),
        repo: url(page, "Repo URL"),
        google_group: google_group(page),
        page_content,
        leads,
        members,
        projects: related_projects(projects, &title),
        title,
    }
}
