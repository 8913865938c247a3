//! Joining role-assignment records onto entities.
//!
//! A subscription record assigns one person a role on zero or more pages
//! (listed in its relation property). People are derived from subscriptions,
//! never stored on their own.

use std::collections::HashMap;

use notionsite_shared::{Page, Person};

/// Relation listing the pages a subscription concerns.
pub const RELATION_PROPERTY: &str = "PWCIs";

pub const ORGANIZATION_LEAD: &str = "Organization Lead";
pub const WORKING_GROUP_CHAIR: &str = "Working Group Chair";
pub const PROJECT_LEAD: &str = "Project Lead";
pub const PROJECT_CO_LEAD: &str = "Project Co-Lead";
pub const COMMITTEE_CHAIR: &str = "Committee Chair";
pub const COMMITTEE_VICE_CHAIR: &str = "Committee Vice-Chair";
pub const COMMITTEE_MEMBER: &str = "Committee Member";

/// Roles a build fetches subscriptions for.
pub const SUBSCRIBED_ROLES: [&str; 7] = [
    ORGANIZATION_LEAD,
    WORKING_GROUP_CHAIR,
    PROJECT_LEAD,
    PROJECT_CO_LEAD,
    COMMITTEE_CHAIR,
    COMMITTEE_VICE_CHAIR,
    COMMITTEE_MEMBER,
];

/// Roles that list a person under their company on the member page.
pub const ORG_LEAD_ROLES: [&str; 4] = [
    ORGANIZATION_LEAD,
    PROJECT_LEAD,
    COMMITTEE_CHAIR,
    COMMITTEE_MEMBER,
];

/// People grouped by company name.
pub type OrgLeads = HashMap<String, Vec<Person>>;

/// The role a subscription assigns.
pub fn role(subscription: &Page) -> Option<&str> {
    subscription.select("Role for Subscription")
}

/// Company name computed for a subscription.
pub fn company(subscription: &Page) -> Option<&str> {
    subscription.formula_string("API-MN")
}

/// Derive the person a subscription describes.
pub fn extract_person(subscription: &Page) -> Person {
    let name = [
        subscription.rollup_text("First Name"),
        subscription.rollup_text("Surname"),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    Person {
        id: subscription
            .relation_ids("Volunteers")
            .next()
            .unwrap_or_default()
            .to_string(),
        name,
        role: role(subscription).map(String::from),
        city: subscription.rollup_text("City").map(String::from),
        title: subscription.rollup_text("Title").map(String::from),
        company: company(subscription).map(String::from),
        linkedin: subscription.rollup_url("Volunteer LinkedIn").map(String::from),
    }
}

/// Subscriptions whose relation list contains `page_id`, in input order.
pub fn subscriptions_for<'a>(page_id: &str, subscriptions: &'a [Page]) -> Vec<&'a Page> {
    subscriptions
        .iter()
        .filter(|s| s.relation_ids(RELATION_PROPERTY).any(|id| id == page_id))
        .collect()
}

/// Everyone subscribed to `page_id`, whatever their role.
pub fn people_for(page_id: &str, subscriptions: &[Page]) -> Vec<Person> {
    subscriptions_for(page_id, subscriptions)
        .into_iter()
        .map(extract_person)
        .collect()
}

/// Split a committee's people into `(leads, members)`.
///
/// Chairs and vice-chairs lead; committee members are members. Other roles
/// on the committee appear in neither list.
pub fn split_committee_people(
    page_id: &str,
    subscriptions: &[Page],
) -> (Vec<Person>, Vec<Person>) {
    let mut leads = Vec::new();
    let mut members = Vec::new();

    for subscription in subscriptions_for(page_id, subscriptions) {
        match role(subscription) {
            Some(COMMITTEE_CHAIR | COMMITTEE_VICE_CHAIR) => {
                leads.push(extract_person(subscription))
            }
            Some(COMMITTEE_MEMBER) => members.push(extract_person(subscription)),
            _ => {}
        }
    }

    (leads, members)
}

/// Group people by company, for the roles in [`ORG_LEAD_ROLES`].
///
/// Looked up by member name, so two members sharing a name share leads.
pub fn org_leads_by_company(subscriptions: &[Page]) -> OrgLeads {
    let mut leads = OrgLeads::new();

    for subscription in subscriptions {
        let Some(company) = company(subscription) else {
            continue;
        };
        if !role(subscription).is_some_and(|r| ORG_LEAD_ROLES.contains(&r)) {
            continue;
        }
        leads
            .entry(company.to_string())
            .or_default()
            .push(extract_person(subscription));
    }

    leads
}
