//! Raw content-store records: pages, property values, icons and rich text.
//!
//! Property bags are schema-less upstream, so every property kind is a
//! variant of [`PropertyValue`] and every accessor on [`Page`] returns an
//! `Option`. Nothing here assumes a property exists.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rich text
// ---------------------------------------------------------------------------

/// Inline formatting flags of a [`RichTextSpan`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
}

/// One run of annotated inline text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextSpan {
    /// The span text without formatting.
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub annotations: Annotations,
    /// Link target, if the span is a link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl RichTextSpan {
    /// An unformatted span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.annotations.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.annotations.italic = true;
        self
    }

    pub fn strikethrough(mut self) -> Self {
        self.annotations.strikethrough = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.annotations.underline = true;
        self
    }

    pub fn code(mut self) -> Self {
        self.annotations.code = true;
        self
    }

    pub fn link(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Text of the first span, if non-empty.
pub fn first_plain_text(spans: &[RichTextSpan]) -> Option<&str> {
    spans
        .first()
        .map(|span| span.plain_text.as_str())
        .filter(|text| !text.is_empty())
}

// ---------------------------------------------------------------------------
// Files and icons
// ---------------------------------------------------------------------------

/// `{ "url": ... }` payload shared by external and hosted files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUrl {
    #[serde(default)]
    pub url: String,
}

/// An entry of a `files` property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Hosted by the content store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileUrl>,
    /// Linked from elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<FileUrl>,
}

/// Page or callout icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    External { external: FileUrl },
    File { file: FileUrl },
    #[serde(other)]
    Unsupported,
}

impl Icon {
    /// Image URL for external and hosted icons.
    pub fn url(&self) -> Option<&str> {
        let url = match self {
            Icon::External { external } => Some(external.url.as_str()),
            Icon::File { file } => Some(file.url.as_str()),
            Icon::Emoji { .. } | Icon::Unsupported => None,
        };
        url.filter(|url| !url.is_empty())
    }

    /// The emoji character, for emoji icons.
    pub fn emoji(&self) -> Option<&str> {
        match self {
            Icon::Emoji { emoji } => Some(emoji.as_str()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Property values
// ---------------------------------------------------------------------------

/// A `select` option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

/// A `date` value; only the start is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// One entry of a `relation` property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

/// A `rollup` value. Array rollups hold one property value per related page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rollup {
    #[serde(default)]
    pub array: Vec<PropertyValue>,
}

/// A `formula` value. Only string formulas are read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
}

/// A typed property value, discriminated by the upstream `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichTextSpan>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichTextSpan>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    Email {
        #[serde(default)]
        email: Option<String>,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    Relation {
        #[serde(default)]
        relation: Vec<RelationRef>,
    },
    Rollup {
        #[serde(default)]
        rollup: Rollup,
    },
    Formula {
        #[serde(default)]
        formula: Formula,
    },
    Files {
        #[serde(default)]
        files: Vec<FileObject>,
    },
    #[serde(other)]
    Unsupported,
}

impl PropertyValue {
    /// First span text of a title or rich-text value.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Title { title } => first_plain_text(title),
            PropertyValue::RichText { rich_text } => first_plain_text(rich_text),
            _ => None,
        }
    }

    /// URL of a url value.
    pub fn as_url(&self) -> Option<&str> {
        match self {
            PropertyValue::Url { url } => url.as_deref().filter(|u| !u.is_empty()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A raw page record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    pub properties: HashMap<String, PropertyValue>,
}

impl Page {
    /// A page with no properties, for building fixtures.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Builder-style property insertion.
    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Builder-style icon assignment.
    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Text of the first title span.
    pub fn title(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::Title { title } => first_plain_text(title),
            _ => None,
        }
    }

    /// Text of the first rich-text span.
    pub fn rich_text(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::RichText { rich_text } => first_plain_text(rich_text),
            _ => None,
        }
    }

    /// Name of the selected option.
    pub fn select(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::Select { select } => select
                .as_ref()
                .map(|option| option.name.as_str())
                .filter(|name| !name.is_empty()),
            _ => None,
        }
    }

    pub fn url(&self, name: &str) -> Option<&str> {
        self.property(name)?.as_url()
    }

    pub fn email(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::Email { email } => email.as_deref().filter(|e| !e.is_empty()),
            _ => None,
        }
    }

    /// Start of a date value, as sent upstream.
    pub fn date_start(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::Date { date } => date
                .as_ref()
                .map(|d| d.start.as_str())
                .filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Ids of related pages, in upstream order. Empty when absent.
    pub fn relation_ids(&self, name: &str) -> impl Iterator<Item = &str> {
        let relations = match self.property(name) {
            Some(PropertyValue::Relation { relation }) => relation.as_slice(),
            _ => &[],
        };
        relations.iter().map(|r| r.id.as_str())
    }

    /// First element of an array rollup.
    pub fn rollup_first(&self, name: &str) -> Option<&PropertyValue> {
        match self.property(name)? {
            PropertyValue::Rollup { rollup } => rollup.array.first(),
            _ => None,
        }
    }

    /// Text of the first span of the first rollup element.
    pub fn rollup_text(&self, name: &str) -> Option<&str> {
        self.rollup_first(name)?.first_text()
    }

    /// URL held by the first rollup element.
    pub fn rollup_url(&self, name: &str) -> Option<&str> {
        self.rollup_first(name)?.as_url()
    }

    /// Result of a string formula.
    pub fn formula_string(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::Formula { formula } => {
                formula.string.as_deref().filter(|s| !s.is_empty())
            }
            _ => None,
        }
    }

    /// URL of the first hosted file of a files property.
    pub fn first_file_url(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::Files { files } => files
                .first()?
                .file
                .as_ref()
                .map(|f| f.url.as_str())
                .filter(|url| !url.is_empty()),
            _ => None,
        }
    }

    /// URL of the page icon, when it is an image.
    pub fn icon_url(&self) -> Option<&str> {
        self.icon.as_ref()?.url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_page() -> Page {
        serde_json::from_value(json!({
            "object": "page",
            "id": "page-1",
            "icon": { "type": "file", "file": { "url": "https://files.example.com/logo.PNG?sig=1", "expiry_time": "x" } },
            "properties": {
                "Name": { "id": "title", "type": "title", "title": [{ "type": "text", "plain_text": "Open Data", "annotations": { "bold": false, "italic": false, "strikethrough": false, "underline": false, "code": false, "color": "default" }, "href": null }] },
                "Description": { "id": "d", "type": "rich_text", "rich_text": [] },
                "Type": { "id": "t", "type": "select", "select": { "id": "x", "name": "WG Project", "color": "red" } },
                "Parent": { "id": "p", "type": "select", "select": null },
                "Website URL": { "id": "w", "type": "url", "url": "https://example.org" },
                "Google Group": { "id": "g", "type": "email", "email": " group@example.org " },
                "Launch date": { "id": "l", "type": "date", "date": { "start": "2024-03-05", "end": null, "time_zone": null } },
                "PWCIs": { "id": "r", "type": "relation", "relation": [{ "id": "a" }, { "id": "b" }], "has_more": false },
                "First Name": { "id": "f", "type": "rollup", "rollup": { "type": "array", "function": "show_original", "array": [{ "type": "rich_text", "rich_text": [{ "plain_text": "Ada" }] }] } },
                "Volunteer LinkedIn": { "id": "v", "type": "rollup", "rollup": { "type": "array", "array": [{ "type": "url", "url": "https://linkedin.com/in/ada" }] } },
                "API-MN": { "id": "m", "type": "formula", "formula": { "type": "string", "string": "Acme" } },
                "Logo": { "id": "lg", "type": "files", "files": [{ "name": "logo.svg", "type": "file", "file": { "url": "https://files.example.com/logo.svg" } }] },
                "Votes": { "id": "n", "type": "number", "number": 4 }
            }
        }))
        .expect("deserialize page")
    }

    #[test]
    fn accessors_read_typed_values() {
        let page = sample_page();
        assert_eq!(page.title("Name"), Some("Open Data"));
        assert_eq!(page.rich_text("Description"), None);
        assert_eq!(page.select("Type"), Some("WG Project"));
        assert_eq!(page.select("Parent"), None);
        assert_eq!(page.url("Website URL"), Some("https://example.org"));
        assert_eq!(page.email("Google Group"), Some(" group@example.org "));
        assert_eq!(page.date_start("Launch date"), Some("2024-03-05"));
        assert_eq!(page.relation_ids("PWCIs").collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(page.rollup_text("First Name"), Some("Ada"));
        assert_eq!(
            page.rollup_url("Volunteer LinkedIn"),
            Some("https://linkedin.com/in/ada")
        );
        assert_eq!(page.formula_string("API-MN"), Some("Acme"));
        assert_eq!(
            page.first_file_url("Logo"),
            Some("https://files.example.com/logo.svg")
        );
        assert_eq!(
            page.icon_url(),
            Some("https://files.example.com/logo.PNG?sig=1")
        );
    }

    #[test]
    fn unknown_kinds_and_missing_keys_are_lenient() {
        let page = sample_page();
        assert_eq!(page.property("Votes"), Some(&PropertyValue::Unsupported));
        assert_eq!(page.title("Missing"), None);
        assert_eq!(page.relation_ids("Missing").count(), 0);
        // Wrong kind for the accessor is just absent.
        assert_eq!(page.title("Type"), None);
    }

    #[test]
    fn emoji_icon_has_no_url() {
        let icon: Icon = serde_json::from_value(json!({ "type": "emoji", "emoji": "🚀" })).unwrap();
        assert_eq!(icon.url(), None);
        assert_eq!(icon.emoji(), Some("🚀"));
    }
}
