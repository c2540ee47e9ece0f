use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A geographic scope for a resource or a user.
///
/// `All` is the sentinel meaning "everywhere"; any other value is an
/// uppercased region code (e.g. "AZ", "CA"). Backend documents carry these
/// as plain strings, so parsing is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Region {
    All,
    Code(String),
}

impl Region {
    pub fn parse(s: &str) -> Region {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("ALL") {
            Region::All
        } else {
            Region::Code(trimmed.to_uppercase())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Region::All)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Region::All => "ALL",
            Region::Code(code) => code,
        }
    }
}

impl From<String> for Region {
    fn from(s: String) -> Self {
        Region::parse(&s)
    }
}

impl From<Region> for String {
    fn from(r: Region) -> Self {
        r.as_str().to_string()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A support resource (hotline, financial aid program, discount, ...).
///
/// Resource documents are created and mutated exclusively by the backend;
/// the client only ever reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    /// Display text; may join several numbers with "or" or commas.
    pub phone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    /// Free-text tag, possibly a comma-separated list ("financial, housing").
    pub category: Option<String>,
    /// Absent region means visible everywhere, same as `Region::All`.
    pub region: Option<Region>,
}

impl Resource {
    /// Decodes a raw backend document, tolerating schema drift.
    ///
    /// Documents missing an `id` or a non-empty string `title` are
    /// considered malformed and yield `None`; callers count and log them.
    pub fn from_document(doc: &Value) -> Option<Resource> {
        let id = opt_str(doc, "id")?;
        let title = opt_str(doc, "title")?;

        Some(Resource {
            id,
            title,
            phone: opt_str(doc, "phone"),
            website: opt_str(doc, "website"),
            email: opt_str(doc, "email"),
            description: opt_str(doc, "description"),
            category: opt_str(doc, "category"),
            region: opt_str(doc, "region").map(|s| Region::parse(&s)),
        })
    }

    /// Comma-splits the category field into trimmed tag components.
    pub fn tags(&self) -> Vec<&str> {
        self.category
            .as_deref()
            .map(|c| {
                c.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Trimmed non-empty string field, or `None`.
fn opt_str(doc: &Value, field: &str) -> Option<String> {
    doc.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
