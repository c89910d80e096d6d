use serde_json::{Map, Value};

/// One listing returned by the search provider.
///
/// Only `company` and `title` are interpreted; every other field is kept as-is
/// and written back out untouched.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Posting {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Posting {
    pub fn new(company: impl Into<String>, title: impl Into<String>) -> Posting {
        Posting {
            company: company.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }
}
