//! Names a user types into a subscription: companies, roles and career-site links.

use unicode_segmentation::UnicodeSegmentation;

const MAX_GRAPHEMES: usize = 256;

fn parse_name(label: &str, s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(format!("{} must not be empty.", label));
    }
    if trimmed.graphemes(true).count() > MAX_GRAPHEMES {
        return Err(format!(
            "{} must be at most {} characters long.",
            label, MAX_GRAPHEMES
        ));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(format!("{} contains control characters.", label));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyName(String);

impl CompanyName {
    pub fn parse(s: String) -> Result<CompanyName, String> {
        parse_name("Company name", &s).map(Self)
    }
}

impl AsRef<str> for CompanyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleName(String);

impl RoleName {
    pub fn parse(s: String) -> Result<RoleName, String> {
        parse_name("Role name", &s).map(Self)
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A career-site URL. Stored verbatim, so it only has to look like a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareerLink(String);

impl CareerLink {
    pub fn parse(s: String) -> Result<CareerLink, String> {
        let link = parse_name("Career link", &s)?;
        if link.chars().any(char::is_whitespace) {
            return Err(format!("Career link '{}' contains whitespace.", link));
        }
        Ok(Self(link))
    }
}

impl AsRef<str> for CareerLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
