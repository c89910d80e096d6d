//! Decides whether a posting belongs to a subscribed (company, role) pair.

use crate::jobs::Posting;

const STOP_WORDS: [&str; 10] = ["and", "or", "the", "for", "in", "at", "of", "to", "a", "an"];

/// Tokens of this many characters or fewer carry no signal.
const MAX_SHORT_TOKEN_LEN: usize = 2;

/// Case-insensitive equality, or containment in either direction.
///
/// Feeds abbreviate and expand company names inconsistently ("Acme" vs
/// "Acme Corp"), so containment is checked both ways. A posting with a blank
/// company is contained in every name and therefore matches any company.
pub fn company_matches(posting_company: &str, target_company: &str) -> bool {
    let posting = posting_company.to_lowercase();
    let target = target_company.to_lowercase();
    posting == target || posting.contains(&target) || target.contains(&posting)
}

/// Lowercased words of `role` that have to appear in a matching title.
pub fn role_tokens(role: &str) -> Vec<String> {
    role.split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() > MAX_SHORT_TOKEN_LEN)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

/// Every significant token of `role` must occur somewhere in `title`.
///
/// A role made only of short tokens and stop words ("AI", "Head of") has no
/// significant tokens left and therefore matches any title.
pub fn role_matches(title: &str, role: &str) -> bool {
    let title = title.to_lowercase();
    role_tokens(role)
        .iter()
        .all(|token| title.contains(token.as_str()))
}

pub fn matches(posting: &Posting, company: &str, role: &str) -> bool {
    company_matches(&posting.company, company) && role_matches(&posting.title, role)
}
