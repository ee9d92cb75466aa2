//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Usernames are email-shaped; this intentionally stops short of full
/// RFC 5322 and matches the practical local@domain.tld form.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Check that a username is email-shaped
pub fn is_valid_username(username: &str) -> bool {
    EMAIL_REGEX.is_match(username)
}

/// Split a space-delimited scope string into individual scopes
///
/// Empty segments produced by repeated spaces are dropped.
pub fn split_scope_string(scopes: &str) -> Vec<String> {
    scopes
        .split(' ')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join scopes back into the space-delimited wire form
pub fn join_scopes<'a, I>(scopes: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    scopes.into_iter().collect::<Vec<_>>().join(" ")
}
