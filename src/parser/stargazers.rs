//! GitHub stargazer listing parser
//!
//! Stargazer pages are plain paginated lists of user links. The work here
//! is telling real usernames apart from the site chrome links that match
//! the same selectors.

use scraper::Html;
use std::collections::HashSet;

use crate::parser::selectors::StargazerSelectors;

/// Path segments that look like usernames but are site routes
const RESERVED_NAMES: &[&str] = &[
    "features",
    "topics",
    "collections",
    "trending",
    "events",
    "marketplace",
    "pricing",
    "sponsors",
    "settings",
    "notifications",
    "explore",
    "about",
    "contact",
    "site",
    "security",
    "enterprise",
    "team",
    "customer-stories",
    "readme",
    "apps",
    "orgs",
];

/// Auth routes that must never be treated as profiles
const BLOCKED_NAMES: &[&str] = &["logout", "login", "signup", "sign_in", "register", "join"];

/// Parser for stargazer listing pages
pub struct StargazerParser {
    selectors: StargazerSelectors,
}

impl StargazerParser {
    pub fn new() -> Self {
        Self {
            selectors: StargazerSelectors::new(),
        }
    }

    /// Extract valid, unique usernames from one listing page
    ///
    /// Order follows document order; duplicates keep the first occurrence.
    pub fn parse_usernames(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut usernames = Vec::new();
        let mut seen = HashSet::new();

        for selector in self.selectors.user_link {
            for el in document.select(selector) {
                let Some(href) = el.value().attr("href") else {
                    continue;
                };
                let Some(username) = Self::username_from_href(href) else {
                    continue;
                };
                if is_valid_username(&username) && seen.insert(username.clone()) {
                    usernames.push(username);
                }
            }
            if !usernames.is_empty() {
                break;
            }
        }

        usernames
    }

    /// A profile href is a single path segment: "/octocat"
    fn username_from_href(href: &str) -> Option<String> {
        let path = href
            .strip_prefix("https://github.com")
            .unwrap_or(href)
            .trim_start_matches('/')
            .trim_end_matches('/');

        if path.is_empty() || path.contains('/') || path.contains('?') {
            return None;
        }

        Some(path.to_string())
    }
}

impl Default for StargazerParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a candidate GitHub username
///
/// Usernames are at most 39 characters, never start with a dot, and must
/// not collide with known site routes or auth endpoints.
pub fn is_valid_username(name: &str) -> bool {
    if name.is_empty() || name.len() > 39 {
        return false;
    }
    if name.starts_with('.') {
        return false;
    }

    let lower = name.to_lowercase();
    if RESERVED_NAMES.contains(&lower.as_str()) || BLOCKED_NAMES.contains(&lower.as_str()) {
        return false;
    }

    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
