//! University club directory discovery
//!
//! Club directories live on a handful of hosting platforms with
//! recognizable URL shapes. Discovery scans search result pages for
//! candidate links, names the school behind each, and validates that a
//! candidate actually renders an organization directory before keeping it.

use scraper::Html;
use std::collections::HashSet;

use crate::models::{DirectoryLink, Platform};
use crate::parser::selectors::ClubSelectors;
use crate::utils::strip_query;

/// Words an organization directory page is expected to contain
const ORG_KEYWORDS: &[&str] = &[
    "organization",
    "club",
    "student",
    "involvement",
    "campus",
    "activities",
];

/// Markup hints that the page is a browsable listing, not a brochure
const STRUCTURE_INDICATORS: &[&str] = &["search", "filter", "category", "browse", "list", "grid"];

/// Parser and validator for club directory candidates
pub struct ClubParser {
    selectors: ClubSelectors,
}

impl ClubParser {
    pub fn new() -> Self {
        Self {
            selectors: ClubSelectors::new(),
        }
    }

    /// Scan a search results page for club directory candidates
    pub fn parse_search_results(&self, html: &str, source: &str) -> Vec<DirectoryLink> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();
        let mut seen = HashSet::new();

        for selector in self.selectors.result_link {
            for el in document.select(selector) {
                let Some(href) = el.value().attr("href") else {
                    continue;
                };

                let platform = detect_platform(href);
                if platform == Platform::Other {
                    continue;
                }

                let canonical = strip_query(href).to_string();
                if !seen.insert(canonical.clone()) {
                    continue;
                }

                links.push(DirectoryLink {
                    school_name: extract_school_name(&canonical),
                    url: canonical,
                    platform,
                    source: source.to_string(),
                });
            }
        }

        links
    }

    /// Check that a fetched candidate page really is an org directory
    ///
    /// Requires at least two content keywords and one structural hint so a
    /// single stray "student" in a footer does not qualify a page.
    pub fn is_org_directory(&self, html: &str) -> bool {
        let lower = html.to_lowercase();

        let keyword_hits = ORG_KEYWORDS
            .iter()
            .filter(|kw| lower.contains(*kw))
            .count();
        let structure_hits = STRUCTURE_INDICATORS
            .iter()
            .filter(|ind| lower.contains(*ind))
            .count();

        keyword_hits >= 2 && structure_hits >= 1
    }
}

impl Default for ClubParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Identify the hosting platform from a URL
pub fn detect_platform(url: &str) -> Platform {
    let lower = url.to_lowercase();

    if lower.contains("campuslabs.com") {
        Platform::CampusLabs
    } else if lower.contains("collegiatelink.net") {
        Platform::CollegiateLink
    } else if lower.contains("orgsync.com") {
        Platform::OrgSync
    } else if lower.contains("presence.io") {
        Platform::Presence
    } else if lower.contains("campusgroups.com") {
        Platform::CampusGroups
    } else if lower.contains("//involved.") || lower.contains(".involved.") {
        Platform::Involved
    } else if lower.contains("//engage.") || lower.contains(".engage.") {
        Platform::Engage
    } else {
        Platform::Other
    }
}

/// Derive a readable school name from a directory URL
///
/// Platform-hosted directories carry the school in the subdomain
/// ("stanford.campuslabs.com"); self-hosted ones carry it in the domain
/// ("engage.usc.edu").
pub fn extract_school_name(url: &str) -> String {
    let host = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or("");

    let parts: Vec<&str> = host.split('.').collect();

    let raw = match detect_platform(url) {
        Platform::CampusLabs
        | Platform::CollegiateLink
        | Platform::OrgSync
        | Platform::Presence
        | Platform::CampusGroups => parts.first().copied().unwrap_or(""),
        // engage.usc.edu or involved.umich.edu: the school is the second label
        Platform::Involved | Platform::Engage => parts.get(1).copied().unwrap_or(""),
        Platform::Other => parts.first().copied().unwrap_or(""),
    };

    titlecase_school(raw)
}

/// Rank directory candidates: dedup by canonical URL, order by platform
/// preference then school name
pub fn rank_directories(mut links: Vec<DirectoryLink>) -> Vec<DirectoryLink> {
    let mut seen = HashSet::new();
    links.retain(|link| seen.insert(strip_query(&link.url).to_string()));

    links.sort_by(|a, b| {
        a.platform
            .priority()
            .cmp(&b.platform.priority())
            .then_with(|| a.school_name.cmp(&b.school_name))
    });

    links
}

fn titlecase_school(raw: &str) -> String {
    raw.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
