//! GitHub profile page parser
//!
//! Extracts the public profile fields plus anything that looks like a
//! contact channel: mailto links, emails embedded in the bio text, and
//! classified outbound links.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

use crate::models::{ContactLink, HarvestedRecord, LinkKind};
use crate::parser::selectors::ProfileSelectors;
use crate::utils::{normalize_whitespace, repair_doubled_url};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").expect("email regex");
    static ref ANY_ANCHOR: Selector = Selector::parse("a[href]").expect("anchor selector");
}

/// Email domains that never reach a person
const FILTERED_EMAIL_DOMAINS: &[&str] = &["noreply", "example.com", "github.com"];

/// Parser for GitHub user profile pages
pub struct ProfileParser {
    selectors: ProfileSelectors,
}

impl ProfileParser {
    pub fn new() -> Self {
        Self {
            selectors: ProfileSelectors::new(),
        }
    }

    /// Parse a profile page into a record for the given username
    pub fn parse_profile(&self, username: &str, html: &str) -> HarvestedRecord {
        let document = Html::parse_document(html);

        let mut record = HarvestedRecord {
            username: username.to_string(),
            profile_url: format!("https://github.com/{username}"),
            ..Default::default()
        };

        record.name = self
            .first_text(&document, self.selectors.name)
            .unwrap_or_else(|| username.to_string());
        record.bio = self.first_text(&document, self.selectors.bio);
        record.location = self.first_text(&document, self.selectors.location);
        record.company = self.first_text(&document, self.selectors.company);
        record.avatar_url = self.first_attr(&document, self.selectors.avatar, "src");
        record.followers = self
            .first_text(&document, self.selectors.followers)
            .map(|t| Self::parse_count(&t))
            .unwrap_or(0);

        // Mailto link on the vcard
        if let Some(href) = self.first_attr(&document, self.selectors.email, "href") {
            let email = href.trim_start_matches("mailto:").to_string();
            if Self::is_contact_email(&email) {
                record.add_email(&email);
            }
        }

        // Emails embedded in the bio text
        if let Some(bio) = &record.bio {
            for email in extract_emails(bio) {
                record.add_email(&email);
            }
        }

        // Declared website and social links
        for selector in self
            .selectors
            .website
            .iter()
            .chain(self.selectors.social_links.iter())
        {
            for el in document.select(selector) {
                if let Some(href) = el.value().attr("href") {
                    let url = if href.starts_with("mailto:") {
                        href.to_string()
                    } else {
                        repair_doubled_url(href)
                    };
                    let kind = classify_link(&url);
                    let label = normalize_whitespace(&el.text().collect::<String>());
                    record
                        .contact_links
                        .entry(kind)
                        .or_insert_with(|| ContactLink {
                            url: url.clone(),
                            label,
                        });
                }
            }
        }

        record
    }

    /// Harvest contacts from an arbitrary profile-like page
    ///
    /// Used to enrich records whose profile is not a GitHub page: every
    /// anchor is classified, mailto addresses and emails in the page text
    /// are collected, and the results are merged into the record.
    pub fn extract_contacts(&self, html: &str, record: &mut HarvestedRecord) {
        let document = Html::parse_document(html);

        for el in document.select(&ANY_ANCHOR) {
            let Some(href) = el.value().attr("href") else {
                continue;
            };

            if let Some(email) = href.strip_prefix("mailto:") {
                if Self::is_contact_email(email) {
                    record.add_email(email);
                }
                continue;
            }

            let url = repair_doubled_url(href);
            let kind = classify_link(&url);
            if matches!(kind, LinkKind::Website | LinkKind::Other | LinkKind::Email) {
                continue;
            }

            let label = normalize_whitespace(&el.text().collect::<String>());
            record
                .contact_links
                .entry(kind)
                .or_insert_with(|| ContactLink {
                    url: url.clone(),
                    label,
                });
        }

        let text = document.root_element().text().collect::<String>();
        for email in extract_emails(&text) {
            record.add_email(&email);
        }
    }

    /// Parse a follower count such as "42", "1,024" or "1.2k"
    fn parse_count(text: &str) -> u32 {
        let cleaned = text.trim().replace(',', "");
        if let Some(k) = cleaned.strip_suffix('k').or_else(|| cleaned.strip_suffix('K')) {
            return k
                .parse::<f64>()
                .map(|n| (n * 1000.0) as u32)
                .unwrap_or(0);
        }
        cleaned.parse().unwrap_or(0)
    }

    /// Reject automation and placeholder addresses
    pub fn is_contact_email(email: &str) -> bool {
        let Some(domain) = email.rsplit('@').next() else {
            return false;
        };
        let domain = domain.to_lowercase();
        !FILTERED_EMAIL_DOMAINS.iter().any(|f| domain.contains(f))
    }

    fn first_text(&self, document: &Html, selectors: &[Selector]) -> Option<String> {
        for selector in selectors {
            if let Some(el) = document.select(selector).next() {
                let text = normalize_whitespace(&el.text().collect::<String>());
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }

    fn first_attr(&self, document: &Html, selectors: &[Selector], attr: &str) -> Option<String> {
        for selector in selectors {
            if let Some(el) = document.select(selector).next() {
                if let Some(value) = el.value().attr(attr) {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
        None
    }
}

impl Default for ProfileParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract contact-worthy email addresses from free text
pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|e| ProfileParser::is_contact_email(e))
        .collect()
}

/// Classify an outbound link by its destination
pub fn classify_link(url: &str) -> LinkKind {
    let lower = url.to_lowercase();

    if lower.starts_with("mailto:") {
        return LinkKind::Email;
    }
    if lower.contains("github.com") {
        return LinkKind::Github;
    }
    if lower.contains("linkedin.com") {
        return LinkKind::Linkedin;
    }
    if lower.contains("twitter.com") || lower.contains("x.com/") || lower.ends_with("x.com") {
        return LinkKind::Twitter;
    }
    if lower.contains("instagram.com") {
        return LinkKind::Instagram;
    }
    if lower.contains("youtube.com") || lower.contains("youtu.be") {
        return LinkKind::Youtube;
    }
    if lower.contains("medium.com") {
        return LinkKind::Medium;
    }
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return LinkKind::Website;
    }

    LinkKind::Other
}
