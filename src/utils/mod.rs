//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;
pub mod retry;

use regex::Regex;
use std::sync::OnceLock;

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Sanitize filename by removing invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    static INVALID_CHARS: OnceLock<Regex> = OnceLock::new();

    let re =
        INVALID_CHARS.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("Invalid regex pattern"));

    re.replace_all(filename, "_").to_string()
}

/// Strip query string and trailing slash from a URL, keeping scheme and path
pub fn strip_query(url: &str) -> &str {
    let base = url.split('?').next().unwrap_or(url);
    base.trim_end_matches('/')
}

/// Repair URLs with a doubled scheme prefix, a common artifact of sloppy
/// profile fields ("https://github.com/https://github.com/user").
pub fn repair_doubled_url(url: &str) -> String {
    let url = url.trim();

    for prefix in ["https://", "http://"] {
        if let Some(last) = url.rfind(prefix) {
            if last > 0 {
                return url[last..].to_string();
            }
        }
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return format!("https://{url}");
    }

    url.to_string()
}
