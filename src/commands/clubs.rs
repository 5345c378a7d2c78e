//! Club directory discovery command
//!
//! Scans search-result pages for club directory candidates, optionally
//! fetches each candidate to confirm it actually renders an organization
//! listing, then ranks the survivors by platform preference.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::fetcher::PageFetcher;
use crate::models::DirectoryLink;
use crate::parser::{rank_directories, ClubParser};

pub async fn clubs(
    config: Config,
    urls: Vec<String>,
    input: Option<PathBuf>,
    validate: bool,
    max: Option<usize>,
    output: PathBuf,
) -> Result<()> {
    let mut urls = urls;
    if let Some(path) = &input {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read URL list: {}", path.display()))?;
        urls.extend(url_lines(&content));
    }
    if urls.is_empty() {
        anyhow::bail!("No search URLs given; pass them as arguments or via --input");
    }

    println!("Starting club directory discovery");
    println!("=================================");
    println!("  Search pages: {}", urls.len());
    println!("  Validation: {}", if validate { "on" } else { "off" });

    let fetcher = PageFetcher::with_config(
        config.fetcher.rate_limit,
        config.fetcher.max_retries,
        config.request_timeout(),
    )
    .context("Failed to create fetcher")?;

    let parser = ClubParser::new();
    let mut candidates: Vec<DirectoryLink> = Vec::new();

    for url in &urls {
        match fetcher.fetch_page(url, None).await {
            Ok(html) => {
                let found = parser.parse_search_results(&html, url);
                tracing::info!(url = %url, candidates = found.len(), "Scanned search page");
                candidates.extend(found);
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Search page fetch failed, skipping");
            }
        }
    }

    let discovered = candidates.len();

    let kept = if validate {
        let mut kept = Vec::new();
        for link in candidates {
            match fetcher.fetch_page(&link.url, None).await {
                Ok(html) if parser.is_org_directory(&html) => kept.push(link),
                Ok(_) => {
                    tracing::debug!(url = %link.url, "Candidate is not an org directory");
                }
                Err(e) => {
                    tracing::warn!(url = %link.url, error = %e, "Candidate fetch failed, dropping");
                }
            }
        }
        kept
    } else {
        candidates
    };

    let mut ranked = rank_directories(kept);
    if let Some(cap) = max {
        ranked.truncate(cap);
    }

    fs::create_dir_all(&output)?;
    let json_path = output.join("club_directories.json");
    let content = serde_json::to_string_pretty(&ranked)?;
    fs::write(&json_path, content)?;

    println!("\nDiscovery Summary");
    println!("=================");
    println!("Candidates discovered: {discovered}");
    println!("Directories kept: {}", ranked.len());
    for link in ranked.iter().take(10) {
        println!("  [{}] {} - {}", link.platform, link.school_name, link.url);
    }
    println!("JSON: {}", json_path.display());

    Ok(())
}

/// Parse a URL-per-line file, skipping blanks and comments
fn url_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_lines_skips_blanks_and_comments() {
        let content = "https://a.example.org\n\n# note\n  https://b.example.org  \n";
        assert_eq!(
            url_lines(content),
            vec!["https://a.example.org", "https://b.example.org"]
        );
    }
}
