//! Stargazer harvest command
//!
//! Walks the stargazer pages of a GitHub repository and exports one
//! record per unique username, optionally fetching every profile for
//! contact details in the same run.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::commands::enrich::{enrich_records, print_domain_breakdown};
use crate::config::Config;
use crate::fetcher::PageFetcher;
use crate::harvest::{PageWalker, WalkPolicy};
use crate::models::HarvestedRecord;
use crate::parser::StargazerParser;
use crate::storage::{dedup_records, write_csv, write_json};

pub async fn stargazers(
    config: Config,
    repo: String,
    max_pages: Option<u32>,
    profiles: bool,
    output: PathBuf,
) -> Result<()> {
    let (owner, name) = repo
        .split_once('/')
        .context("Repository must be given as owner/name")?;

    println!("Starting stargazer harvest");
    println!("==========================");
    println!("  Repository: {owner}/{name}");
    println!("  Profile details: {}", if profiles { "on" } else { "off" });

    let fetcher = PageFetcher::with_config(
        config.fetcher.rate_limit,
        config.fetcher.max_retries,
        config.request_timeout(),
    )
    .context("Failed to create fetcher")?;

    let policy = WalkPolicy {
        max_pages: max_pages.unwrap_or(config.harvest.max_pages),
        ..Default::default()
    };

    let url = format!("https://github.com/{owner}/{name}/stargazers");
    let walker = PageWalker::new(&fetcher, policy);

    let outcome = walker
        .walk(&url, |body| StargazerParser::new().parse_usernames(body))
        .await
        .context("Stargazer harvest failed")?;

    let records: Vec<HarvestedRecord> = outcome
        .items
        .into_iter()
        .map(|username| HarvestedRecord {
            profile_url: format!("https://github.com/{username}"),
            name: username.clone(),
            username,
            ..Default::default()
        })
        .collect();
    let mut records = dedup_records(records);
    let unique = records.len();

    let slug = format!("{owner}_{name}");
    let mut errors = 0;

    if profiles {
        let backup_path = output.join(format!("stargazers_{slug}_backup.json"));
        (records, errors) = enrich_records(
            &fetcher,
            records,
            &backup_path,
            config.harvest.backup_interval,
            &url,
        )
        .await?;
    }

    let json_path = output.join(format!("stargazers_{slug}.json"));
    let csv_path = output.join(format!("stargazers_{slug}.csv"));
    write_json(&json_path, &url, &records).context("Failed to write JSON export")?;
    write_csv(&csv_path, &records).context("Failed to write CSV export")?;

    println!("\nHarvest Summary");
    println!("===============");
    println!("Unique stargazers: {unique}");
    println!("Pages walked: {}", outcome.pages_walked);
    if profiles {
        let with_emails = records.iter().filter(|r| !r.emails.is_empty()).count();
        println!("With emails: {with_emails}");
        println!("Profile fetch failures: {errors}");
        print_domain_breakdown(&records);
    }
    println!("JSON: {}", json_path.display());
    println!("CSV:  {}", csv_path.display());

    Ok(())
}
