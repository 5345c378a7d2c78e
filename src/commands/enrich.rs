//! Profile enrichment command
//!
//! Takes a previous export (usually from the stargazers command) and
//! fetches each GitHub profile to fill in bio, location, emails and
//! classified contact links. Progress is backed up every few profiles so
//! an aborted run keeps what it gathered.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::fetcher::PageFetcher;
use crate::models::HarvestedRecord;
use crate::parser::ProfileParser;
use crate::storage::{read_json, write_csv, write_json};
use crate::utils::retry::{is_transient_fetch, with_retry_if, RetryConfig};

pub async fn enrich(config: Config, input: PathBuf, output: PathBuf) -> Result<()> {
    let document = read_json(&input)
        .with_context(|| format!("Failed to read export: {}", input.display()))?;

    println!("Starting profile enrichment");
    println!("===========================");
    println!(
        "  Input: {} ({} records)",
        input.display(),
        document.records.len()
    );

    let fetcher = PageFetcher::with_config(
        config.fetcher.rate_limit,
        config.fetcher.max_retries,
        config.request_timeout(),
    )
    .context("Failed to create fetcher")?;

    let source = document.metadata.source.clone();
    let backup_path = output.join(backup_name(&input));

    let (enriched, errors) = enrich_records(
        &fetcher,
        document.records,
        &backup_path,
        config.harvest.backup_interval,
        &source,
    )
    .await?;

    let json_path = output.join(enriched_name(&input, "json"));
    let csv_path = output.join(enriched_name(&input, "csv"));
    write_json(&json_path, &source, &enriched).context("Failed to write JSON export")?;
    write_csv(&csv_path, &enriched).context("Failed to write CSV export")?;

    let with_emails = enriched.iter().filter(|r| !r.emails.is_empty()).count();

    println!("\nEnrichment Summary");
    println!("==================");
    println!("Profiles processed: {}", enriched.len());
    println!("With emails: {with_emails}");
    println!("Fetch failures: {errors}");
    print_domain_breakdown(&enriched);
    println!("JSON: {}", json_path.display());
    println!("CSV:  {}", csv_path.display());

    Ok(())
}

/// Enrich each record from its GitHub profile page
///
/// Shared by the enrich and stargazers commands. Fetch failures keep the
/// original record; a backup export is written every `backup_interval`
/// profiles.
pub(crate) async fn enrich_records(
    fetcher: &PageFetcher,
    records: Vec<HarvestedRecord>,
    backup_path: &Path,
    backup_interval: usize,
    source: &str,
) -> Result<(Vec<HarvestedRecord>, u32)> {
    let parser = ProfileParser::new();
    let total = records.len();
    let mut enriched = Vec::with_capacity(total);
    let mut errors: u32 = 0;

    for (i, record) in records.into_iter().enumerate() {
        if record.username.is_empty() {
            tracing::warn!(profile_url = %record.profile_url, "Record without username, kept as-is");
            enriched.push(record);
            continue;
        }

        print!("\r[{}/{total}] Enriching: {}...", i + 1, record.username);
        std::io::Write::flush(&mut std::io::stdout())?;

        let profile_url = format!("https://github.com/{}", record.username);
        match fetch_profile(fetcher, &profile_url).await {
            Ok(html) => {
                let mut full = parser.parse_profile(&record.username, &html);
                // Listing-derived fields survive when the profile lacks them
                if full.name.is_empty() || full.name == record.username {
                    full.name = record.name.clone();
                }
                full.role = full.role.or(record.role);
                full.team_status = full.team_status.or(record.team_status);
                for email in &record.emails {
                    full.add_email(email);
                }
                enriched.push(full);
            }
            Err(e) => {
                tracing::warn!(username = %record.username, error = %e, "Profile fetch failed");
                errors += 1;
                enriched.push(record);
            }
        }

        if backup_interval > 0 && (i + 1) % backup_interval == 0 {
            if let Err(e) = write_json(backup_path, source, &enriched) {
                tracing::warn!(error = %e, "Backup export failed");
            }
        }
    }
    println!();

    Ok((enriched, errors))
}

/// Fetch one profile page, giving transient failures a second chance
/// beyond the fetcher's own backoff
async fn fetch_profile(fetcher: &PageFetcher, url: &str) -> Result<String> {
    let retry = RetryConfig::with_delays(2, 5000, 15_000);
    with_retry_if(
        &retry,
        || async { fetcher.fetch_page(url, None).await.map_err(Into::into) },
        is_transient_fetch,
    )
    .await
}

/// Per-domain email counts, most common first
pub(crate) fn print_domain_breakdown(records: &[HarvestedRecord]) {
    let mut domains: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        for email in &record.emails {
            let domain = email.rsplit('@').next().unwrap_or("unknown").to_lowercase();
            *domains.entry(domain).or_default() += 1;
        }
    }

    if domains.is_empty() {
        return;
    }

    let mut sorted: Vec<(String, usize)> = domains.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    println!("\nEmail Domains");
    println!("-------------");
    for (domain, count) in sorted.iter().take(10) {
        println!("  {domain}: {count}");
    }
}

fn backup_name(input: &Path) -> String {
    format!("{}_backup.json", stem(input))
}

fn enriched_name(input: &Path, ext: &str) -> String {
    format!("{}_enriched.{ext}", stem(input))
}

fn stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names() {
        let input = PathBuf::from("output/stargazers_rust_lang.json");
        assert_eq!(backup_name(&input), "stargazers_rust_lang_backup.json");
        assert_eq!(
            enriched_name(&input, "csv"),
            "stargazers_rust_lang_enriched.csv"
        );
    }
}
