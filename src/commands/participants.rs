//! Participant harvest command
//!
//! Drives the scroll harvester over a hackathon participant listing and
//! exports the deduplicated window of records.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::fetcher::PageFetcher;
use crate::harvest::{HarvestPolicy, HttpListView, ScrollHarvester};
use crate::models::{HarvestState, HarvestedRecord};
use crate::parser::{ParticipantParser, ProfileParser};
use crate::storage::{write_csv, write_json, CheckpointManager, SeenSet};
use crate::utils::sanitize_filename;

#[allow(clippy::too_many_arguments)]
pub async fn participants(
    config: Config,
    url: String,
    max: usize,
    offset: usize,
    checkpoint_interval: Option<usize>,
    with_contacts: bool,
    output: PathBuf,
    resume: bool,
) -> Result<()> {
    println!("Starting participant harvest");
    println!("============================");
    println!("  Listing: {url}");
    println!("  Window: offset {offset}, up to {max} records");

    let session = session_name(&url);

    let fetcher = PageFetcher::with_config(
        config.fetcher.rate_limit,
        config.fetcher.max_retries,
        config.request_timeout(),
    )
    .context("Failed to create fetcher")?;

    let checkpoints = CheckpointManager::new(&config.storage.checkpoint_dir);

    let mut state = if resume {
        let loaded = checkpoints.load_state(&session);
        if !loaded.seen_keys.is_empty() {
            println!(
                "  Resuming session: {} records already harvested",
                loaded.seen_keys.len()
            );
        }
        loaded
    } else {
        HarvestState::new()
    };
    state.source_url = Some(url.clone());

    let mut policy = HarvestPolicy::new(max, offset);
    policy.stale_cap = config.harvest.stale_cap;
    policy.max_iterations = config.harvest.max_iterations;
    policy.checkpoint_interval = checkpoint_interval.unwrap_or(config.harvest.checkpoint_interval);

    let mut view = HttpListView::new(
        &fetcher,
        &url,
        Box::new(|html: &str| ParticipantParser::new().count_cards(html)),
    )
    .with_referer(&url);

    let parse = move |html: &str| -> Vec<HarvestedRecord> {
        match ParticipantParser::new().parse_batch(html, offset, max) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::debug!(error = %e, "Listing window not yet satisfiable");
                Vec::new()
            }
        }
    };

    let outcome = ScrollHarvester::new(policy)
        .with_checkpoints(&checkpoints, &session)
        .run(&mut view, parse)
        .await
        .context("Participant harvest failed")?;

    let mut records = select_new_records(outcome.records, &mut state);

    if with_contacts {
        let parser = ProfileParser::new();
        let total = records.len();
        for (i, record) in records.iter_mut().enumerate() {
            if record.profile_url.is_empty() {
                continue;
            }
            print!("\r[{}/{total}] Fetching contacts: {}...", i + 1, record.username);
            std::io::Write::flush(&mut std::io::stdout())?;
            match fetcher.fetch_page(&record.profile_url, Some(&url)).await {
                Ok(html) => parser.extract_contacts(&html, record),
                Err(e) => {
                    tracing::warn!(url = %record.profile_url, error = %e, "Contact fetch failed");
                }
            }
        }
        println!();
    }

    state.last_offset = offset + records.len();
    checkpoints
        .save_state(&session, &state)
        .context("Failed to save harvest state")?;

    let json_path = output.join(format!("participants_{session}.json"));
    let csv_path = output.join(format!("participants_{session}.csv"));
    write_json(&json_path, &url, &records).context("Failed to write JSON export")?;
    write_csv(&csv_path, &records).context("Failed to write CSV export")?;

    println!("\nHarvest Summary");
    println!("===============");
    println!("Records exported: {}", records.len());
    println!("Items materialized: {}", outcome.final_count);
    println!("Pages fetched: {}", view.pages_fetched());
    println!("Iterations: {}", outcome.iterations);
    println!("Checkpoints written: {}", outcome.checkpoints_written);
    println!("Stop reason: {:?}", outcome.reason);
    if with_contacts {
        let with_emails = records.iter().filter(|r| !r.emails.is_empty()).count();
        println!("With emails: {with_emails}");
    }
    println!("JSON: {}", json_path.display());
    println!("CSV:  {}", csv_path.display());

    Ok(())
}

/// Keep only records not yet harvested in this session, marking them seen
///
/// A fresh session state makes this a plain natural-key dedup; a resumed
/// one additionally drops everything the earlier run already exported.
fn select_new_records(
    records: Vec<HarvestedRecord>,
    state: &mut HarvestState,
) -> Vec<HarvestedRecord> {
    let mut seen = SeenSet::from_keys(state.seen_keys.iter().cloned());
    let fresh: Vec<HarvestedRecord> = records.into_iter().filter(|r| seen.admit(r)).collect();
    for record in &fresh {
        state.mark_seen(record.natural_key());
    }
    fresh
}

/// Derive a filesystem-safe session name from the listing URL
fn session_name(url: &str) -> String {
    let trimmed = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    sanitize_filename(&trimmed.replace(['/', '.'], "_"))
}
