//! Result export: JSON envelope and CSV
//!
//! JSON output wraps the record list in a metadata envelope so a file is
//! self-describing. CSV output is outreach-oriented: one row per
//! record-email pair, with a single empty-email row for records that
//! carry no address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::models::HarvestedRecord;

/// Metadata header of a JSON export
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub total_records: usize,
    pub tool: String,
    pub version: String,
}

/// Full JSON export document
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub records: Vec<HarvestedRecord>,
}

const CSV_HEADER: &[&str] = &[
    "username",
    "name",
    "profile_url",
    "email",
    "role",
    "location",
    "company",
    "team_status",
    "projects",
    "followers",
    "links",
];

/// Write records as a JSON document with a metadata envelope
///
/// # Errors
///
/// Returns an I/O error if serialization or the file write fails.
pub fn write_json(path: &Path, source: &str, records: &[HarvestedRecord]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let document = ExportDocument {
        metadata: ExportMetadata {
            generated_at: Utc::now(),
            source: source.to_string(),
            total_records: records.len(),
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        records: records.to_vec(),
    };

    let temp = path.with_extension("tmp");
    let content = serde_json::to_string_pretty(&document).map_err(io::Error::other)?;
    fs::write(&temp, content)?;
    fs::rename(&temp, path)?;
    Ok(())
}

/// Load a previously written JSON export
///
/// # Errors
///
/// Returns an I/O error when the file is missing or not a valid export.
pub fn read_json(path: &Path) -> io::Result<ExportDocument> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(io::Error::other)
}

/// Write records as CSV, one row per record-email pair
///
/// # Errors
///
/// Returns an I/O error if the file write fails.
pub fn write_csv(path: &Path, records: &[HarvestedRecord]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut buf: Vec<u8> = Vec::new();
    write_row(&mut buf, &CSV_HEADER.iter().map(|s| s.to_string()).collect::<Vec<_>>())?;

    for record in records {
        if record.emails.is_empty() {
            write_row(&mut buf, &record_row(record, ""))?;
        } else {
            for email in &record.emails {
                write_row(&mut buf, &record_row(record, email))?;
            }
        }
    }

    let temp = path.with_extension("tmp");
    fs::write(&temp, buf)?;
    fs::rename(&temp, path)?;
    Ok(())
}

fn record_row(record: &HarvestedRecord, email: &str) -> Vec<String> {
    let links = record
        .contact_links
        .iter()
        .map(|(kind, link)| format!("{kind}:{}", link.url))
        .collect::<Vec<_>>()
        .join(" ");

    vec![
        record.username.clone(),
        record.name.clone(),
        record.profile_url.clone(),
        email.to_string(),
        record.role.clone().unwrap_or_default(),
        record.location.clone().unwrap_or_default(),
        record.company.clone().unwrap_or_default(),
        record.team_status.clone().unwrap_or_default(),
        record.projects.to_string(),
        record.followers.to_string(),
        links,
    ]
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row with double-quote escaping
fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{escaped}\"")?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}
