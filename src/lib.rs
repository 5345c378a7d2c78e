//! gleaner - contact harvester for public listings
//!
//! Harvests contact and profile records from hackathon participant
//! listings, GitHub stargazer pages and university club directories.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`fetcher`] - HTTP fetching with rate limiting and retry
//! - [`harvest`] - The incremental scroll and pagination loops
//! - [`parser`] - HTML parsing and data extraction per source
//! - [`models`] - Core data structures and types
//! - [`storage`] - Checkpoints, dedup state and result export
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use gleaner::fetcher::PageFetcher;
//! use gleaner::harvest::{HarvestPolicy, HttpListView, ScrollHarvester};
//! use gleaner::parser::ParticipantParser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = PageFetcher::new(2)?;
//!     let mut view = HttpListView::new(
//!         &fetcher,
//!         "https://example.devpost.com/participants",
//!         Box::new(|html: &str| ParticipantParser::new().count_cards(html)),
//!     );
//!
//!     let outcome = ScrollHarvester::new(HarvestPolicy::new(100, 0))
//!         .run(&mut view, |html| ParticipantParser::new().parse_listing(html))
//!         .await?;
//!
//!     println!("harvested {} records", outcome.records.len());
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod fetcher;
pub mod harvest;
pub mod models;
pub mod parser;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::fetcher::PageFetcher;
    pub use crate::harvest::{HarvestPolicy, HttpListView, ListView, ScrollHarvester, StopReason};
    pub use crate::models::{HarvestState, HarvestedRecord, LinkKind, Platform};
    pub use crate::storage::{CheckpointManager, SeenSet};
    pub use crate::utils::error::{FetchError, HarvestError, ParseError};
}

// Direct re-exports for convenience
pub use models::{HarvestState, HarvestedRecord};
