//! HTML parsing and data extraction
//!
//! One parser per source format: hackathon participant listings, GitHub
//! stargazer pages and profiles, and university club directories. All of
//! them share the selector tables in [`selectors`].

pub mod club;
pub mod participant;
pub mod profile;
pub mod selectors;
pub mod stargazers;

pub use club::{detect_platform, extract_school_name, rank_directories, ClubParser};
pub use participant::ParticipantParser;
pub use profile::{classify_link, extract_emails, ProfileParser};
pub use stargazers::{is_valid_username, StargazerParser};
