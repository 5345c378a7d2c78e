//! Error types for the gleaner harvesters
//!
//! This module defines custom error types used throughout the application.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded")]
    MaxRetriesExceeded,

    /// Page is behind a login wall
    #[error("Login required to view page")]
    LoginRequired,

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors that can occur during parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    /// No list items matched any known selector
    #[error("No list items found on page")]
    NoItemsFound,

    /// Offset lies beyond the materialized item count
    #[error("Offset {offset} exceeds available item count {available}")]
    OffsetOutOfRange { offset: usize, available: usize },
}

/// General harvest errors
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// View never materialized enough items to cover the starting offset
    #[error("View exhausted at {available} items, below starting offset {offset}")]
    OffsetUnreachable { offset: usize, available: usize },

    /// No records survived parsing and validation
    #[error("No records harvested")]
    NoRecords,
}
