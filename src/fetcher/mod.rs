//! HTTP fetching layer shared by all harvesters

pub mod client;

pub use client::PageFetcher;
