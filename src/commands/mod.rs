//! CLI command implementations

pub mod clubs;
pub mod enrich;
pub mod participants;
pub mod stargazers;

pub use clubs::clubs;
pub use enrich::enrich;
pub use participants::participants;
pub use stargazers::stargazers;
