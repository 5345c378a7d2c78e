//! Persistence: checkpoints, dedup state and result export

pub mod checkpoint;
pub mod dedup;
pub mod export;

pub use checkpoint::CheckpointManager;
pub use dedup::{dedup_records, SeenSet};
pub use export::{read_json, write_csv, write_json, ExportDocument, ExportMetadata};
