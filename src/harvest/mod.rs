//! Incremental harvesting loops
//!
//! Two loop shapes cover every source this crate handles:
//!
//! - [`scroll`] drives a continuously-rendering list view (infinite scroll)
//!   until a target item count is materialized or the view stops growing.
//! - [`paginate`] walks numbered listing pages until they run dry.
//!
//! Both are bounded polling loops: waits are randomized sleeps, failures are
//! logged and retried up to fixed caps, and a hard iteration ceiling always
//! terminates them.

pub mod paginate;
pub mod scroll;
pub mod view;

pub use paginate::{PageWalker, WalkPolicy};
pub use scroll::{HarvestPolicy, ScrollHarvester, ScrollOutcome, StopReason};
pub use view::{HttpListView, ListView};
