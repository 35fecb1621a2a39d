//! Keyed polling cache with stale-while-revalidate semantics.

mod cache;
mod state;

pub use cache::{PollConfig, PollingCache};
pub use state::{QuerySnapshot, QueryStatus};
