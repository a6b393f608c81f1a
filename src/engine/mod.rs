pub mod matcher;
pub mod state;
pub mod store;

pub use matcher::{normalize_host, DomainMatcher};
pub use state::{FilterState, Verdict};
pub use store::{BlocklistStore, DEFAULT_SEED};
