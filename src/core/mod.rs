pub mod decide;
pub mod extract;
pub mod watcher;

pub use crate::domain::model::{AgeMatch, CycleReport, Domain, DomainOutcome, ItemAge};
pub use crate::domain::ports::{Fetcher, Jitter, Notifier, RandomJitter};
pub use crate::utils::error::Result;
