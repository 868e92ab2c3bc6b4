pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{FetchSettings, ReqwestFetcher, SmtpNotifier, SmtpSettings};
pub use config::WatchConfig;
pub use self::core::decide::{AlertDecider, AlertPolicy};
pub use self::core::extract::{extract_ages, extract_durations};
pub use self::core::watcher::{RunMode, WatchSettings, WatchState, Watcher};
pub use utils::error::{Result, WatchError};
