use crate::utils::error::Result;
use async_trait::async_trait;

/// Retrieves the raw body of a listing page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Delivers one alert. The recipient is part of the adapter's configuration.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

/// Source of the whole-second jitter subtracted from the poll period.
pub trait Jitter: Send + Sync {
    /// Uniform draw in `[0, max)`.
    fn draw_secs(&self, max: u64) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn draw_secs(&self, max: u64) -> u64 {
        if max == 0 {
            return 0;
        }
        rand::random_range(0..max)
    }
}
