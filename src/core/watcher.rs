use crate::core::decide::{alert_body, alert_subject, AlertDecider, AlertPolicy, SeenItems};
use crate::core::extract::extract_ages;
use crate::domain::model::{CycleReport, Domain, DomainOutcome};
use crate::domain::ports::{Fetcher, Jitter, Notifier, RandomJitter};
use crate::utils::error::{Result, WatchError};
use chrono::Utc;
use std::time::Duration;

pub const MAX_JITTER_SECS: u64 = 60;
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";
pub const DEFAULT_LISTING_URL_TEMPLATE: &str = "https://news.ycombinator.com/from?site={domain}";
pub const DEFAULT_NEWEST_URL: &str = "https://news.ycombinator.com/newest";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One cycle, then stop.
    Once,
    /// Cycle forever with a jittered sleep in between.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Fetching,
    Evaluating,
    Sleeping,
    Stopped,
}

/// Immutable settings shared by every cycle.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub domains: Vec<Domain>,
    pub threshold: Duration,
    pub poll_period: Duration,
    pub listing_url_template: String,
    pub newest_url: String,
    pub run_mode: RunMode,
    pub alert_policy: AlertPolicy,
}

impl WatchSettings {
    /// Defaults matching news.ycombinator.com, polling as often as the threshold.
    pub fn new(domains: Vec<Domain>, threshold: Duration) -> Self {
        Self {
            domains,
            threshold,
            poll_period: threshold,
            listing_url_template: DEFAULT_LISTING_URL_TEMPLATE.to_string(),
            newest_url: DEFAULT_NEWEST_URL.to_string(),
            run_mode: RunMode::Continuous,
            alert_policy: AlertPolicy::EveryCycle,
        }
    }
}

pub fn listing_url(template: &str, domain: &Domain) -> String {
    template.replace(DOMAIN_PLACEHOLDER, domain.as_str())
}

/// `period - jitter`, floored at zero. Config validation keeps the period above
/// [`MAX_JITTER_SECS`] so the floor is never reached in practice.
pub fn sleep_duration(period: Duration, jitter_secs: u64) -> Duration {
    period.saturating_sub(Duration::from_secs(jitter_secs))
}

pub struct Watcher<F: Fetcher, N: Notifier, J: Jitter = RandomJitter> {
    settings: WatchSettings,
    fetcher: F,
    notifier: N,
    jitter: J,
    decider: AlertDecider,
    seen: SeenItems,
    state: WatchState,
    cycle: u64,
}

impl<F: Fetcher, N: Notifier> Watcher<F, N, RandomJitter> {
    pub fn new(settings: WatchSettings, fetcher: F, notifier: N) -> Self {
        Self::with_jitter(settings, fetcher, notifier, RandomJitter)
    }
}

impl<F: Fetcher, N: Notifier, J: Jitter> Watcher<F, N, J> {
    pub fn with_jitter(settings: WatchSettings, fetcher: F, notifier: N, jitter: J) -> Self {
        let decider = AlertDecider::new(settings.threshold, settings.alert_policy);
        Self {
            settings,
            fetcher,
            notifier,
            jitter,
            decider,
            seen: SeenItems::new(),
            state: WatchState::Idle,
            cycle: 0,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn settings(&self) -> &WatchSettings {
        &self.settings
    }

    fn transition(&mut self, next: WatchState) {
        if self.state != next {
            tracing::trace!("State {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    pub fn next_sleep(&self) -> Duration {
        sleep_duration(self.settings.poll_period, self.jitter.draw_secs(MAX_JITTER_SECS))
    }

    /// One pass over every domain, in order. A failing domain is recorded and
    /// the next one is still checked.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        let mut report = CycleReport::new(self.cycle);

        for domain in self.settings.domains.clone() {
            let outcome = self.check_domain(domain).await;
            if let DomainOutcome::Failed { domain, error, .. } = &outcome {
                if error.is_transient() {
                    tracing::warn!("⚠️ Check of '{}' failed: {}", domain, error);
                } else {
                    tracing::error!("❌ Check of '{}' failed: {}", domain, error);
                }
                tracing::warn!("💡 {}", error.recovery_suggestion());
            }
            report.outcomes.push(outcome);
        }

        tracing::info!(
            "Cycle {} done: {} domain(s), {} alert(s) sent, {} failure(s)",
            report.cycle,
            report.outcomes.len(),
            report.alerts_sent(),
            report.failures()
        );
        report
    }

    async fn check_domain(&mut self, domain: Domain) -> DomainOutcome {
        let url = listing_url(&self.settings.listing_url_template, &domain);

        self.transition(WatchState::Fetching);
        tracing::info!("Requesting: {}", url);
        let content = match self.fetcher.fetch(&url).await {
            Ok(content) => content,
            Err(error) => return DomainOutcome::Failed { domain, url, error },
        };

        self.transition(WatchState::Evaluating);
        let ages = match extract_ages(&content) {
            Ok(ages) => ages,
            Err(error) => return DomainOutcome::Failed { domain, url, error },
        };

        for age in &ages {
            tracing::info!("Found an article with age: {}", age.age);
            if self.decider.qualifies(age) {
                tracing::info!("Article's age is within the alert threshold");
            }
        }

        let now = Utc::now();
        let decision = self.decider.evaluate(&domain, &ages, &mut self.seen, now);

        let subject = alert_subject(&domain);
        let body = alert_body(&domain, &self.settings.newest_url);
        let mut alerts_sent = 0;
        let mut notify_errors = Vec::new();
        for seen_key in decision.to_notify {
            match self.notifier.notify(&subject, &body).await {
                Ok(()) => {
                    alerts_sent += 1;
                    if let Some(key) = seen_key {
                        self.seen.record(key, now);
                    }
                }
                Err(error) => {
                    // A missed alert is the failure that matters most here.
                    tracing::error!("🚨 Alert for '{}' was NOT delivered: {}", domain, error);
                    notify_errors.push(error);
                }
            }
        }

        DomainOutcome::Checked {
            domain,
            url,
            ages,
            alerts_sent,
            alerts_suppressed: decision.suppressed,
            notify_errors,
        }
    }

    /// Runs according to [`RunMode`].
    ///
    /// `Once` returns after a single cycle, with [`WatchError::CycleFailedError`]
    /// if any domain or alert failed. `Continuous` never returns.
    pub async fn run(&mut self) -> Result<CycleReport> {
        loop {
            let report = self.run_cycle().await;

            if self.settings.run_mode == RunMode::Once {
                self.transition(WatchState::Stopped);
                return if report.has_failures() {
                    Err(WatchError::CycleFailedError {
                        failed: report.failures(),
                        attempted: report.outcomes.len(),
                    })
                } else {
                    Ok(report)
                };
            }

            // 加入隨機抖動，避免請求時間過於規律
            let sleep_for = self.next_sleep();
            self.transition(WatchState::Sleeping);
            tracing::info!("Sleeping for {:?} between runs", sleep_for);
            tokio::time::sleep(sleep_for).await;
        }
    }

    /// Sends one alert for the first domain so mail delivery can be checked.
    pub async fn send_test_alert(&self) -> Result<&Domain> {
        let domain = self
            .settings
            .domains
            .first()
            .ok_or_else(|| WatchError::MissingConfigError {
                field: "DOMAIN".to_string(),
            })?;

        self.notifier
            .notify(
                &alert_subject(domain),
                &alert_body(domain, &self.settings.newest_url),
            )
            .await?;
        Ok(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct MockFetcher {
        pages: HashMap<String, String>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| WatchError::BadStatusError {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, subject: &str, _body: &str) -> Result<()> {
            self.sent.lock().unwrap().push(subject.to_string());
            Ok(())
        }
    }

    struct FixedJitter(u64);

    impl Jitter for FixedJitter {
        fn draw_secs(&self, _max: u64) -> u64 {
            self.0
        }
    }

    fn settings(domains: &[&str]) -> WatchSettings {
        let mut settings = WatchSettings::new(
            domains.iter().map(|d| Domain::new(*d)).collect(),
            Duration::from_secs(20 * 60),
        );
        settings.listing_url_template = "http://listing/{domain}".to_string();
        settings.run_mode = RunMode::Once;
        settings
    }

    #[test]
    fn test_listing_url() {
        let url = listing_url(DEFAULT_LISTING_URL_TEMPLATE, &Domain::new("brandur.org"));
        assert_eq!(url, "https://news.ycombinator.com/from?site=brandur.org");
    }

    #[test]
    fn test_sleep_duration_bounds() {
        let period = Duration::from_secs(1200);
        for jitter in 0..MAX_JITTER_SECS {
            let sleep = sleep_duration(period, jitter);
            assert!(sleep <= period);
            assert!(sleep > period - Duration::from_secs(MAX_JITTER_SECS));
        }
        assert_eq!(sleep_duration(Duration::from_secs(30), 59), Duration::ZERO);
    }

    #[test]
    fn test_next_sleep_uses_jitter() {
        let watcher = Watcher::with_jitter(
            settings(&["a.org"]),
            MockFetcher {
                pages: HashMap::new(),
                requested: Arc::default(),
            },
            RecordingNotifier::default(),
            FixedJitter(15),
        );
        assert_eq!(watcher.next_sleep(), Duration::from_secs(1200 - 15));
    }

    #[tokio::test]
    async fn test_failed_domain_does_not_stop_cycle() {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let mut pages = HashMap::new();
        pages.insert(
            "http://listing/b.org".to_string(),
            "<a>5 minutes ago</a>".to_string(),
        );
        let notifier = RecordingNotifier::default();
        let mut watcher = Watcher::new(
            settings(&["a.org", "b.org"]),
            MockFetcher {
                pages,
                requested: requested.clone(),
            },
            notifier.clone(),
        );

        let err = watcher.run().await.unwrap_err();
        assert!(matches!(err, WatchError::CycleFailedError { failed: 1, attempted: 2 }));
        assert_eq!(
            *requested.lock().unwrap(),
            vec!["http://listing/a.org", "http://listing/b.org"]
        );
        assert_eq!(*notifier.sent.lock().unwrap(), vec!["New submission for 'b.org'"]);
        assert_eq!(watcher.state(), WatchState::Stopped);
    }

    #[tokio::test]
    async fn test_send_test_alert_uses_first_domain() {
        let notifier = RecordingNotifier::default();
        let watcher = Watcher::new(
            settings(&["first.org", "second.org"]),
            MockFetcher {
                pages: HashMap::new(),
                requested: Arc::default(),
            },
            notifier.clone(),
        );

        let domain = watcher.send_test_alert().await.unwrap();
        assert_eq!(domain.as_str(), "first.org");
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }
}
