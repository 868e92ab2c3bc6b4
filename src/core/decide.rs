use crate::domain::model::{AgeMatch, Domain};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// What to do when the same item still qualifies on a later cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertPolicy {
    /// Alert on every cycle while the item stays within the threshold.
    #[default]
    EveryCycle,
    /// Alert once per item id, then stay quiet for the window.
    /// Phrases without an item id are always alerted.
    SuppressFor(Duration),
}

/// Item ids already alerted, with the time of the alert.
#[derive(Debug, Default)]
pub struct SeenItems {
    alerted_at: HashMap<String, DateTime<Utc>>,
}

impl SeenItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.alerted_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerted_at.is_empty()
    }

    fn key(domain: &Domain, item_id: &str) -> String {
        format!("{}#{}", domain, item_id)
    }

    fn is_suppressed(&self, key: &str, window: Duration, now: DateTime<Utc>) -> bool {
        self.alerted_at
            .get(key)
            .is_some_and(|at| elapsed(*at, now) < window)
    }

    pub fn record(&mut self, key: String, now: DateTime<Utc>) {
        self.alerted_at.insert(key, now);
    }

    fn prune(&mut self, window: Duration, now: DateTime<Utc>) {
        self.alerted_at.retain(|_, at| elapsed(*at, now) < window);
    }
}

fn elapsed(then: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - then).to_std().unwrap_or(Duration::ZERO)
}

/// Result of evaluating one domain's ages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decision {
    /// One entry per alert to send. `Some(key)` must be passed to
    /// [`SeenItems::record`] once that alert is delivered.
    pub to_notify: Vec<Option<String>>,
    pub suppressed: usize,
}

#[derive(Debug, Clone)]
pub struct AlertDecider {
    threshold: Duration,
    policy: AlertPolicy,
}

impl AlertDecider {
    pub fn new(threshold: Duration, policy: AlertPolicy) -> Self {
        Self { threshold, policy }
    }

    pub fn qualifies(&self, age: &AgeMatch) -> bool {
        age.age.as_duration() <= self.threshold
    }

    /// Decides which alerts to send for `domain`.
    ///
    /// Nothing is recorded in `seen` here; an item only counts as alerted
    /// after its delivery succeeds, so a failed send is retried next cycle.
    pub fn evaluate(
        &self,
        domain: &Domain,
        ages: &[AgeMatch],
        seen: &mut SeenItems,
        now: DateTime<Utc>,
    ) -> Decision {
        let mut decision = Decision::default();

        if let AlertPolicy::SuppressFor(window) = self.policy {
            seen.prune(window, now);
        }

        for age in ages.iter().filter(|a| self.qualifies(a)) {
            match (self.policy, age.item_id.as_deref()) {
                (AlertPolicy::SuppressFor(window), Some(id)) => {
                    let key = SeenItems::key(domain, id);
                    if seen.is_suppressed(&key, window, now) {
                        tracing::debug!("Item {} on {} already alerted; suppressing", id, domain);
                        decision.suppressed += 1;
                    } else {
                        decision.to_notify.push(Some(key));
                    }
                }
                _ => decision.to_notify.push(None),
            }
        }

        decision
    }
}

pub fn alert_subject(domain: &Domain) -> String {
    format!("New submission for '{}'", domain)
}

pub fn alert_body(domain: &Domain, newest_url: &str) -> String {
    format!("New submission for '{}'. Please see:\n\n{}\n", domain, newest_url)
}
