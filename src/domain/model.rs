use std::fmt;
use std::time::Duration;

/// A site whose submissions are tracked, e.g. `brandur.org`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How long ago an item was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemAge(Duration);

impl ItemAge {
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl fmt::Display for ItemAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        write!(f, "{}h{}m{}s", h, m, s)
    }
}

/// One relative-age phrase found in a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeMatch {
    pub age: ItemAge,
    /// Item identifier taken from the anchor wrapping the phrase, when present.
    pub item_id: Option<String>,
}

/// What happened to one domain during one cycle.
#[derive(Debug)]
pub enum DomainOutcome {
    Checked {
        domain: Domain,
        url: String,
        ages: Vec<AgeMatch>,
        alerts_sent: usize,
        alerts_suppressed: usize,
        /// Alerts that qualified but could not be delivered.
        notify_errors: Vec<crate::utils::error::WatchError>,
    },
    Failed {
        domain: Domain,
        url: String,
        error: crate::utils::error::WatchError,
    },
}

impl DomainOutcome {
    pub fn is_failure(&self) -> bool {
        match self {
            DomainOutcome::Checked { notify_errors, .. } => !notify_errors.is_empty(),
            DomainOutcome::Failed { .. } => true,
        }
    }
}

#[derive(Debug, Default)]
pub struct CycleReport {
    pub cycle: u64,
    pub outcomes: Vec<DomainOutcome>,
}

impl CycleReport {
    pub fn new(cycle: u64) -> Self {
        Self {
            cycle,
            outcomes: Vec::new(),
        }
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failures() > 0
    }

    pub fn alerts_sent(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                DomainOutcome::Checked { alerts_sent, .. } => *alerts_sent,
                DomainOutcome::Failed { .. } => 0,
            })
            .sum()
    }
}
