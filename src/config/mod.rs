use crate::adapters::smtp::{SmtpSettings, DEFAULT_MAIL_FROM};
use crate::core::decide::AlertPolicy;
use crate::core::watcher::{
    RunMode, WatchSettings, DEFAULT_LISTING_URL_TEMPLATE, DEFAULT_NEWEST_URL, DOMAIN_PLACEHOLDER,
    MAX_JITTER_SECS,
};
use crate::domain::model::Domain;
use crate::utils::error::{Result, WatchError};
use crate::utils::validation::{
    validate_min_duration, validate_non_empty_list, validate_range, validate_required_string,
    validate_url, validate_url_template, Validate,
};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Every setting can come from a flag or from the environment (a `.env`
/// file is loaded first by the binary).
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "domain-watch")]
#[command(about = "Emails an alert when a domain gets a fresh submission on a link aggregator")]
pub struct WatchConfig {
    /// Domains to watch, comma separated
    #[arg(long, env = "DOMAIN", value_delimiter = ',')]
    pub domain: Vec<String>,

    /// Keep polling forever; `false` runs a single cycle and exits
    #[arg(
        long = "loop",
        env = "LOOP",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set
    )]
    pub loop_mode: bool,

    /// Address that receives alerts
    #[arg(long, env = "RECIPIENT")]
    pub recipient: Option<String>,

    #[arg(long, env = "SMTP_LOGIN")]
    pub smtp_login: Option<String>,

    #[serde(skip_serializing)]
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    #[arg(long, env = "SMTP_PORT")]
    pub smtp_port: Option<String>,

    #[arg(long, env = "SMTP_SERVER")]
    pub smtp_server: Option<String>,

    #[arg(long, env = "MAIL_FROM", default_value = DEFAULT_MAIL_FROM)]
    pub mail_from: String,

    /// Items this young (or younger) trigger an alert
    #[arg(long, env = "ALERT_PERIOD_SECS", default_value_t = 20 * 60)]
    pub alert_period_secs: u64,

    /// Nominal time between cycles; defaults to the alert period
    #[arg(long, env = "POLL_PERIOD_SECS")]
    pub poll_period_secs: Option<u64>,

    /// Alert once per item and stay quiet about it for this long
    #[arg(long, env = "ALERT_SUPPRESS_SECS")]
    pub alert_suppress_secs: Option<u64>,

    #[arg(long, env = "LISTING_URL_TEMPLATE", default_value = DEFAULT_LISTING_URL_TEMPLATE)]
    pub listing_url_template: String,

    #[arg(long, env = "NEWEST_URL", default_value = DEFAULT_NEWEST_URL)]
    pub newest_url: String,

    /// Send one alert for the first domain and exit
    #[arg(long, env = "TEST_EMAIL")]
    pub test_email: bool,

    /// Log as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl WatchConfig {
    pub fn domains(&self) -> Vec<Domain> {
        self.domain
            .iter()
            .map(|d| Domain::new(d.trim()))
            .collect()
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_period_secs.unwrap_or(self.alert_period_secs))
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        match self.alert_suppress_secs {
            Some(secs) if secs > 0 => AlertPolicy::SuppressFor(Duration::from_secs(secs)),
            _ => AlertPolicy::EveryCycle,
        }
    }

    pub fn watch_settings(&self) -> Result<WatchSettings> {
        if self.domain.is_empty() {
            return Err(WatchError::MissingConfigError {
                field: "DOMAIN".to_string(),
            });
        }
        validate_non_empty_list("DOMAIN", &self.domain)?;
        validate_min_duration(
            "ALERT_PERIOD_SECS",
            Duration::from_secs(self.alert_period_secs),
            Duration::ZERO,
        )?;
        validate_url_template(
            "LISTING_URL_TEMPLATE",
            &self.listing_url_template,
            DOMAIN_PLACEHOLDER,
        )?;
        validate_url("NEWEST_URL", &self.newest_url)?;

        let run_mode = if self.loop_mode {
            RunMode::Continuous
        } else {
            RunMode::Once
        };

        // 抖動會從週期中扣除，週期必須大於最大抖動
        if run_mode == RunMode::Continuous {
            validate_min_duration(
                "POLL_PERIOD_SECS",
                self.poll_period(),
                Duration::from_secs(MAX_JITTER_SECS),
            )?;
        }

        Ok(WatchSettings {
            domains: self.domains(),
            threshold: Duration::from_secs(self.alert_period_secs),
            poll_period: self.poll_period(),
            listing_url_template: self.listing_url_template.clone(),
            newest_url: self.newest_url.clone(),
            run_mode,
            alert_policy: self.alert_policy(),
        })
    }

    pub fn smtp_settings(&self) -> Result<SmtpSettings> {
        let recipient = validate_required_string("RECIPIENT", &self.recipient)?;
        let login = validate_required_string("SMTP_LOGIN", &self.smtp_login)?;
        let password = validate_required_string("SMTP_PASSWORD", &self.smtp_password)?;
        let port = validate_required_string("SMTP_PORT", &self.smtp_port)?;
        let server = validate_required_string("SMTP_SERVER", &self.smtp_server)?;

        let port: u16 = port.parse().map_err(|_| WatchError::InvalidConfigValueError {
            field: "SMTP_PORT".to_string(),
            value: port.to_string(),
            reason: "Port must be a number between 1 and 65535".to_string(),
        })?;
        validate_range("SMTP_PORT", port, 1, u16::MAX)?;

        Ok(SmtpSettings {
            server: server.to_string(),
            port,
            login: login.to_string(),
            password: password.to_string(),
            from: self.mail_from.clone(),
            recipient: recipient.to_string(),
        })
    }

    /// Printable summary without credentials.
    pub fn summary(&self) -> String {
        format!(
            "domains={:?} loop={} threshold={}s poll={}s policy={:?} recipient={}",
            self.domain,
            self.loop_mode,
            self.alert_period_secs,
            self.poll_period().as_secs(),
            self.alert_policy(),
            self.recipient.as_deref().unwrap_or("<unset>")
        )
    }
}

impl Validate for WatchConfig {
    fn validate(&self) -> Result<()> {
        self.watch_settings()?;
        self.smtp_settings()?;
        Ok(())
    }
}
