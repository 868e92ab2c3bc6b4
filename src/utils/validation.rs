use crate::utils::error::{Result, WatchError};
use std::time::Duration;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(WatchError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// The template must carry exactly one `{domain}` placeholder and still be a
/// valid URL once it is filled in.
pub fn validate_url_template(field_name: &str, template: &str, placeholder: &str) -> Result<()> {
    let count = template.matches(placeholder).count();
    if count != 1 {
        return Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: template.to_string(),
            reason: format!("Template must contain {} exactly once (found {})", placeholder, count),
        });
    }
    validate_url(field_name, &template.replace(placeholder, "example.com"))
}

/// Blank strings count as absent.
pub fn validate_required_string<'a>(field_name: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(WatchError::MissingConfigError {
            field: field_name.to_string(),
        }),
    }
}

pub fn validate_non_empty_list(field_name: &str, values: &[String]) -> Result<()> {
    if values.is_empty() || values.iter().any(|v| v.trim().is_empty()) {
        return Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: values.join(","),
            reason: "Need at least one value and no empty entries".to_string(),
        });
    }
    Ok(())
}

pub fn validate_min_duration(field_name: &str, value: Duration, exclusive_min: Duration) -> Result<()> {
    if value <= exclusive_min {
        return Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.as_secs().to_string(),
            reason: format!("Value must be greater than {}s", exclusive_min.as_secs()),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
