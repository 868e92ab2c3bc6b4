use crate::domain::model::{AgeMatch, ItemAge};
use crate::utils::error::{Result, WatchError};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

// Matches something like ">3 hours ago<". The angle brackets on both sides
// keep prose and unrelated numbers out. When the phrase is the text of an
// `item?id=N` anchor the id is captured as well. Digit and word classes are
// ASCII only; phrases in other scripts are not age phrases.
static AGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:item\?id=([0-9]+)")?>([1-9][0-9]*) ([A-Za-z0-9_]+) ago<"#)
        .expect("age pattern is valid")
});

/// Seconds per unit. Months and years are fixed approximations, not calendar aware.
pub fn unit_seconds(unit: &str) -> Option<u64> {
    match unit {
        "second" | "seconds" => Some(1),
        "minute" | "minutes" => Some(MINUTE),
        "hour" | "hours" => Some(HOUR),
        "day" | "days" => Some(DAY),
        "month" | "months" => Some(30 * DAY),
        "year" | "years" => Some(365 * DAY),
        _ => None,
    }
}

pub fn parse_age(magnitude: u64, unit: &str) -> Result<ItemAge> {
    let per_unit = unit_seconds(unit).ok_or_else(|| WatchError::UnrecognizedUnitError {
        magnitude,
        unit: unit.to_string(),
    })?;

    let secs = magnitude
        .checked_mul(per_unit)
        .ok_or_else(|| WatchError::AgeOverflowError {
            magnitude,
            unit: unit.to_string(),
        })?;

    Ok(ItemAge::from_secs(secs))
}

/// Scans listing markup for age phrases, in document order.
///
/// One bad phrase fails the whole page: a silently dropped unit could hide an
/// item that should have raised an alert. No phrases at all is `Ok(vec![])`.
pub fn extract_ages(content: &str) -> Result<Vec<AgeMatch>> {
    AGE_PATTERN
        .captures_iter(content)
        .map(|caps| {
            let digits = &caps[2];
            let magnitude: u64 = digits
                .parse()
                .map_err(|source| WatchError::InvalidMagnitudeError {
                    text: digits.to_string(),
                    source,
                })?;

            Ok(AgeMatch {
                age: parse_age(magnitude, &caps[3])?,
                item_id: caps.get(1).map(|m| m.as_str().to_string()),
            })
        })
        .collect()
}

pub fn extract_durations(content: &str) -> Result<Vec<Duration>> {
    Ok(extract_ages(content)?
        .into_iter()
        .map(|m| m.age.as_duration())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age(1, "minute").unwrap(), ItemAge::from_secs(60));
        assert_eq!(parse_age(5, "hours").unwrap(), ItemAge::from_secs(5 * 3600));
        assert_eq!(parse_age(1000, "days").unwrap(), ItemAge::from_secs(1000 * 86_400));
    }

    #[test]
    fn test_unit_table() {
        let table = [
            ("second", 1),
            ("minute", 60),
            ("hour", 3600),
            ("day", 86_400),
            ("month", 30 * 86_400),
            ("year", 365 * 86_400),
        ];
        for (unit, factor) in table {
            let plural = format!("{}s", unit);
            for m in [1u64, 7, 59, 1234] {
                assert_eq!(parse_age(m, unit).unwrap(), ItemAge::from_secs(m * factor));
                assert_eq!(parse_age(m, &plural).unwrap(), ItemAge::from_secs(m * factor));

                let page = format!("<a>{} {} ago</a>", m, plural);
                assert_eq!(
                    extract_durations(&page).unwrap(),
                    vec![Duration::from_secs(m * factor)]
                );
            }
        }
    }

    #[test]
    fn test_units_are_case_sensitive() {
        assert!(matches!(
            parse_age(2, "Hours"),
            Err(WatchError::UnrecognizedUnitError { magnitude: 2, .. })
        ));
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(matches!(
            parse_age(u64::MAX, "years"),
            Err(WatchError::AgeOverflowError { .. })
        ));
        // Digit run longer than u64 can hold.
        let page = ">99999999999999999999999 minutes ago<";
        assert!(matches!(
            extract_ages(page),
            Err(WatchError::InvalidMagnitudeError { .. })
        ));
    }

    #[test]
    fn test_requires_angle_brackets() {
        assert!(extract_ages("posted 3 days ago by someone").unwrap().is_empty());
        assert!(extract_ages(">3 days ago by someone").unwrap().is_empty());
        assert!(extract_ages("posted 3 days ago<").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_leading_zero_and_zero() {
        assert!(extract_ages(">03 days ago<").unwrap().is_empty());
        assert!(extract_ages(">0 days ago<").unwrap().is_empty());
    }

    #[test]
    fn test_non_ascii_phrases_are_not_ages() {
        assert!(extract_ages(">3 días ago<").unwrap().is_empty());
        assert!(extract_ages(">1٣ days ago<").unwrap().is_empty());
        assert!(extract_ages(">٣ days ago<").unwrap().is_empty());

        let page = "<a>3 días ago</a><a>4 minutes ago</a>";
        assert_eq!(extract_durations(page).unwrap(), vec![Duration::from_secs(240)]);
    }

    #[test]
    fn test_unknown_unit_fails_whole_page() {
        let page = "<a>3 days ago</a><a>2 fortnight ago</a><a>4 hours ago</a>";
        let err = extract_ages(page).unwrap_err();
        assert!(
            matches!(err, WatchError::UnrecognizedUnitError { magnitude: 2, ref unit } if unit == "fortnight")
        );
    }

    #[test]
    fn test_captures_item_id() {
        let page = r#"<span class="age"><a href="item?id=13877867">3 days ago</a></span>
                      <span>5 minutes ago</span>"#;
        let ages = extract_ages(page).unwrap();
        assert_eq!(ages.len(), 2);
        assert_eq!(ages[0].item_id.as_deref(), Some("13877867"));
        assert_eq!(ages[0].age, ItemAge::from_secs(3 * 86_400));
        assert_eq!(ages[1].item_id, None);
        assert_eq!(ages[1].age, ItemAge::from_secs(300));
    }
}
