use domain_watch::core::decide::SeenItems;
use domain_watch::core::Domain;
use domain_watch::{extract_ages, extract_durations, AlertDecider, AlertPolicy, WatchError};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const LISTING: &str = include_str!("fixtures/domain_listing.html");
const DAY: u64 = 86_400;

#[test]
fn test_sample_listing_durations() {
    let durations = assert_ok!(extract_durations(LISTING));
    assert_eq!(
        durations,
        vec![Duration::from_secs(3 * DAY), Duration::from_secs(7 * DAY)]
    );

    let ages = assert_ok!(extract_ages(LISTING));
    let ids: Vec<_> = ages.iter().map(|a| a.item_id.as_deref()).collect();
    assert_eq!(ids, vec![Some("13877867"), Some("13845842")]);
}

#[test]
fn test_sample_listing_below_short_threshold_sends_nothing() {
    let ages = assert_ok!(extract_ages(LISTING));
    let decider = AlertDecider::new(Duration::from_secs(20 * 60), AlertPolicy::EveryCycle);
    let decision = decider.evaluate(
        &Domain::new("brandur.org"),
        &ages,
        &mut SeenItems::new(),
        chrono::Utc::now(),
    );
    assert!(decision.to_notify.is_empty());
}

#[test]
fn test_sample_listing_with_long_threshold_alerts_both() {
    let ages = assert_ok!(extract_ages(LISTING));
    let decider = AlertDecider::new(Duration::from_secs(10 * DAY), AlertPolicy::EveryCycle);
    let decision = decider.evaluate(
        &Domain::new("brandur.org"),
        &ages,
        &mut SeenItems::new(),
        chrono::Utc::now(),
    );
    assert_eq!(decision.to_notify.len(), 2);
}

#[test]
fn test_page_without_ages_is_empty_not_error() {
    let page = "<html><body><p>No submissions from this site yet, posted 3 days ago.</p></body></html>";
    assert!(assert_ok!(extract_ages(page)).is_empty());
    assert!(assert_ok!(extract_ages("")).is_empty());
}

#[test]
fn test_fortnight_is_rejected() {
    let page = LISTING.replace(">7 days ago<", ">2 fortnight ago<");
    let err = assert_err!(extract_ages(&page));
    assert!(matches!(
        err,
        WatchError::UnrecognizedUnitError { magnitude: 2, ref unit } if unit == "fortnight"
    ));
}
