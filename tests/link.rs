use uek_calendar::app::resolve_link;
use uek_calendar::catalog::Catalog;
use uek_calendar::domain::{GroupId, GroupRecord};
use uek_calendar::error::CalendarError;
use uek_calendar::link::{DEFAULT_SCHEDULES_BASE, LinkBuilder, subscription_hint};

use assert_matches::assert_matches;

#[test]
fn default_link_points_at_schedules_feed() {
    let record = GroupRecord::new("KrDEk1011", "042", "Ekonomia");
    assert_eq!(
        LinkBuilder::default().url_for(&record),
        "https://szymonkonopek.github.io/calendar/schedules/042.ics"
    );
    assert_eq!(LinkBuilder::default().base(), DEFAULT_SCHEDULES_BASE);
}

#[test]
fn hint_names_group_and_category() {
    let record = GroupRecord::new("Physics", "001", "Science");
    assert_eq!(
        subscription_hint(&record),
        "Copy this link and paste it into your calendar app to subscribe to the calendar of Physics (Science)"
    );
}

#[test]
fn resolve_link_requires_known_id() {
    let catalog = Catalog::from_json(r#"{"Science": [["Physics","042"]]}"#).unwrap();
    let links = LinkBuilder::default();

    let id: GroupId = "042".parse().unwrap();
    let result = resolve_link(&catalog, &links, &id).unwrap();
    assert_eq!(result.record.name, "Physics");
    assert!(result.url.ends_with("/042.ics"));
    assert!(!result.copied);

    let missing: GroupId = "999".parse().unwrap();
    assert_matches!(
        resolve_link(&catalog, &links, &missing),
        Err(CalendarError::GroupNotFound(_))
    );
}
