use std::sync::Mutex;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;

use uek_calendar::app::{COPIED_MESSAGE, DIALOG_TITLE, Session, TOAST_DURATION, search_hits};
use uek_calendar::catalog::Catalog;
use uek_calendar::clipboard::ClipboardSink;
use uek_calendar::error::CalendarError;
use uek_calendar::link::LinkBuilder;
use uek_calendar::telemetry::{TelemetryEvent, TelemetrySink};

const SAMPLE: &str = r#"{"Science": [["Physics","001"], ["Chemistry","003"]], "Arts": [["History","002"]]}"#;

#[derive(Default)]
struct MockClipboard {
    written: Mutex<Vec<String>>,
    reject: bool,
}

impl ClipboardSink for &MockClipboard {
    fn write_text(&self, text: &str) -> Result<(), CalendarError> {
        if self.reject {
            return Err(CalendarError::Clipboard("denied".to_string()));
        }
        self.written.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct MockTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl TelemetrySink for &MockTelemetry {
    fn record(&self, event: TelemetryEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn loaded<'a>(
    clipboard: &'a MockClipboard,
    telemetry: &'a MockTelemetry,
) -> Session<&'a MockClipboard, &'a MockTelemetry> {
    let mut session = Session::new(LinkBuilder::default(), clipboard, telemetry);
    session.finish_load(Catalog::from_json(SAMPLE));
    session
}

#[test]
fn starts_loading_and_records_page_view() {
    let clipboard = MockClipboard::default();
    let telemetry = MockTelemetry::default();
    let session = Session::new(LinkBuilder::default(), &clipboard, &telemetry);

    assert!(session.is_loading());
    assert!(session.catalog().is_empty());
    assert_eq!(*telemetry.events.lock().unwrap(), vec![TelemetryEvent::PageView]);
}

#[test]
fn failed_load_leaves_empty_catalog_and_stops_loading() {
    let clipboard = MockClipboard::default();
    let telemetry = MockTelemetry::default();
    let mut session = Session::new(LinkBuilder::default(), &clipboard, &telemetry);
    session.set_query("phys");

    session.finish_load(Err(CalendarError::CatalogHttp("connection refused".to_string())));

    assert!(!session.is_loading());
    assert!(session.catalog().is_empty());
    assert!(session.results().is_empty());
    assert!(session.load_error().unwrap().contains("connection refused"));

    session.finish_load(Ok(Catalog::bundled().unwrap()));
    assert!(session.load_error().is_none());
}

#[test]
fn query_typed_before_load_is_applied_when_catalog_arrives() {
    let clipboard = MockClipboard::default();
    let telemetry = MockTelemetry::default();
    let mut session = Session::new(LinkBuilder::default(), &clipboard, &telemetry);
    session.set_query("hist");
    assert!(session.results().is_empty());

    session.finish_load(Catalog::from_json(SAMPLE));
    assert_eq!(session.results().len(), 1);
    assert_eq!(session.results()[0].id, "002");
}

#[test]
fn select_opens_dialog_with_link_and_records_name() {
    let clipboard = MockClipboard::default();
    let telemetry = MockTelemetry::default();
    let mut session = loaded(&clipboard, &telemetry);

    session.set_query("sci");
    assert_eq!(session.results().len(), 2);
    assert!(session.select(1));

    let dialog = session.dialog().unwrap();
    assert_eq!(dialog.title, DIALOG_TITLE);
    assert_eq!(
        dialog.url,
        "https://szymonkonopek.github.io/calendar/schedules/003.ics"
    );
    assert!(dialog.hint.ends_with("Chemistry (Science)"));
    assert_eq!(
        telemetry.events.lock().unwrap().last(),
        Some(&TelemetryEvent::GroupSelected {
            name: "Chemistry".to_string()
        })
    );

    session.close_dialog();
    assert!(session.dialog().is_none());
    assert_eq!(session.selected().unwrap().name, "Chemistry");
}

#[test]
fn select_out_of_range_is_ignored() {
    let clipboard = MockClipboard::default();
    let telemetry = MockTelemetry::default();
    let mut session = loaded(&clipboard, &telemetry);
    session.set_query("history");

    assert!(!session.select(5));
    assert!(session.dialog().is_none());
    assert_eq!(telemetry.events.lock().unwrap().len(), 1);
}

#[test]
fn copy_writes_link_and_shows_toast_for_a_while() {
    let clipboard = MockClipboard::default();
    let telemetry = MockTelemetry::default();
    let mut session = loaded(&clipboard, &telemetry);
    session.set_query("001");
    session.open_highlighted();

    let now = Instant::now();
    session.copy_link_at(now).unwrap();

    assert_eq!(
        *clipboard.written.lock().unwrap(),
        vec!["https://szymonkonopek.github.io/calendar/schedules/001.ics".to_string()]
    );
    assert_eq!(session.toast(now), Some(COPIED_MESSAGE));
    assert_eq!(
        session.toast(now + TOAST_DURATION - Duration::from_millis(1)),
        Some(COPIED_MESSAGE)
    );
    assert_eq!(session.toast(now + TOAST_DURATION), None);
}

#[test]
fn rejected_copy_shows_no_toast() {
    let clipboard = MockClipboard {
        reject: true,
        ..MockClipboard::default()
    };
    let telemetry = MockTelemetry::default();
    let mut session = loaded(&clipboard, &telemetry);
    session.set_query("physics");
    session.open_highlighted();

    let now = Instant::now();
    assert_matches!(session.copy_link_at(now), Err(CalendarError::Clipboard(_)));
    assert_eq!(session.toast(now), None);
}

#[test]
fn copy_without_selection_fails() {
    let clipboard = MockClipboard::default();
    let telemetry = MockTelemetry::default();
    let mut session = loaded(&clipboard, &telemetry);
    assert_matches!(session.copy_link(), Err(CalendarError::NothingSelected));
}

#[test]
fn highlight_stays_within_results() {
    let clipboard = MockClipboard::default();
    let telemetry = MockTelemetry::default();
    let mut session = loaded(&clipboard, &telemetry);
    session.set_query("s");

    session.move_highlight(-3);
    assert_eq!(session.highlighted(), 0);
    session.move_highlight(10);
    assert_eq!(session.highlighted(), session.results().len() - 1);

    session.set_query("history");
    assert_eq!(session.highlighted(), 0);
}

#[test]
fn search_hits_carry_links() {
    let catalog = Catalog::from_json(SAMPLE).unwrap();
    let hits = search_hits(&catalog, &LinkBuilder::new("https://cal.example"), "arts");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, "https://cal.example/002.ics");

    let json = serde_json::to_value(&hits[0]).unwrap();
    assert_eq!(json["parentCategory"], "Arts");
    assert_eq!(json["url"], "https://cal.example/002.ics");
}
