use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::catalog::Catalog;
use crate::clipboard::ClipboardSink;
use crate::domain::{GroupId, GroupRecord};
use crate::error::CalendarError;
use crate::link::{LinkBuilder, subscription_hint};
use crate::search;
use crate::telemetry::{TelemetryEvent, TelemetrySink};

pub const DIALOG_TITLE: &str = "Your calendar URL";
pub const COPIED_MESSAGE: &str = "Group URL copied to clipboard";
pub const TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub record: GroupRecord,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub title: &'static str,
    pub url: String,
    pub hint: String,
}

/// State of the search screen for one run of the program.
///
/// The catalog is written once by [`Session::finish_load`] and only read
/// afterwards.
pub struct Session<C: ClipboardSink, T: TelemetrySink> {
    links: LinkBuilder,
    clipboard: C,
    telemetry: T,
    catalog: Catalog,
    loading: bool,
    load_error: Option<String>,
    query: String,
    results: Vec<GroupRecord>,
    highlighted: usize,
    selected: Option<GroupRecord>,
    dialog_open: bool,
    toast_until: Option<Instant>,
}

impl<C: ClipboardSink, T: TelemetrySink> Session<C, T> {
    pub fn new(links: LinkBuilder, clipboard: C, telemetry: T) -> Self {
        telemetry.record(TelemetryEvent::PageView);
        Self {
            links,
            clipboard,
            telemetry,
            catalog: Catalog::empty(),
            loading: true,
            load_error: None,
            query: String::new(),
            results: Vec::new(),
            highlighted: 0,
            selected: None,
            dialog_open: false,
            toast_until: None,
        }
    }

    pub fn finish_load(&mut self, result: Result<Catalog, CalendarError>) {
        match result {
            Ok(catalog) => {
                self.catalog = catalog;
                self.load_error = None;
            }
            Err(err) => {
                error!(error = %err, kind = ?err.load_failure(), "catalog load failed");
                self.catalog = Catalog::empty();
                self.load_error = Some(err.to_string());
            }
        }
        self.loading = false;
        self.refresh();
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.refresh();
        debug!(query = %self.query, hits = self.results.len(), "search");
    }

    fn refresh(&mut self) {
        self.results = search::filter(self.catalog.records(), &self.query)
            .into_iter()
            .cloned()
            .collect();
        self.highlighted = self.highlighted.min(self.results.len().saturating_sub(1));
    }

    pub fn move_highlight(&mut self, delta: isize) {
        if self.results.is_empty() {
            self.highlighted = 0;
            return;
        }
        let last = self.results.len() - 1;
        self.highlighted = self.highlighted.saturating_add_signed(delta).min(last);
    }

    pub fn open_highlighted(&mut self) -> bool {
        self.select(self.highlighted)
    }

    /// Opens the dialog for the result at `index`. Out-of-range indices are
    /// ignored.
    pub fn select(&mut self, index: usize) -> bool {
        let Some(record) = self.results.get(index).cloned() else {
            return false;
        };
        self.highlighted = index;
        self.telemetry.record(TelemetryEvent::GroupSelected {
            name: record.name.clone(),
        });
        self.selected = Some(record);
        self.dialog_open = true;
        true
    }

    pub fn close_dialog(&mut self) {
        self.dialog_open = false;
    }

    pub fn dialog(&self) -> Option<DialogView> {
        if !self.dialog_open {
            return None;
        }
        self.selected.as_ref().map(|record| DialogView {
            title: DIALOG_TITLE,
            url: self.links.url_for(record),
            hint: subscription_hint(record),
        })
    }

    /// Copies the selected group's link. A rejected write is logged and
    /// leaves the toast hidden.
    pub fn copy_link(&mut self) -> Result<(), CalendarError> {
        self.copy_link_at(Instant::now())
    }

    pub fn copy_link_at(&mut self, now: Instant) -> Result<(), CalendarError> {
        let record = self.selected.as_ref().ok_or(CalendarError::NothingSelected)?;
        let url = self.links.url_for(record);
        match self.clipboard.write_text(&url) {
            Ok(()) => {
                self.toast_until = Some(now + TOAST_DURATION);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "clipboard write rejected");
                Err(err)
            }
        }
    }

    pub fn toast(&self, now: Instant) -> Option<&'static str> {
        match self.toast_until {
            Some(until) if now < until => Some(COPIED_MESSAGE),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Why the catalog is empty, when loading failed.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn results(&self) -> &[GroupRecord] {
        &self.results
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn selected(&self) -> Option<&GroupRecord> {
        self.selected.as_ref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// Search results for the non-interactive `search` command.
pub fn search_hits(catalog: &Catalog, links: &LinkBuilder, query: &str) -> Vec<SearchHit> {
    search::filter(catalog.records(), query)
        .into_iter()
        .map(|record| SearchHit {
            record: record.clone(),
            url: links.url_for(record),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkResult {
    #[serde(flatten)]
    pub record: GroupRecord,
    pub url: String,
    pub copied: bool,
}

pub fn resolve_link(
    catalog: &Catalog,
    links: &LinkBuilder,
    id: &GroupId,
) -> Result<LinkResult, CalendarError> {
    let record = catalog
        .find_by_id(id.as_str())
        .ok_or_else(|| CalendarError::GroupNotFound(id.to_string()))?;
    Ok(LinkResult {
        record: record.clone(),
        url: links.url_for(record),
        copied: false,
    })
}
