use crate::domain::GroupRecord;

pub const DEFAULT_SCHEDULES_BASE: &str = "https://szymonkonopek.github.io/calendar/schedules";

/// Builds the `.ics` subscription link for a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    base: String,
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEDULES_BASE)
    }
}

impl LinkBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// The id goes into the path as-is, without percent-encoding.
    pub fn url_for_id(&self, id: &str) -> String {
        format!("{}/{id}.ics", self.base)
    }

    pub fn url_for(&self, record: &GroupRecord) -> String {
        self.url_for_id(&record.id)
    }
}

pub fn subscription_hint(record: &GroupRecord) -> String {
    format!(
        "Copy this link and paste it into your calendar app to subscribe to the calendar of {} ({})",
        record.name, record.parent_category
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let links = LinkBuilder::new("https://example.org/schedules/");
        assert_eq!(links.url_for_id("7"), "https://example.org/schedules/7.ics");
    }
}
