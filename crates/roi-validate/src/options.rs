use chrono::{Local, NaiveDate, NaiveDateTime};

use roi_standards::Exemptions;

/// Per-run inputs that are not tables, rules or schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Reference instant for expiry checks.
    pub now: NaiveDateTime,
    pub exemptions: Exemptions,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            now: Local::now().naive_local(),
            exemptions: Exemptions::default(),
        }
    }
}

impl ValidationOptions {
    #[must_use]
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// Audit as of the start of `date`.
    #[must_use]
    pub fn as_of(self, date: NaiveDate) -> Self {
        self.with_now(date.and_time(chrono::NaiveTime::MIN))
    }

    #[must_use]
    pub fn with_exemptions(mut self, exemptions: Exemptions) -> Self {
        self.exemptions = exemptions;
        self
    }
}
