use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Length of every report window, in days
pub const WINDOW_DAYS: i64 = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The seven full UTC days preceding the day a report runs on.
///
/// `end` is exclusive: a window computed on 2024-03-11 at any time of day
/// covers `[2024-03-04 00:00, 2024-03-11 00:00)` and is labelled
/// `2024-03-04` to `2024-03-10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// One day of a report window, queried on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySlice {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Window ending at midnight UTC of the day `now` falls on
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let end = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        Self {
            start: end - Duration::days(WINDOW_DAYS),
            end,
        }
    }

    pub fn current() -> Self {
        Self::ending_at(Utc::now())
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn start_label(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// Last day inside the window
    pub fn end_label(&self) -> String {
        (self.end - Duration::seconds(1)).format(DATE_FORMAT).to_string()
    }

    pub fn days(self) -> impl Iterator<Item = DaySlice> {
        let first = self.start;
        (0..WINDOW_DAYS).map(move |offset| {
            let start = first + Duration::days(offset);
            DaySlice {
                start,
                end: start + Duration::days(1),
            }
        })
    }
}

impl DaySlice {
    pub fn start_label(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_label(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}
