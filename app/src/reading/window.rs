use serde::Deserialize;

use crate::core::time::{DateTime, DateTimeRange};
use crate::t;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Now,
    Daily,
    Weekly,
    Monthly,
}

impl TimeWindow {
    pub fn name(&self) -> &'static str {
        match self {
            TimeWindow::Now => "now",
            TimeWindow::Daily => "daily",
            TimeWindow::Weekly => "weekly",
            TimeWindow::Monthly => "monthly",
        }
    }

    /// Bounds of the window relative to `now`. All ranged windows start at a local midnight
    /// and end at `now`, both inclusive. `Now` has no range, it selects the latest reading only.
    pub fn range_at(&self, now: DateTime) -> Option<DateTimeRange> {
        let start = match self {
            TimeWindow::Now => return None,
            TimeWindow::Daily => now.start_of_day(),
            TimeWindow::Weekly => (now - t!(7 days)).start_of_day(),
            TimeWindow::Monthly => now.months_before(1).start_of_day(),
        };

        Some(DateTimeRange::new(start, now))
    }
}
