//! Date-sequenced output names
//!
//! Files are named `YYYY_MM_DD_NNN.ext` where `NNN` counts the files seen
//! for that capture date during one run. Counters are keyed by capture
//! date, not by processing order, and only ever move forward.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

/// Minimum width of the per-day counter. Wider values are printed in full.
pub const COUNTER_WIDTH: usize = 3;

/// Per-day counters for one run
#[derive(Debug, Default, Clone)]
pub struct DateCounterTable {
    counters: HashMap<NaiveDate, u32>,
}

impl DateCounterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next counter for `date`, starting at 1
    pub fn next(&mut self, date: NaiveDate) -> u32 {
        let counter = self.counters.entry(date).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Last counter handed out for `date`, 0 if none
    pub fn current(&self, date: NaiveDate) -> u32 {
        self.counters.get(&date).copied().unwrap_or(0)
    }

    /// Produce the next unique filename for a capture time.
    ///
    /// `extension` is lower-cased and gets a leading dot if missing.
    pub fn name_for(&mut self, timestamp: &NaiveDateTime, extension: &str) -> String {
        let date = timestamp.date();
        let counter = self.next(date);
        format_name(date, counter, extension)
    }

    /// Number of distinct dates seen
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// `YYYY_MM_DD_NNN.ext`
pub fn format_name(date: NaiveDate, counter: u32, extension: &str) -> String {
    let extension = extension.to_lowercase();
    let dot = if extension.is_empty() || extension.starts_with('.') {
        ""
    } else {
        "."
    };
    format!(
        "{}_{:0width$}{}{}",
        date.format("%Y_%m_%d"),
        counter,
        dot,
        extension,
        width = COUNTER_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_format_name() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
        assert_eq!(format_name(date, 1, ".jpg"), "2021_06_15_001.jpg");
        assert_eq!(format_name(date, 42, "JPG"), "2021_06_15_042.jpg");
        assert_eq!(format_name(date, 7, ".mp4"), "2021_06_15_007.mp4");
        assert_eq!(format_name(date, 3, ""), "2021_06_15_003");
    }

    #[test]
    fn test_counter_widens_past_999() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
        assert_eq!(format_name(date, 999, ".jpg"), "2021_06_15_999.jpg");
        assert_eq!(format_name(date, 1000, ".jpg"), "2021_06_15_1000.jpg");
    }

    #[test]
    fn test_same_day_counters_are_sequential() {
        let mut table = DateCounterTable::new();
        let names: Vec<_> = (0..5)
            .map(|h| table.name_for(&at(2023, 12, 14, h), ".jpg"))
            .collect();
        assert_eq!(
            names,
            vec![
                "2023_12_14_001.jpg",
                "2023_12_14_002.jpg",
                "2023_12_14_003.jpg",
                "2023_12_14_004.jpg",
                "2023_12_14_005.jpg",
            ]
        );
        assert_eq!(table.current(at(2023, 12, 14, 0).date()), 5);
    }

    #[test]
    fn test_interleaved_dates_keep_separate_counters() {
        let mut table = DateCounterTable::new();
        assert_eq!(table.name_for(&at(2023, 1, 2, 10), ".jpg"), "2023_01_02_001.jpg");
        assert_eq!(table.name_for(&at(2023, 1, 1, 10), ".mp4"), "2023_01_01_001.mp4");
        assert_eq!(table.name_for(&at(2023, 1, 2, 8), ".png"), "2023_01_02_002.png");
        // An earlier capture date seen later still gets the next counter, no backfill
        assert_eq!(table.name_for(&at(2023, 1, 1, 0), ".jpg"), "2023_01_01_002.jpg");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_names_unique_within_run() {
        let mut table = DateCounterTable::new();
        let mut seen = HashSet::new();
        for i in 0..300u32 {
            let ts = at(2020, 1 + i % 3, 1 + i % 5, i % 24);
            assert!(seen.insert(table.name_for(&ts, ".jpg")));
        }
    }

    #[test]
    fn test_fresh_table_restarts_counters() {
        let ts = at(2022, 1, 1, 12);
        let mut first = DateCounterTable::new();
        let mut second = DateCounterTable::new();
        assert_eq!(first.name_for(&ts, ".jpg"), second.name_for(&ts, ".jpg"));
        assert!(DateCounterTable::new().is_empty());
    }
}
