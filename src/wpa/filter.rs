//! Play-table filters over a computed ledger.

use serde::{Deserialize, Serialize};

use crate::db::models::WpaEntry;

/// Criteria for narrowing the play table. Empty lists and a zero minimum
/// match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerFilter {
    pub innings: Vec<i32>,
    /// Keep plays with |wpa| at least this large
    pub min_abs_wpa: f64,
    pub event_types: Vec<String>,
}

impl LedgerFilter {
    pub fn matches(&self, entry: &WpaEntry) -> bool {
        (self.innings.is_empty() || self.innings.contains(&entry.inning))
            && (self.min_abs_wpa <= 0.0 || entry.wpa.abs() >= self.min_abs_wpa)
            && (self.event_types.is_empty() || self.event_types.contains(&entry.event_type))
    }
}

/// Entries matching `filter`, in ledger order.
pub fn filter_ledger(ledger: &[WpaEntry], filter: &LedgerFilter) -> Vec<WpaEntry> {
    ledger.iter().filter(|e| filter.matches(e)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::HalfInning;
    use crate::wpa::ledger::compute_wpa_ledger;
    use crate::wpa::ledger::tests::play;

    fn ledger() -> Vec<WpaEntry> {
        let plays = vec![
            play(1, HalfInning::Top, 0, 11, 90),
            play(1, HalfInning::Bottom, 2, 91, 21),
            play(5, HalfInning::Top, 0, 12, 90),
            play(8, HalfInning::Top, 3, 13, 92),
            play(9, HalfInning::Bottom, 0, 94, 22),
        ];
        compute_wpa_ledger(&plays, false)
    }

    fn indices(entries: &[WpaEntry]) -> Vec<usize> {
        entries.iter().map(|e| e.play_index).collect()
    }

    #[test]
    fn default_filter_keeps_everything() {
        let ledger = ledger();
        assert_eq!(filter_ledger(&ledger, &LedgerFilter::default()), ledger);
    }

    #[test]
    fn filters_by_inning() {
        let f = LedgerFilter {
            innings: vec![1, 9],
            ..Default::default()
        };
        assert_eq!(indices(&filter_ledger(&ledger(), &f)), vec![0, 1, 4]);
    }

    #[test]
    fn filters_by_minimum_absolute_wpa() {
        let ledger = ledger();
        let f = LedgerFilter {
            min_abs_wpa: 0.1,
            ..Default::default()
        };
        let kept = filter_ledger(&ledger, &f);
        assert!(!kept.is_empty());
        assert!(kept.iter().all(|e| e.wpa.abs() >= 0.1));
        // the scoreless first play moves nothing
        assert!(!indices(&kept).contains(&0));
        // negative swings count by magnitude
        assert!(indices(&kept).contains(&1));
    }

    #[test]
    fn filters_by_event_type_combined_with_inning() {
        let f = LedgerFilter {
            innings: vec![8, 9],
            event_types: vec!["Single".to_string()],
            ..Default::default()
        };
        assert_eq!(indices(&filter_ledger(&ledger(), &f)), vec![3]);

        let none = LedgerFilter {
            event_types: vec!["Home Run".to_string()],
            ..Default::default()
        };
        assert!(filter_ledger(&ledger(), &none).is_empty());
    }
}
