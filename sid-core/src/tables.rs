//! Constant sequence and weighting tables
//!
//! Rows are bar heights (0-20) for bars 0..9, left to right. The last row
//! of every sequence is the time-travel pose.

use crate::frame::{BarHeights, BAR_COUNT};

type Row = [u8; BAR_COUNT];

/// Weight row, in percent
pub type WeightRow = [u16; BAR_COUNT];

/// An immutable sequence of bar poses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTable {
    rows: &'static [Row],
}

impl SequenceTable {
    /// Wrap a static row list
    pub const fn new(rows: &'static [Row]) -> Self {
        Self { rows }
    }

    /// Number of rows
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no rows
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the terminal row
    pub const fn last_index(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Row at `index`, clamped to the table
    pub fn row(&self, index: usize) -> BarHeights {
        match self.rows.get(index.min(self.last_index())) {
            Some(row) => BarHeights::new(*row),
            None => BarHeights::BLANK,
        }
    }
}

/// 52-row idle ramp, played directly in pattern mode
pub const STALE: SequenceTable = SequenceTable::new(&STALE_ROWS);

/// 51-row speed ramp used by strict modes
pub const FULL: SequenceTable = SequenceTable::new(&FULL_ROWS);

/// 29-row canonical progression, reached through [`REMAP`]
pub const CANONICAL: SequenceTable = SequenceTable::new(&CANONICAL_ROWS);

/// Procedural baseline (0-20) to [`CANONICAL`] row
pub const REMAP: [u8; 21] = [
    0, 1, 2, 3, 4, 5, 6, 6, 7, 7, 8, 15, 18, 19, 20, 21, 21, 22, 22, 23, 24,
];

/// Bucket of [`WEIGHTS`] used during time travel
pub const TIME_TRAVEL_BUCKET: usize = 20;

/// Per-bar height weights in percent, one bucket per procedural level
pub const WEIGHTS: [WeightRow; 21] = [
    [130, 90, 10, 80, 10, 110, 100, 15, 120, 90],
    [130, 90, 10, 80, 10, 110, 100, 15, 100, 90],
    [130, 90, 20, 80, 15, 110, 100, 15, 120, 100],
    [110, 100, 70, 80, 30, 50, 100, 15, 100, 110],
    [110, 110, 40, 90, 30, 50, 100, 15, 80, 100],
    [110, 110, 30, 120, 30, 50, 110, 15, 50, 100],
    [100, 100, 20, 120, 10, 50, 110, 20, 40, 110],
    [110, 120, 15, 110, 20, 40, 110, 18, 40, 100],
    [100, 100, 15, 110, 20, 50, 100, 15, 50, 90],
    [90, 110, 0, 100, 20, 50, 100, 15, 60, 100],
    [90, 100, 10, 100, 10, 60, 90, 15, 40, 100],
    [90, 100, 10, 100, 10, 90, 90, 15, 110, 100],
    [90, 90, 20, 90, 15, 100, 100, 50, 100, 90],
    [90, 90, 20, 90, 15, 100, 100, 50, 100, 90],
    [90, 80, 10, 80, 15, 90, 80, 50, 100, 80],
    [90, 80, 10, 80, 15, 90, 80, 50, 100, 80],
    [90, 80, 10, 80, 15, 90, 80, 50, 100, 80],
    [90, 70, 20, 70, 15, 70, 70, 40, 100, 70],
    [90, 70, 20, 70, 15, 70, 70, 40, 90, 70],
    [90, 60, 25, 60, 15, 80, 60, 40, 90, 60],
    [90, 90, 70, 100, 90, 110, 90, 60, 95, 80],
];

/// Tallest each bar may be during time travel
pub const TIME_TRAVEL_CAP: Row = [20, 20, 13, 20, 20, 19, 20, 10, 20, 17];

/// Stale row selected by a pattern-mode effect byte
///
/// Spreads 1..=255 over the whole table: `effect * 51.9 / 255`.
pub fn stale_row_for_effect(effect: u8) -> usize {
    (effect as usize * (STALE.last_index() * 10 + 9)) / 2550
}

static STALE_ROWS: [Row; 52] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 0, 0, 4, 0, 0, 0, 0, 0, 0],
    [2, 1, 0, 4, 0, 0, 0, 0, 0, 0],
    [3, 2, 0, 5, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 6, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 6, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 7, 0, 0, 0, 0, 0, 0],
    [4, 4, 0, 7, 0, 0, 0, 0, 0, 0],
    [4, 4, 0, 8, 0, 0, 0, 0, 0, 0],
    [4, 5, 0, 9, 0, 0, 0, 0, 0, 0],
    [4, 5, 0, 9, 0, 1, 0, 0, 0, 0],
    [5, 5, 0, 9, 0, 1, 0, 0, 0, 0],
    [5, 6, 0, 10, 0, 1, 0, 0, 0, 0],
    [5, 7, 0, 10, 0, 1, 0, 0, 0, 1],
    [5, 8, 0, 10, 0, 1, 0, 0, 0, 2],
    [6, 9, 0, 10, 0, 2, 0, 0, 0, 3],
    [6, 9, 0, 10, 0, 2, 1, 0, 0, 4],
    [6, 9, 0, 10, 0, 3, 1, 0, 0, 5],
    [6, 9, 0, 10, 0, 3, 2, 0, 0, 6],
    [6, 9, 0, 10, 0, 3, 3, 0, 0, 7],
    [6, 9, 0, 10, 0, 3, 4, 0, 0, 8],
    [6, 9, 0, 10, 0, 3, 4, 0, 0, 9],
    [7, 10, 0, 10, 0, 3, 4, 0, 0, 9],
    [7, 10, 0, 10, 0, 4, 5, 0, 1, 9],
    [8, 10, 0, 10, 0, 4, 6, 0, 1, 9],
    [8, 10, 0, 10, 0, 4, 7, 0, 2, 9],
    [8, 10, 0, 10, 0, 4, 8, 0, 2, 10],
    [8, 10, 0, 10, 0, 4, 8, 0, 3, 10],
    [8, 10, 0, 10, 0, 4, 9, 0, 3, 10],
    [8, 10, 0, 10, 0, 4, 10, 0, 3, 10],
    [9, 10, 0, 10, 0, 4, 10, 0, 4, 10],
    [9, 10, 0, 10, 0, 5, 10, 0, 5, 10],
    [9, 10, 0, 10, 0, 6, 10, 0, 6, 10],
    [9, 10, 0, 10, 0, 7, 10, 0, 7, 10],
    [10, 10, 0, 10, 0, 8, 10, 0, 8, 10],
    [10, 10, 0, 10, 0, 9, 10, 0, 9, 10],
    [10, 10, 1, 10, 0, 10, 10, 0, 10, 10],
    [10, 10, 1, 10, 0, 11, 10, 0, 11, 10],
    [10, 10, 2, 10, 0, 12, 10, 0, 12, 10],
    [11, 10, 2, 10, 0, 12, 10, 0, 13, 10],
    [12, 10, 3, 10, 0, 12, 10, 0, 14, 10],
    [13, 10, 3, 10, 0, 12, 10, 0, 15, 10],
    [14, 10, 3, 10, 0, 12, 10, 0, 16, 10],
    [15, 10, 4, 10, 0, 12, 10, 0, 17, 10],
    [16, 10, 4, 10, 0, 12, 10, 0, 18, 10],
    [17, 10, 4, 10, 0, 12, 10, 0, 19, 10],
    [18, 10, 6, 10, 0, 12, 10, 0, 20, 10],
    [19, 10, 6, 10, 0, 12, 10, 0, 20, 10],
    [19, 11, 6, 10, 0, 12, 11, 0, 20, 10],
    [20, 15, 7, 10, 0, 12, 15, 0, 20, 10],
    [20, 20, 10, 10, 5, 12, 20, 6, 20, 10],
    [20, 20, 13, 20, 20, 19, 20, 10, 20, 17],
];

static FULL_ROWS: [Row; 51] = [
    [1, 0, 0, 4, 0, 0, 0, 0, 0, 0],
    [2, 1, 0, 4, 0, 0, 0, 0, 0, 0],
    [3, 2, 0, 5, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 6, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 6, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 7, 0, 0, 0, 0, 0, 0],
    [4, 4, 0, 7, 0, 0, 0, 0, 0, 0],
    [4, 4, 0, 8, 0, 0, 0, 0, 0, 0],
    [4, 5, 0, 9, 0, 0, 0, 0, 0, 0],
    [4, 5, 0, 9, 0, 1, 0, 0, 0, 0],
    [5, 5, 0, 9, 0, 1, 0, 0, 0, 0],
    [5, 6, 0, 10, 0, 1, 0, 0, 0, 0],
    [5, 7, 0, 10, 0, 1, 0, 0, 0, 1],
    [5, 8, 0, 10, 0, 1, 0, 0, 0, 2],
    [6, 9, 0, 10, 0, 2, 0, 0, 0, 3],
    [6, 9, 0, 10, 0, 2, 1, 0, 0, 4],
    [6, 9, 0, 10, 0, 3, 1, 0, 0, 5],
    [6, 9, 0, 10, 0, 3, 2, 0, 0, 6],
    [6, 9, 0, 10, 0, 3, 3, 0, 0, 7],
    [6, 9, 0, 10, 0, 3, 4, 0, 0, 8],
    [6, 9, 0, 10, 0, 3, 4, 0, 0, 9],
    [7, 10, 0, 10, 0, 3, 4, 0, 0, 9],
    [7, 10, 0, 10, 0, 4, 5, 0, 1, 9],
    [8, 10, 0, 10, 0, 4, 6, 0, 1, 9],
    [8, 10, 0, 10, 0, 4, 7, 0, 2, 9],
    [8, 10, 0, 10, 0, 4, 8, 0, 2, 10],
    [8, 10, 0, 10, 0, 4, 8, 0, 3, 10],
    [8, 10, 0, 10, 0, 4, 9, 0, 3, 10],
    [8, 10, 0, 10, 0, 4, 10, 0, 3, 10],
    [9, 10, 0, 10, 0, 4, 10, 0, 4, 10],
    [9, 10, 0, 10, 0, 5, 10, 0, 5, 10],
    [9, 10, 0, 10, 0, 6, 10, 0, 6, 10],
    [9, 10, 0, 10, 0, 7, 10, 0, 7, 10],
    [10, 10, 0, 10, 0, 8, 10, 0, 8, 10],
    [10, 10, 0, 10, 0, 9, 10, 0, 9, 10],
    [10, 10, 1, 10, 0, 10, 10, 0, 10, 10],
    [10, 10, 1, 10, 0, 11, 10, 0, 11, 10],
    [10, 10, 2, 10, 0, 12, 10, 0, 12, 10],
    [11, 10, 2, 10, 0, 12, 10, 0, 13, 10],
    [12, 10, 3, 10, 0, 12, 10, 0, 14, 10],
    [13, 10, 3, 10, 0, 12, 10, 0, 15, 10],
    [14, 10, 3, 10, 0, 12, 10, 0, 16, 10],
    [15, 10, 4, 10, 0, 12, 10, 0, 17, 10],
    [16, 10, 4, 10, 0, 12, 10, 0, 18, 10],
    [17, 10, 4, 10, 0, 12, 10, 0, 19, 10],
    [18, 10, 6, 10, 0, 12, 10, 0, 20, 10],
    [19, 10, 6, 10, 0, 12, 10, 0, 20, 10],
    [19, 11, 6, 10, 0, 12, 11, 0, 20, 10],
    [20, 15, 7, 10, 0, 12, 15, 0, 20, 10],
    [20, 20, 10, 10, 5, 12, 20, 6, 20, 10],
    [20, 20, 13, 20, 20, 19, 20, 10, 20, 17],
];

static CANONICAL_ROWS: [Row; 29] = [
    [0, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 2, 0, 2, 0, 0, 1, 0, 1, 1],
    [2, 3, 0, 2, 0, 1, 2, 0, 1, 2],
    [3, 4, 0, 3, 0, 1, 3, 0, 2, 3],
    [4, 5, 0, 3, 0, 1, 4, 0, 2, 4],
    [5, 6, 0, 5, 0, 2, 6, 0, 2, 5],
    [6, 7, 0, 7, 0, 2, 7, 0, 2, 7],
    [7, 9, 0, 9, 0, 3, 8, 0, 3, 9],
    [8, 10, 0, 10, 0, 4, 9, 0, 3, 10],
    [8, 10, 0, 10, 0, 5, 9, 0, 4, 10],
    [8, 10, 0, 10, 0, 5, 9, 0, 5, 10],
    [8, 10, 0, 10, 0, 6, 9, 0, 6, 10],
    [8, 10, 0, 10, 0, 8, 9, 0, 7, 10],
    [8, 10, 0, 10, 0, 10, 9, 0, 8, 10],
    [8, 10, 0, 10, 0, 10, 9, 0, 9, 10],
    [10, 10, 1, 10, 0, 10, 10, 0, 10, 10],
    [10, 10, 1, 10, 0, 10, 10, 0, 10, 10],
    [10, 10, 1, 10, 0, 11, 10, 0, 11, 10],
    [10, 10, 2, 10, 0, 11, 10, 0, 12, 10],
    [11, 10, 3, 10, 0, 11, 10, 0, 13, 10],
    [12, 10, 3, 10, 0, 12, 10, 0, 14, 10],
    [13, 10, 3, 10, 0, 12, 10, 0, 15, 10],
    [14, 10, 4, 10, 0, 12, 10, 0, 16, 10],
    [15, 10, 4, 10, 0, 12, 10, 0, 17, 10],
    [16, 10, 4, 10, 0, 12, 10, 0, 18, 10],
    [19, 10, 6, 10, 0, 12, 10, 0, 20, 10],
    [20, 15, 7, 10, 0, 12, 15, 7, 20, 10],
    [20, 20, 10, 10, 5, 12, 20, 10, 20, 10],
    [20, 20, 13, 20, 20, 19, 20, 10, 20, 17],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lengths() {
        assert_eq!(STALE.len(), 52);
        assert_eq!(FULL.len(), 51);
        assert_eq!(CANONICAL.len(), 29);
        assert!((REMAP[20] as usize) < CANONICAL.len());
    }

    #[test]
    fn test_sequences_end_in_time_travel_pose() {
        let pose = BarHeights::new(TIME_TRAVEL_CAP);
        assert_eq!(STALE.row(STALE.last_index()), pose);
        assert_eq!(FULL.row(FULL.last_index()), pose);
        assert_eq!(CANONICAL.row(CANONICAL.last_index()), pose);
    }

    #[test]
    fn test_row_clamps_index() {
        assert_eq!(FULL.row(500), FULL.row(50));
        assert!(STALE.row(0).is_blank());
    }

    #[test]
    fn test_rows_within_height() {
        let all = STALE_ROWS
            .iter()
            .chain(FULL_ROWS.iter())
            .chain(CANONICAL_ROWS.iter());
        for (i, row) in all.enumerate() {
            assert!(row.iter().all(|&h| h <= 20), "row {} too tall", i);
        }
    }

    #[test]
    fn test_stale_row_for_effect() {
        assert_eq!(stale_row_for_effect(0), 0);
        assert_eq!(stale_row_for_effect(1), 0);
        assert_eq!(stale_row_for_effect(128), 26);
        assert_eq!(stale_row_for_effect(255), 51);
    }

    #[test]
    fn test_remap_monotonic() {
        assert!(REMAP.windows(2).all(|w| w[0] <= w[1]));
    }
}
