//! Frame buffer for the 10x20 segment grid
//!
//! The grid is wired across two HT16K33 chips, eight 16-bit RAM words each.
//! The bottom 16 segments of every bar sit in word `bar` (bit = segment).
//! The top four segments are packed into words 10..13: bars 0-5 use the low
//! nibble of word `10 + bar`, bars 6-9 the high nibble of word `4 + bar`.

use sid_core::{BAR_COUNT, MAX_HEIGHT};

/// RAM words per chip
pub const WORDS_PER_CHIP: usize = 8;

/// Rows in a [`Field`]
pub const FIELD_ROWS: usize = MAX_HEIGHT as usize;

/// Whole-grid bitmap, one word per row, row 0 at the top
///
/// Bar 0 is bit 9, bar 9 is bit 0, so binary literals read left to right.
pub type Field = [u16; FIELD_ROWS];

/// Segments per bar held in the bar's own word
const LOWER_SEGMENTS: u8 = 16;

/// Buffer word and bit mask for segment `level` (0 = bottom) of `bar`
const fn locate(bar: usize, level: u8) -> (usize, u16) {
    if level < LOWER_SEGMENTS {
        (bar, 1 << level)
    } else if bar < 6 {
        (10 + bar, 1 << (level - LOWER_SEGMENTS))
    } else {
        (4 + bar, 1 << (level - LOWER_SEGMENTS + 4))
    }
}

/// Frame buffer for both chips
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarMatrix {
    words: [u16; 2 * WORDS_PER_CHIP],
}

impl Default for BarMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl BarMatrix {
    /// Create an all-dark buffer
    pub const fn new() -> Self {
        Self {
            words: [0; 2 * WORDS_PER_CHIP],
        }
    }

    /// Clear every segment
    pub fn clear(&mut self) {
        self.words = [0; 2 * WORDS_PER_CHIP];
    }

    fn set_segment(&mut self, bar: usize, level: u8, lit: bool) {
        let (word, mask) = locate(bar, level);
        if lit {
            self.words[word] |= mask;
        } else {
            self.words[word] &= !mask;
        }
    }

    /// Whether segment `level` (0 = bottom) of `bar` is lit
    pub fn is_lit(&self, bar: usize, level: u8) -> bool {
        if bar >= BAR_COUNT || level >= MAX_HEIGHT {
            return false;
        }
        let (word, mask) = locate(bar, level);
        self.words[word] & mask != 0
    }

    /// Light the bottom `height` segments of `bar`, clear the rest
    ///
    /// Heights above 20 are clamped. Out-of-range bars are ignored.
    pub fn draw_bar_height(&mut self, bar: usize, height: u8) {
        if bar >= BAR_COUNT {
            return;
        }
        let height = height.min(MAX_HEIGHT);
        for level in 0..MAX_HEIGHT {
            self.set_segment(bar, level, level < height);
        }
    }

    /// Light segments `bottom..=top` of `bar`, clear the rest
    ///
    /// Both ends clamp to the top segment; a `bottom` above `top` collapses
    /// to a single segment at `top`.
    pub fn draw_bar_range(&mut self, bar: usize, bottom: u8, top: u8) {
        if bar >= BAR_COUNT {
            return;
        }
        let top = top.min(MAX_HEIGHT - 1);
        let bottom = bottom.min(top);
        for level in 0..MAX_HEIGHT {
            self.set_segment(bar, level, (bottom..=top).contains(&level));
        }
    }

    /// Clear one bar
    pub fn clear_bar(&mut self, bar: usize) {
        self.draw_bar_height(bar, 0);
    }

    /// Light a single segment, leaving the rest of the bar alone
    pub fn draw_dot(&mut self, bar: usize, level: u8) {
        if bar < BAR_COUNT && level < MAX_HEIGHT {
            self.set_segment(bar, level, true);
        }
    }

    /// Replace the whole grid with a bitmap
    pub fn draw_field(&mut self, field: &Field) {
        for (row, bits) in field.iter().enumerate() {
            let level = (FIELD_ROWS - 1 - row) as u8;
            for bar in 0..BAR_COUNT {
                let lit = bits & (1 << (BAR_COUNT - 1 - bar)) != 0;
                self.set_segment(bar, level, lit);
            }
        }
    }

    /// Number of lit segments in `bar`
    pub fn lit_count(&self, bar: usize) -> u8 {
        (0..MAX_HEIGHT).filter(|&l| self.is_lit(bar, l)).count() as u8
    }

    /// Raw buffer, chip 1 first
    pub fn words(&self) -> &[u16; 2 * WORDS_PER_CHIP] {
        &self.words
    }

    /// RAM image for one chip (0 or 1)
    pub fn chip_words(&self, chip: usize) -> &[u16] {
        let start = chip.min(1) * WORDS_PER_CHIP;
        &self.words[start..start + WORDS_PER_CHIP]
    }
}
