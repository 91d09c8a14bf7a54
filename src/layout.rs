//! Tag memory model: fixed page-address layouts
//!
//! Two layout revisions exist and both are kept as explicit named
//! configurations. Reader and writer must use the same layout for a given
//! deployment; [`PACKED`] is the default.
//!
//! | field     | EXPANDED (A)            | PACKED (B)                      |
//! |-----------|-------------------------|---------------------------------|
//! | name      | pages 4-7 (16 bytes)    | pages 4-8 (20 bytes)            |
//! | stats     | pages 8-14, one/page    | pages 9-12, two/page            |
//! | inventory | pages 15-39, kept=no    | pages 13-39, kept=yes           |

use crate::codec;
use std::ops::RangeInclusive;

/// Stat field names in their fixed on-card order.
pub const STAT_FIELDS: [&str; 7] = [
    "money",
    "power",
    "stamina",
    "speed",
    "technique",
    "luck",
    "class",
];

/// Number of named stat fields (both layouts).
pub const STAT_COUNT: usize = STAT_FIELDS.len();

/// Last inventory page, inclusive (both layouts).
pub const INVENTORY_END: u8 = 39;

/// A fixed page-address layout. Process-wide immutable configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    /// Layout name for logs and diagnostics
    pub name: &'static str,
    /// First name page
    pub name_start: u8,
    /// Number of name pages (4 bytes each)
    pub name_pages: u8,
    /// First stats page
    pub stats_start: u8,
    /// Number of stats pages
    pub stats_pages: u8,
    /// Stat values packed per page: 1 (low 2 bytes, rest zero) or 2
    pub stats_per_page: u8,
    /// First inventory page
    pub inventory_start: u8,
    /// Whether the writer zero-fills the inventory region by default
    pub clear_inventory_on_write: bool,
}

/// Layout A ("expanded"): one stat per page, 16-byte name.
pub const EXPANDED: PageLayout = PageLayout {
    name: "expanded",
    name_start: 4,
    name_pages: 4,
    stats_start: 8,
    stats_pages: 7,
    stats_per_page: 1,
    inventory_start: 15,
    clear_inventory_on_write: true,
};

/// Layout B ("packed"): two stats per page, 20-byte name, inventory preserved.
pub const PACKED: PageLayout = PageLayout {
    name: "packed",
    name_start: 4,
    name_pages: 5,
    stats_start: 9,
    stats_pages: 4,
    stats_per_page: 2,
    inventory_start: 13,
    clear_inventory_on_write: false,
};

impl PageLayout {
    /// Name field width in bytes.
    pub fn name_width(&self) -> usize {
        self.name_pages as usize * 4
    }

    /// Name pages in read/write order.
    pub fn name_page_range(&self) -> RangeInclusive<u8> {
        self.name_start..=self.name_start + self.name_pages - 1
    }

    /// Stats pages in read/write order.
    pub fn stats_page_range(&self) -> RangeInclusive<u8> {
        self.stats_start..=self.stats_start + self.stats_pages - 1
    }

    /// Inventory pages in read order, through [`INVENTORY_END`].
    pub fn inventory_page_range(&self) -> RangeInclusive<u8> {
        self.inventory_start..=INVENTORY_END
    }

    /// Decode the stats region pages into the 7 named stat values.
    ///
    /// One-per-page layouts take the low 2 bytes of each page; two-per-page
    /// layouts take both 16-bit halves in page order. Trailing padding words
    /// beyond [`STAT_COUNT`] are dropped.
    pub fn decode_stats(&self, pages: &[[u8; 4]]) -> Vec<u16> {
        let mut stats = Vec::with_capacity(STAT_COUNT);
        for page in pages {
            stats.push(codec::decode_stat(page[0], page[1]));
            if self.stats_per_page == 2 {
                stats.push(codec::decode_stat(page[2], page[3]));
            }
        }
        stats.truncate(STAT_COUNT);
        stats
    }

    /// Encode the 7 stat values into stats-region page payloads, in page
    /// order. `values` must already be range-checked.
    pub fn encode_stats(&self, values: &[u16]) -> Vec<[u8; 4]> {
        let per_page = self.stats_per_page as usize;
        values
            .chunks(per_page)
            .map(|chunk| {
                let mut page = [0u8; 4];
                for (i, &v) in chunk.iter().enumerate() {
                    page[i * 2..i * 2 + 2].copy_from_slice(&v.to_le_bytes());
                }
                page
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_page_ranges() {
        assert_eq!(EXPANDED.name_page_range(), 4..=7);
        assert_eq!(EXPANDED.name_width(), 16);
        assert_eq!(EXPANDED.stats_page_range(), 8..=14);
        assert_eq!(EXPANDED.inventory_page_range(), 15..=39);
    }

    #[test]
    fn test_packed_page_ranges() {
        assert_eq!(PACKED.name_page_range(), 4..=8);
        assert_eq!(PACKED.name_width(), 20);
        assert_eq!(PACKED.stats_page_range(), 9..=12);
        assert_eq!(PACKED.inventory_page_range(), 13..=39);
    }

    #[test]
    fn test_packed_stat_codec_round_trip() {
        let values = [100u16, 5, 5, 5, 5, 5, 1];
        let pages = PACKED.encode_stats(&values);
        assert_eq!(pages.len(), 4);
        // money+power share page 9's payload
        assert_eq!(pages[0], [100, 0, 5, 0]);
        // class alone, upper half zero-padded
        assert_eq!(pages[3], [1, 0, 0, 0]);
        assert_eq!(PACKED.decode_stats(&pages), values);
    }

    #[test]
    fn test_expanded_stat_codec_round_trip() {
        let values = [1000u16, 2, 3, 4, 5, 6, 7];
        let pages = EXPANDED.encode_stats(&values);
        assert_eq!(pages.len(), 7);
        assert_eq!(pages[0], [0xE8, 0x03, 0, 0]);
        assert_eq!(EXPANDED.decode_stats(&pages), values);
    }

    #[test]
    fn test_packed_decode_drops_pad_word() {
        // 4 pages decode to 8 halves; the trailing pad must not surface
        let pages = [[1, 0, 2, 0], [3, 0, 4, 0], [5, 0, 6, 0], [7, 0, 99, 99]];
        assert_eq!(PACKED.decode_stats(&pages), vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
