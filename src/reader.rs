//! Full record assembly from a present card
//!
//! Name and stats are mandatory regions: any failed page aborts the whole
//! read with no partial record. Inventory is best-effort: reading stops at
//! the first failed page, and whatever was collected is valid.

use crate::codec;
use crate::error::{Error, Result};
use crate::layout::PageLayout;
use crate::record::{InventorySlot, TagRecord};
use crate::transport::CardTransport;

/// Read and decode a complete [`TagRecord`] over an open session.
pub fn read_record<T: CardTransport + ?Sized>(
    transport: &mut T,
    layout: &PageLayout,
) -> Result<TagRecord> {
    let idm = transport.get_identifier()?;

    let name_pages = read_region(transport, layout.name_page_range())?;
    let name = codec::decode_name(&name_pages);

    let stat_pages = read_region(transport, layout.stats_page_range())?;
    let stats = layout.decode_stats(&stat_pages);

    let mut inventory = Vec::new();
    for page in layout.inventory_page_range() {
        match transport.read_page(page) {
            Ok(data) => inventory.push(InventorySlot { page, data }),
            Err(_) => {
                // End of readable inventory, not an error
                log::debug!("Inventory read stopped at page {}", page);
                break;
            }
        }
    }

    Ok(TagRecord {
        idm,
        name,
        stats,
        inventory,
    })
}

/// Read a mandatory page range in order; the first failure aborts.
fn read_region<T: CardTransport + ?Sized>(
    transport: &mut T,
    pages: std::ops::RangeInclusive<u8>,
) -> Result<Vec<[u8; 4]>> {
    let mut region = Vec::new();
    for page in pages {
        let data = transport
            .read_page(page)
            .map_err(|_| Error::IncompleteRead { page })?;
        region.push(data);
    }
    Ok(region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PACKED;
    use crate::transport::MockTransport;

    fn card_with_record(mock: &MockTransport) {
        mock.set_identifier(&[0x01, 0x02, 0x03, 0x04]);
        // name "Taro" over pages 4-8 (20 bytes)
        let name = codec::encode_name("Taro", PACKED.name_width());
        for (i, chunk) in name.chunks(4).enumerate() {
            mock.set_page(4 + i as u8, chunk.try_into().unwrap());
        }
        // stats pages 9-12: money=100, power..luck=5, class=1
        for (i, page) in PACKED
            .encode_stats(&[100, 5, 5, 5, 5, 5, 1])
            .into_iter()
            .enumerate()
        {
            mock.set_page(9 + i as u8, page);
        }
    }

    #[test]
    fn test_full_read_packed() {
        let mut mock = MockTransport::new();
        card_with_record(&mock);
        let record = read_record(&mut mock, &PACKED).unwrap();
        assert_eq!(record.idm, vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(record.name, "Taro");
        assert_eq!(record.stats, vec![100, 5, 5, 5, 5, 5, 1]);
        assert!(record.inventory.is_empty());
    }

    #[test]
    fn test_partial_inventory_is_success() {
        let mut mock = MockTransport::new();
        card_with_record(&mock);
        for page in 13..=19 {
            mock.set_page(page, [page, 0, 0, 0]);
        }
        // page 20 missing: read stops there
        let record = read_record(&mut mock, &PACKED).unwrap();
        let pages: Vec<u8> = record.inventory.iter().map(|s| s.page).collect();
        assert_eq!(pages, vec![13, 14, 15, 16, 17, 18, 19]);
    }

    #[test]
    fn test_inventory_gap_truncates() {
        let mut mock = MockTransport::new();
        card_with_record(&mock);
        mock.set_page(13, [1, 2, 3, 4]);
        mock.set_page(15, [5, 6, 7, 8]);
        // page 14 missing: page 15 must not be reached
        let record = read_record(&mut mock, &PACKED).unwrap();
        assert_eq!(record.inventory.len(), 1);
        assert_eq!(record.inventory[0].page, 13);
    }

    #[test]
    fn test_name_page_failure_aborts() {
        let mut mock = MockTransport::new();
        card_with_record(&mock);
        mock.fail_read(6);
        match read_record(&mut mock, &PACKED) {
            Err(Error::IncompleteRead { page: 6 }) => {}
            other => panic!("expected IncompleteRead at page 6, got {:?}", other),
        }
    }

    #[test]
    fn test_stats_page_failure_aborts() {
        let mut mock = MockTransport::new();
        card_with_record(&mock);
        mock.fail_read(11);
        assert!(matches!(
            read_record(&mut mock, &PACKED),
            Err(Error::IncompleteRead { page: 11 })
        ));
    }

    #[test]
    fn test_undecodable_name_degrades_to_sentinel() {
        let mut mock = MockTransport::new();
        card_with_record(&mock);
        mock.set_page(4, [0xFF, 0xFE, 0xFD, 0xFC]);
        let record = read_record(&mut mock, &PACKED).unwrap();
        assert_eq!(record.name, codec::NAME_SENTINEL);
        assert_eq!(record.stats.len(), 7);
    }

    #[test]
    fn test_no_identifier_fails() {
        let mut mock = MockTransport::new();
        assert!(matches!(read_record(&mut mock, &PACKED), Err(Error::NoCard)));
    }
}
