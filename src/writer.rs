//! Full record write onto a present card
//!
//! Validation happens entirely before any hardware I/O. Page writes abort
//! on the first failure, reporting which page failed; pages already written
//! are left as-is (no rollback), so a failed write leaves the card in a
//! mixed state the next successful write repairs.

use crate::codec;
use crate::error::{Error, Result};
use crate::layout::{PageLayout, STAT_COUNT, STAT_FIELDS};
use crate::transport::CardTransport;
use std::time::Duration;

/// Bounded wait for a card before a write gives up
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect poll interval during the wait
pub const CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A validated-shape write request: the name and the 7 stat values in
/// [`STAT_FIELDS`] order. Values are `i64` so range violations can be
/// reported with the offending value instead of failing at parse time.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub name: String,
    pub stats: Vec<i64>,
}

/// Check field count and every stat's range before touching the transport.
///
/// The first invalid field wins and is named in the error.
pub fn validate(request: &WriteRequest) -> Result<()> {
    if request.stats.len() != STAT_COUNT {
        return Err(Error::Validation {
            field: "stats",
            reason: format!(
                "expected {} values, got {}",
                STAT_COUNT,
                request.stats.len()
            ),
        });
    }
    for (field, &value) in STAT_FIELDS.iter().zip(&request.stats) {
        if !(0..=65535).contains(&value) {
            return Err(Error::Validation {
                field,
                reason: format!("{} out of range (0-65535)", value),
            });
        }
    }
    Ok(())
}

/// Poll `connect()` until a card answers or `timeout` elapses.
///
/// The sleep is injected so tests run without a clock; the binary passes
/// `std::thread::sleep`.
pub fn wait_for_card<T: CardTransport>(
    transport: &mut T,
    timeout: Duration,
    mut sleep: impl FnMut(Duration),
) -> Result<()> {
    let attempts = (timeout.as_millis() / CONNECT_POLL_INTERVAL.as_millis()).max(1);
    for _ in 0..attempts {
        match transport.connect() {
            Ok(()) => return Ok(()),
            Err(e) => {
                log::debug!("Waiting for card: {}", e);
                transport.disconnect();
            }
        }
        sleep(CONNECT_POLL_INTERVAL);
    }
    Err(Error::Timeout)
}

/// Write a full record over an open session.
///
/// Order: name pages, stat pages (per the layout's packing), then the
/// inventory clear when `clear_inventory` is set. On success the card
/// identifier is read back for the persistence side-path; that read-back
/// is best-effort and its failure does not fail the write.
pub fn write_record<T: CardTransport>(
    transport: &mut T,
    layout: &PageLayout,
    request: &WriteRequest,
    clear_inventory: bool,
) -> Result<Option<Vec<u8>>> {
    validate(request)?;

    let name_bytes = codec::encode_name(&request.name, layout.name_width());
    for (chunk, page) in name_bytes.chunks(4).zip(layout.name_page_range()) {
        transport.write_page(page, codec::page_payload(chunk)?)?;
    }
    log::info!("Name written ({} pages)", layout.name_pages);

    let values: Vec<u16> = request.stats.iter().map(|&v| v as u16).collect();
    for (payload, page) in layout
        .encode_stats(&values)
        .into_iter()
        .zip(layout.stats_page_range())
    {
        transport.write_page(page, payload)?;
    }
    log::info!("Stats written ({} pages)", layout.stats_pages);

    if clear_inventory {
        for page in layout.inventory_page_range() {
            transport.write_page(page, [0u8; 4])?;
        }
        log::info!("Inventory region cleared");
    } else {
        log::debug!("Inventory region preserved");
    }

    let idm = transport.get_identifier().ok();
    if idm.is_none() {
        log::warn!("Identifier read-back failed after write");
    }
    Ok(idm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{EXPANDED, PACKED};
    use crate::reader;
    use crate::transport::MockTransport;

    fn request(stats: &[i64]) -> WriteRequest {
        WriteRequest {
            name: "Taro".to_string(),
            stats: stats.to_vec(),
        }
    }

    #[test]
    fn test_out_of_range_stat_rejected_before_io() {
        let mut mock = MockTransport::new();
        let result = write_record(
            &mut mock,
            &PACKED,
            &request(&[100, 70000, 5, 5, 5, 5, 1]),
            false,
        );
        match result {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "power"),
            other => panic!("expected Validation, got {:?}", other),
        }
        assert!(mock.writes().is_empty(), "no page may be written");
    }

    #[test]
    fn test_wrong_field_count_rejected() {
        assert!(matches!(
            validate(&request(&[1, 2, 3])),
            Err(Error::Validation { field: "stats", .. })
        ));
    }

    #[test]
    fn test_negative_stat_rejected() {
        match validate(&request(&[1, 2, 3, -4, 5, 6, 7])) {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "speed"),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_packed_write_page_sequence() {
        let mut mock = MockTransport::new();
        mock.set_identifier(&[0xAA, 0xBB, 0xCC, 0xDD]);
        let idm = write_record(&mut mock, &PACKED, &request(&[100, 5, 5, 5, 5, 5, 1]), false)
            .unwrap();
        assert_eq!(idm, Some(vec![0xAA, 0xBB, 0xCC, 0xDD]));

        let writes = mock.writes();
        let pages: Vec<u8> = writes.iter().map(|(p, _)| *p).collect();
        // 5 name pages then 4 stat pages, nothing else
        assert_eq!(pages, vec![4, 5, 6, 7, 8, 9, 10, 11, 12]);
        // money and power share page 9
        assert_eq!(writes[5], (9, [100, 0, 5, 0]));
        // class alone in page 12, upper half zero
        assert_eq!(writes[8], (12, [1, 0, 0, 0]));
    }

    #[test]
    fn test_expanded_clears_inventory() {
        let mut mock = MockTransport::new();
        mock.set_identifier(&[1, 2, 3, 4]);
        write_record(
            &mut mock,
            &EXPANDED,
            &request(&[1, 2, 3, 4, 5, 6, 7]),
            EXPANDED.clear_inventory_on_write,
        )
        .unwrap();
        // 4 name + 7 stats + 25 inventory pages (15..=39)
        assert_eq!(mock.writes().len(), 4 + 7 + 25);
        assert_eq!(mock.page(39), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_write_aborts_on_first_page_failure() {
        let mut mock = MockTransport::new();
        mock.fail_write(10);
        let result = write_record(&mut mock, &PACKED, &request(&[100, 5, 5, 5, 5, 5, 1]), false);
        assert!(matches!(result, Err(Error::PageWrite { page: 10 })));
        // Name pages and the first stat page were written, nothing after
        let pages: Vec<u8> = mock.writes().iter().map(|(p, _)| *p).collect();
        assert_eq!(pages, vec![4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_write_then_read_back_round_trip() {
        let mut mock = MockTransport::new();
        mock.set_identifier(&[0x01, 0x02, 0x03, 0x04]);
        write_record(&mut mock, &PACKED, &request(&[100, 5, 5, 5, 5, 5, 1]), false).unwrap();

        let record = reader::read_record(&mut mock, &PACKED).unwrap();
        assert_eq!(record.name, "Taro");
        assert_eq!(record.stats, vec![100, 5, 5, 5, 5, 5, 1]);
    }

    #[test]
    fn test_wait_for_card_times_out() {
        use crate::transport::ConnectOutcome;
        let mock = MockTransport::new();
        let outcomes = vec![ConnectOutcome::NoCard; 30];
        mock.script_connect(&outcomes);
        let mut transport = mock.clone();

        let mut slept = Duration::ZERO;
        let result = wait_for_card(&mut transport, WRITE_TIMEOUT, |d| slept += d);
        assert!(matches!(result, Err(Error::Timeout)));
        assert_eq!(slept, WRITE_TIMEOUT); // 25 polls x 200ms
    }

    #[test]
    fn test_wait_for_card_returns_on_connect() {
        use crate::transport::ConnectOutcome;
        let mock = MockTransport::new();
        mock.script_connect(&[ConnectOutcome::NoCard, ConnectOutcome::Ok]);
        let mut transport = mock.clone();

        let mut polls = 0;
        wait_for_card(&mut transport, WRITE_TIMEOUT, |_| polls += 1).unwrap();
        assert_eq!(polls, 1);
    }
}
