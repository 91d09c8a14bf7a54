//! Structured card record
//!
//! [`TagRecord`] is the fixed-shape result of a full card read. It is
//! constructed fresh on every read; nothing is cached across polls.

use crate::codec;
use serde::{Serialize, Serializer};

/// One raw inventory block: a page index and its 4 bytes, carried opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventorySlot {
    /// Page index the block was read from
    pub page: u8,
    /// Raw page bytes, serialized as uppercase spaced hex ("0A 1B 2C 3D")
    #[serde(serialize_with = "ser_hex_spaced")]
    pub data: [u8; 4],
}

/// Full player-state record read from a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    /// Card-assigned identifier (4-8 bytes), serialized as colon-joined hex
    #[serde(serialize_with = "ser_hex_colon")]
    pub idm: Vec<u8>,
    /// Player name (may be the decode sentinel)
    pub name: String,
    /// The 7 stat values: money, power, stamina, speed, technique, luck, class
    #[serde(rename = "status")]
    pub stats: Vec<u16>,
    /// Inventory blocks actually present on the card (possibly empty)
    pub inventory: Vec<InventorySlot>,
}

impl TagRecord {
    /// Identifier in its canonical colon-joined hex form (the database key).
    pub fn idm_hex(&self) -> String {
        codec::hex_colon(&self.idm)
    }
}

fn ser_hex_colon<S: Serializer>(bytes: &Vec<u8>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&codec::hex_colon(bytes))
}

fn ser_hex_spaced<S: Serializer>(bytes: &[u8; 4], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&codec::hex_spaced(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let record = TagRecord {
            idm: vec![0x01, 0x02, 0xAB, 0xCD],
            name: "Taro".to_string(),
            stats: vec![100, 5, 5, 5, 5, 5, 1],
            inventory: vec![InventorySlot {
                page: 13,
                data: [0x00, 0x11, 0x22, 0x33],
            }],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["idm"], "01:02:AB:CD");
        assert_eq!(json["name"], "Taro");
        assert_eq!(json["status"][0], 100);
        assert_eq!(json["status"][6], 1);
        assert_eq!(json["inventory"][0]["page"], 13);
        assert_eq!(json["inventory"][0]["data"], "00 11 22 33");
    }
}
