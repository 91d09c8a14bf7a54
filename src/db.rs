//! Player-state persistence (MySQL)
//!
//! Records are upserted into `player_status` keyed by the card identifier.
//! Persistence is a side-path: failures here are logged and never propagate
//! into the success or failure of the card operation that triggered them.

use crate::config::DbConfig;
use crate::error::Result;
use mysql::prelude::Queryable;
use mysql::{params, OptsBuilder, Pool};
use serde::Serialize;

const UPSERT_SQL: &str = r"
INSERT INTO player_status (
    nfc_card_id, user_name, age, money, power, stamina, speed, technique, luck, `class`
) VALUES (
    :nfc_card_id, :user_name, :age, :money, :power, :stamina, :speed, :technique, :luck, :class
) ON DUPLICATE KEY UPDATE
    user_name = VALUES(user_name),
    age = VALUES(age),
    money = VALUES(money),
    power = VALUES(power),
    stamina = VALUES(stamina),
    speed = VALUES(speed),
    technique = VALUES(technique),
    luck = VALUES(luck),
    `class` = VALUES(`class`),
    updated_at = CURRENT_TIMESTAMP";

const SELECT_SQL: &str = r"
SELECT nfc_card_id, user_name, age, money, power, stamina, speed, technique, luck, `class`
FROM player_status WHERE nfc_card_id = ?";

/// One row of the `player_status` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRow {
    pub nfc_card_id: String,
    pub user_name: String,
    pub age: u32,
    pub money: u32,
    pub power: u32,
    pub stamina: u32,
    pub speed: u32,
    pub technique: u32,
    pub luck: u32,
    #[serde(rename = "class")]
    pub player_class: u32,
}

impl PlayerRow {
    /// Build a row from a card identifier, name, the 7 stats in field order,
    /// and the database-only age field.
    pub fn from_parts(nfc_card_id: &str, user_name: &str, stats: &[u16], age: u32) -> Self {
        let stat = |i: usize| stats.get(i).copied().unwrap_or(0) as u32;
        PlayerRow {
            nfc_card_id: nfc_card_id.to_string(),
            user_name: user_name.to_string(),
            age,
            money: stat(0),
            power: stat(1),
            stamina: stat(2),
            speed: stat(3),
            technique: stat(4),
            luck: stat(5),
            player_class: stat(6),
        }
    }
}

/// Upsert/fetch access to the `player_status` table
pub struct PlayerStore {
    pool: Pool,
}

impl PlayerStore {
    /// Open a connection pool. Fails fast when the database is unreachable;
    /// callers on the card-write path use [`persist_best_effort`] instead.
    pub fn connect(config: &DbConfig) -> Result<Self> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.clone()))
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()));
        let pool = Pool::new(opts)?;
        log::debug!(
            "Connected to database {} at {}:{}",
            config.database,
            config.host,
            config.port
        );
        Ok(PlayerStore { pool })
    }

    /// Insert or update the row for this card identifier.
    pub fn upsert(&self, row: &PlayerRow) -> Result<()> {
        let mut conn = self.pool.get_conn()?;
        conn.exec_drop(
            UPSERT_SQL,
            params! {
                "nfc_card_id" => &row.nfc_card_id,
                "user_name" => &row.user_name,
                "age" => row.age,
                "money" => row.money,
                "power" => row.power,
                "stamina" => row.stamina,
                "speed" => row.speed,
                "technique" => row.technique,
                "luck" => row.luck,
                "class" => row.player_class,
            },
        )?;
        Ok(())
    }

    /// Fetch the row for a card identifier, if one exists.
    pub fn fetch(&self, nfc_card_id: &str) -> Result<Option<PlayerRow>> {
        let mut conn = self.pool.get_conn()?;
        type Row = (String, String, u32, u32, u32, u32, u32, u32, u32, u32);
        let row: Option<Row> = conn.exec_first(SELECT_SQL, (nfc_card_id,))?;
        Ok(row.map(
            |(nfc_card_id, user_name, age, money, power, stamina, speed, technique, luck, class)| {
                PlayerRow {
                    nfc_card_id,
                    user_name,
                    age,
                    money,
                    power,
                    stamina,
                    speed,
                    technique,
                    luck,
                    player_class: class,
                }
            },
        ))
    }
}

/// Upsert a row, logging any failure instead of returning it.
pub fn persist_best_effort(config: &DbConfig, row: &PlayerRow) {
    match PlayerStore::connect(config).and_then(|store| store.upsert(row)) {
        Ok(()) => log::info!("Player state persisted for {}", row.nfc_card_id),
        Err(e) => log::warn!("Persistence failed (ignored): {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_from_parts_field_order() {
        let row = PlayerRow::from_parts("AA:BB", "Taro", &[100, 5, 6, 7, 8, 9, 1], 20);
        assert_eq!(row.money, 100);
        assert_eq!(row.power, 5);
        assert_eq!(row.stamina, 6);
        assert_eq!(row.speed, 7);
        assert_eq!(row.technique, 8);
        assert_eq!(row.luck, 9);
        assert_eq!(row.player_class, 1);
        assert_eq!(row.age, 20);
    }

    #[test]
    fn test_row_from_parts_short_stats_zero_fill() {
        let row = PlayerRow::from_parts("AA:BB", "Taro", &[100], 0);
        assert_eq!(row.money, 100);
        assert_eq!(row.player_class, 0);
    }

    #[test]
    fn test_row_json_uses_class_key() {
        let row = PlayerRow::from_parts("AA:BB", "Taro", &[1, 2, 3, 4, 5, 6, 7], 0);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["class"], 7);
        assert_eq!(json["nfc_card_id"], "AA:BB");
    }

    #[test]
    fn test_upsert_sql_is_keyed_on_card_id() {
        assert!(UPSERT_SQL.contains("ON DUPLICATE KEY UPDATE"));
        assert!(UPSERT_SQL.contains("nfc_card_id"));
    }
}
