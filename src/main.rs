//! taglink - NFC player-card bridge CLI
//!
//! Three modes over one PC/SC reader:
//! - `monitor`: long-running presence loop, NDJSON events on stdout
//! - `read`: one-shot full read, single JSON object on stdout
//! - `write`: one-shot record write with a bounded wait for a card,
//!   followed by a best-effort database upsert
//!
//! Diagnostics go to stderr via the logger; stdout carries only the
//! machine-readable output the companion application consumes.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use taglink::codec;
use taglink::config::DbConfig;
use taglink::db::{self, PlayerRow, PlayerStore};
use taglink::error::{Error, Result};
use taglink::events::EventWriter;
use taglink::layout::{PageLayout, STAT_FIELDS, EXPANDED, PACKED};
use taglink::monitor::Monitor;
use taglink::reader;
use taglink::transport::{CardTransport, PcscTransport};
use taglink::writer::{self, WriteRequest};

#[derive(Parser)]
#[command(name = "taglink", version, about = "NFC player-card bridge for PC/SC readers")]
struct Cli {
    /// Page layout revision used by this deployment
    #[arg(long, value_enum, default_value = "packed", global = true)]
    layout: LayoutArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    /// Layout A: 16-byte name, one stat per page, inventory cleared on write
    Expanded,
    /// Layout B: 20-byte name, two stats per page, inventory preserved
    Packed,
}

impl LayoutArg {
    fn layout(self) -> PageLayout {
        match self {
            LayoutArg::Expanded => EXPANDED,
            LayoutArg::Packed => PACKED,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Monitor card presence and emit NDJSON events on stdout
    Monitor,
    /// Read the card once and print the record as JSON
    Read,
    /// Write a player record to the card, then upsert it into the database
    Write(WriteArgs),
    /// Look up the persisted record for a card identifier
    DbGet {
        /// Card identifier in colon-joined hex (e.g. "01:02:AB:CD")
        nfc_card_id: String,
    },
}

#[derive(Args)]
struct WriteArgs {
    /// Player name (UTF-8, truncated to the layout's name width)
    name: String,
    money: String,
    power: String,
    stamina: String,
    speed: String,
    technique: String,
    luck: String,
    class: String,
    /// Optional age, persisted to the database only (the card has no age field)
    age: Option<String>,

    /// Zero-fill the inventory region regardless of layout policy
    #[arg(long, conflicts_with = "keep_inventory")]
    clear_inventory: bool,
    /// Preserve the inventory region regardless of layout policy
    #[arg(long)]
    keep_inventory: bool,
    /// Skip the database upsert after a successful card write
    #[arg(long)]
    no_db: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let layout = cli.layout.layout();

    let result = match cli.command {
        Command::Monitor => run_monitor(layout),
        Command::Read => run_read(layout),
        Command::Write(args) => run_write(layout, args),
        Command::DbGet { nfc_card_id } => run_db_get(&nfc_card_id),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Long-running presence loop. Each tick tells us how long to sleep, so
/// the state machine itself stays free of blocking waits.
fn run_monitor(layout: PageLayout) -> Result<()> {
    let transport = PcscTransport::new()?;
    let mut monitor = Monitor::new(transport, layout);

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let stdout = std::io::stdout();
    let mut events = EventWriter::new(stdout.lock());

    log::info!("Monitoring card presence ({} layout)", layout.name);
    while running.load(Ordering::Relaxed) {
        let tick = monitor.tick();
        for event in &tick.events {
            events.emit(event)?;
        }
        std::thread::sleep(tick.delay);
    }

    log::info!("Monitor stopped");
    Ok(())
}

/// One-shot read: record JSON on success, `{"error": …}` on failure, both
/// on stdout so the caller always gets a parseable line.
fn run_read(layout: PageLayout) -> Result<()> {
    match read_once(layout) {
        Ok(record) => {
            println!("{}", serde_json::to_string(&record)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::json!({ "error": e.to_string() }));
            Err(e)
        }
    }
}

fn read_once(layout: PageLayout) -> Result<taglink::TagRecord> {
    let mut transport = PcscTransport::new()?;
    transport.connect()?;
    let result = reader::read_record(&mut transport, &layout);
    transport.disconnect();
    result
}

fn run_write(layout: PageLayout, args: WriteArgs) -> Result<()> {
    let request = WriteRequest {
        name: args.name.clone(),
        stats: parse_stats(&args)?,
    };
    let age = match &args.age {
        Some(raw) => {
            let value = parse_field("age", raw)?;
            u32::try_from(value).map_err(|_| Error::Validation {
                field: "age",
                reason: format!("{} out of range", value),
            })?
        }
        None => 0,
    };
    // Reject bad input before any hardware I/O
    writer::validate(&request)?;

    let mut transport = PcscTransport::new()?;
    log::info!(
        "Waiting for card (up to {}s)...",
        writer::WRITE_TIMEOUT.as_secs()
    );
    writer::wait_for_card(&mut transport, writer::WRITE_TIMEOUT, std::thread::sleep)?;

    let clear_inventory = if args.clear_inventory {
        true
    } else if args.keep_inventory {
        false
    } else {
        layout.clear_inventory_on_write
    };

    let result = writer::write_record(&mut transport, &layout, &request, clear_inventory);
    transport.disconnect();
    let idm = result?;

    println!("Card write complete");

    if args.no_db {
        return Ok(());
    }
    match idm {
        Some(idm) => {
            let stats: Vec<u16> = request.stats.iter().map(|&v| v as u16).collect();
            let row = PlayerRow::from_parts(&codec::hex_colon(&idm), &request.name, &stats, age);
            db::persist_best_effort(&DbConfig::from_env(), &row);
        }
        None => log::warn!("Identifier unavailable, skipping database upsert"),
    }
    Ok(())
}

fn run_db_get(nfc_card_id: &str) -> Result<()> {
    let store = PlayerStore::connect(&DbConfig::from_env())?;
    let output = match store.fetch(nfc_card_id)? {
        Some(row) => serde_json::json!({ "found": true, "data": row }),
        None => serde_json::json!({ "found": false, "message": "Data not found in database" }),
    };
    println!("{}", output);
    Ok(())
}

/// Parse the 7 positional stat arguments, naming the offending field on
/// the first non-integer value.
fn parse_stats(args: &WriteArgs) -> Result<Vec<i64>> {
    let raw = [
        &args.money,
        &args.power,
        &args.stamina,
        &args.speed,
        &args.technique,
        &args.luck,
        &args.class,
    ];
    STAT_FIELDS
        .iter()
        .zip(raw)
        .map(|(&field, value)| parse_field(field, value))
        .collect()
}

fn parse_field(field: &'static str, raw: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| Error::Validation {
        field,
        reason: format!("'{}' is not an integer", raw),
    })
}
