//! Presence state machine
//!
//! Tracks whether a card is absent or present by polling the transport, and
//! emits detect/remove transitions as [`CardEvent`]s. One [`Monitor::tick`]
//! is one scheduler step: it never sleeps, it returns the delay the caller
//! should wait before the next tick. That keeps the machine unit-testable
//! with an injected transport and no real clock.
//!
//! Transition rules:
//! - `Absent` + connect success + full read success → `Present`, emit `data`
//! - `Absent` + connect failure or incomplete read → stay `Absent`, silent retry
//! - `Present` + identifier poll failure → `Absent`, emit `removed`
//! - `Present` + identifier changed (swap) → `Absent`, emit `removed`;
//!   the new card is picked up by a later fresh detection
//!
//! Transport errors never terminate the loop; they only drive transitions.

use crate::error::Error;
use crate::events::CardEvent;
use crate::layout::PageLayout;
use crate::reader;
use crate::transport::CardTransport;
use std::time::Duration;

/// Poll interval while a card is present or between detection attempts
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Backoff when no reader is enumerated at all
pub const READER_BACKOFF: Duration = Duration::from_secs(1);

/// Presence state. `Present` carries the last-seen identifier so a swapped
/// card is distinguishable from the same card answering again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Absent,
    Present { idm: Vec<u8> },
}

/// Result of one scheduler step.
pub struct Tick {
    /// Events emitted by this step, in emission order
    pub events: Vec<CardEvent>,
    /// How long the caller should wait before the next step
    pub delay: Duration,
}

impl Tick {
    fn quiet(delay: Duration) -> Self {
        Tick {
            events: Vec::new(),
            delay,
        }
    }
}

/// Card presence monitor over a single transport.
pub struct Monitor<T: CardTransport> {
    transport: T,
    layout: PageLayout,
    state: Presence,
    read_failures: u32,
}

impl<T: CardTransport> Monitor<T> {
    pub fn new(transport: T, layout: PageLayout) -> Self {
        Monitor {
            transport,
            layout,
            state: Presence::Absent,
            read_failures: 0,
        }
    }

    /// Current presence state.
    pub fn state(&self) -> &Presence {
        &self.state
    }

    /// Consecutive failed full-read attempts since the last success.
    pub fn read_failures(&self) -> u32 {
        self.read_failures
    }

    /// Perform one scheduler step.
    pub fn tick(&mut self) -> Tick {
        match self.state {
            Presence::Absent => self.tick_absent(),
            Presence::Present { .. } => self.tick_present(),
        }
    }

    /// Absent: try to open a session and read the whole card.
    fn tick_absent(&mut self) -> Tick {
        match self.transport.connect() {
            Err(Error::NoReaderFound) => {
                log::trace!("No reader enumerated");
                Tick::quiet(READER_BACKOFF)
            }
            Err(e) => {
                log::trace!("Connect failed: {}", e);
                self.transport.disconnect();
                Tick::quiet(POLL_INTERVAL)
            }
            Ok(()) => match reader::read_record(&mut self.transport, &self.layout) {
                Ok(record) => {
                    self.read_failures = 0;
                    log::info!("Card detected: {}", record.idm_hex());
                    self.state = Presence::Present {
                        idm: record.idm.clone(),
                    };
                    // Session stays open for cheap identifier polling
                    Tick {
                        events: vec![CardEvent::Data { payload: record }],
                        delay: POLL_INTERVAL,
                    }
                }
                Err(e) => {
                    self.read_failures += 1;
                    log::debug!(
                        "Full read failed ({} consecutive): {}",
                        self.read_failures,
                        e
                    );
                    self.transport.disconnect();
                    Tick::quiet(POLL_INTERVAL)
                }
            },
        }
    }

    /// Present: poll the identifier without reconnecting.
    fn tick_present(&mut self) -> Tick {
        let current = match &self.state {
            Presence::Present { idm } => idm.clone(),
            Presence::Absent => unreachable!("tick_present called while Absent"),
        };
        match self.transport.get_identifier() {
            Ok(idm) if idm == current => Tick::quiet(POLL_INTERVAL),
            Ok(_) => {
                // Some readers keep the session alive across a card swap
                log::info!("Card swapped, treating as removal");
                self.remove()
            }
            Err(_) => {
                log::info!("Card removed");
                self.remove()
            }
        }
    }

    fn remove(&mut self) -> Tick {
        self.transport.disconnect();
        self.state = Presence::Absent;
        Tick {
            events: vec![CardEvent::Removed],
            delay: POLL_INTERVAL,
        }
    }
}
