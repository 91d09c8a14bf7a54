//! Mock transport for testing
//!
//! Scriptable stand-in for a reader: connect and identifier outcomes are
//! queued per tick, pages live in an in-memory store with per-page failure
//! injection, and every write is logged for assertions. Clones share state
//! so tests keep a handle while the monitor or writer owns the transport.

use super::CardTransport;
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Scripted result of a single connect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Session opens
    Ok,
    /// No reader enumerated at all
    NoReader,
    /// Reader present, no card answers
    NoCard,
}

/// Mock transport for unit testing
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    connect_script: VecDeque<ConnectOutcome>,
    identifier_script: VecDeque<Option<Vec<u8>>>,
    identifier: Option<Vec<u8>>,
    pages: HashMap<u8, [u8; 4]>,
    failing_reads: HashSet<u8>,
    failing_writes: HashSet<u8>,
    writes: Vec<(u8, [u8; 4])>,
    disconnects: usize,
}

impl MockTransport {
    /// Create a mock with no card data; connect succeeds by default.
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(Inner {
                connect_script: VecDeque::new(),
                identifier_script: VecDeque::new(),
                identifier: None,
                pages: HashMap::new(),
                failing_reads: HashSet::new(),
                failing_writes: HashSet::new(),
                writes: Vec::new(),
                disconnects: 0,
            })),
        }
    }

    /// Queue connect outcomes, consumed in order; once the queue is empty
    /// connect falls back to `Ok`.
    pub fn script_connect(&self, outcomes: &[ConnectOutcome]) {
        let mut inner = self.inner.lock().unwrap();
        inner.connect_script.extend(outcomes.iter().copied());
    }

    /// Queue identifier poll results (`None` = poll failure); once empty,
    /// polls return the default identifier.
    pub fn script_identifier(&self, results: &[Option<Vec<u8>>]) {
        let mut inner = self.inner.lock().unwrap();
        inner.identifier_script.extend(results.iter().cloned());
    }

    /// Set the default identifier returned when no script entry is queued.
    pub fn set_identifier(&self, idm: &[u8]) {
        self.inner.lock().unwrap().identifier = Some(idm.to_vec());
    }

    /// Store page contents.
    pub fn set_page(&self, page: u8, data: [u8; 4]) {
        self.inner.lock().unwrap().pages.insert(page, data);
    }

    /// Make reads of a page fail from now on.
    pub fn fail_read(&self, page: u8) {
        self.inner.lock().unwrap().failing_reads.insert(page);
    }

    /// Make writes to a page fail.
    pub fn fail_write(&self, page: u8) {
        self.inner.lock().unwrap().failing_writes.insert(page);
    }

    /// All successful writes, in order.
    pub fn writes(&self) -> Vec<(u8, [u8; 4])> {
        self.inner.lock().unwrap().writes.clone()
    }

    /// Current contents of a page (after any writes).
    pub fn page(&self, page: u8) -> Option<[u8; 4]> {
        self.inner.lock().unwrap().pages.get(&page).copied()
    }

    /// Number of disconnect calls so far.
    pub fn disconnects(&self) -> usize {
        self.inner.lock().unwrap().disconnects
    }
}

impl CardTransport for MockTransport {
    fn connect(&mut self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        match inner.connect_script.pop_front().unwrap_or(ConnectOutcome::Ok) {
            ConnectOutcome::Ok => Ok(()),
            ConnectOutcome::NoReader => Err(Error::NoReaderFound),
            ConnectOutcome::NoCard => Err(Error::NoCard),
        }
    }

    fn disconnect(&mut self) {
        self.inner.lock().unwrap().disconnects += 1;
    }

    fn get_identifier(&mut self) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(scripted) = inner.identifier_script.pop_front() {
            return scripted.ok_or(Error::NoCard);
        }
        inner.identifier.clone().ok_or(Error::NoCard)
    }

    fn read_page(&mut self, page: u8) -> Result<[u8; 4]> {
        let inner = self.inner.lock().unwrap();
        if inner.failing_reads.contains(&page) {
            return Err(Error::PageRead { page });
        }
        inner
            .pages
            .get(&page)
            .copied()
            .ok_or(Error::PageRead { page })
    }

    fn write_page(&mut self, page: u8, data: [u8; 4]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing_writes.contains(&page) {
            return Err(Error::PageWrite { page });
        }
        inner.pages.insert(page, data);
        inner.writes.push((page, data));
        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
