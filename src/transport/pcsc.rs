//! PC/SC transport implementation
//!
//! Talks to the first enumerated PC/SC reader with the fixed APDU shapes
//! the card understands: GET DATA for the identifier, READ BINARY and
//! UPDATE BINARY for 4-byte pages. Success is always status word 90 00.

use super::CardTransport;
use crate::error::{Error, Result};
use pcsc::{Card, Context, Disposition, Protocols, Scope, ShareMode, MAX_BUFFER_SIZE};
use std::ffi::CString;

/// GET DATA command for the card identifier (IDm/UID)
const CMD_GET_IDENTIFIER: [u8; 5] = [0xFF, 0xCA, 0x00, 0x00, 0x00];

/// Status word indicating success
const STATUS_OK: [u8; 2] = [0x90, 0x00];

/// PC/SC transport for a single attached reader
pub struct PcscTransport {
    ctx: Context,
    card: Option<Card>,
}

impl PcscTransport {
    /// Establish a PC/SC context. No reader needs to be attached yet;
    /// enumeration happens on every [`CardTransport::connect`].
    pub fn new() -> Result<Self> {
        let ctx = Context::establish(Scope::User)?;
        log::debug!("PC/SC context established");
        Ok(PcscTransport { ctx, card: None })
    }

    /// Name of the first enumerated reader.
    fn first_reader(&self) -> Result<CString> {
        let len = self.ctx.list_readers_len().map_err(map_reader_err)?;
        let mut buf = vec![0u8; len];
        let mut names = self.ctx.list_readers(&mut buf).map_err(map_reader_err)?;
        match names.next() {
            Some(name) => Ok(name.to_owned()),
            None => Err(Error::NoReaderFound),
        }
    }

    /// Transmit an APDU over the current session, check the status word,
    /// and return the response payload without it.
    fn transmit(&mut self, apdu: &[u8]) -> Result<Vec<u8>> {
        let card = self.card.as_ref().ok_or(Error::NoCard)?;
        let mut rbuf = [0u8; MAX_BUFFER_SIZE];
        let response = card.transmit(apdu, &mut rbuf)?;
        if response.len() < 2 {
            return Err(Error::NoCard);
        }
        let (data, status) = response.split_at(response.len() - 2);
        if status != STATUS_OK {
            log::debug!(
                "Non-OK status word: SW1={:02X} SW2={:02X}",
                status[0],
                status[1]
            );
            return Err(Error::NoCard);
        }
        Ok(data.to_vec())
    }
}

impl CardTransport for PcscTransport {
    fn connect(&mut self) -> Result<()> {
        if self.card.is_some() {
            return Ok(());
        }
        let reader = self.first_reader()?;
        match self.ctx.connect(&reader, ShareMode::Shared, Protocols::ANY) {
            Ok(card) => {
                log::debug!("Connected to reader {:?}", reader);
                self.card = Some(card);
                Ok(())
            }
            Err(pcsc::Error::NoSmartcard) | Err(pcsc::Error::RemovedCard) => Err(Error::NoCard),
            Err(pcsc::Error::NoReadersAvailable)
            | Err(pcsc::Error::ReaderUnavailable)
            | Err(pcsc::Error::UnknownReader) => Err(Error::NoReaderFound),
            Err(e) => Err(e.into()),
        }
    }

    fn disconnect(&mut self) {
        if let Some(card) = self.card.take() {
            if let Err((_, e)) = card.disconnect(Disposition::LeaveCard) {
                // Session is gone either way; the next connect starts fresh
                log::debug!("Disconnect error ignored: {}", e);
            }
        }
    }

    fn get_identifier(&mut self) -> Result<Vec<u8>> {
        match self.transmit(&CMD_GET_IDENTIFIER) {
            Ok(idm) if !idm.is_empty() => Ok(idm),
            _ => Err(Error::NoCard),
        }
    }

    fn read_page(&mut self, page: u8) -> Result<[u8; 4]> {
        // READ BINARY: [Class, INS, P1, P2, Le]
        let apdu = [0xFF, 0xB0, 0x00, page, 0x04];
        let data = self.transmit(&apdu).map_err(|_| Error::PageRead { page })?;
        data.try_into().map_err(|_| Error::PageRead { page })
    }

    fn write_page(&mut self, page: u8, data: [u8; 4]) -> Result<()> {
        // UPDATE BINARY: [Class, INS, P1, P2, Lc, data...]
        let apdu = [
            0xFF, 0xD6, 0x00, page, 0x04, data[0], data[1], data[2], data[3],
        ];
        self.transmit(&apdu)
            .map(|_| ())
            .map_err(|_| Error::PageWrite { page })
    }
}

fn map_reader_err(e: pcsc::Error) -> Error {
    match e {
        pcsc::Error::NoReadersAvailable => Error::NoReaderFound,
        other => other.into(),
    }
}

impl Drop for PcscTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}
