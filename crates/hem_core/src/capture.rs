//! Capture files: a recorded stream of event records.
//!
//! Each record is stored as `[event code u8][payload size u16 LE][payload]`.
//! Transport failures are not representable and are never written.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::decoder::{EventRecord, MSG_BUFFER_SIZE};
use crate::error::{CaptureError, DecodeError};

const HEADER_SIZE: usize = 3;

pub struct CaptureWriter<W: Write> {
    inner: W,
    written: u64,
}

impl CaptureWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> CaptureWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Append a record. Returns false for failed receipts, which are skipped.
    pub fn write_record(&mut self, record: &EventRecord) -> Result<bool, CaptureError> {
        if !record.success() {
            return Ok(false);
        }
        let payload = record.payload();
        // payload() is clamped to MSG_BUFFER_SIZE, which fits in u16
        let size = payload.len() as u16;
        self.inner.write_all(&[record.event_code()])?;
        self.inner.write_all(&size.to_le_bytes())?;
        self.inner.write_all(payload)?;
        self.written += 1;
        Ok(true)
    }

    pub fn records_written(&self) -> u64 {
        self.written
    }

    pub fn finish(mut self) -> Result<W, CaptureError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

pub struct CaptureReader<R: Read> {
    inner: R,
    offset: u64,
    done: bool,
}

impl CaptureReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> CaptureReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0, done: false }
    }

    /// Byte offset of the next record.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn read_record(&mut self) -> Result<Option<EventRecord>, CaptureError> {
        let start = self.offset;

        let mut header = [0u8; HEADER_SIZE];
        let got = read_full(&mut self.inner, &mut header)?;
        if got == 0 {
            return Ok(None);
        }
        if got < HEADER_SIZE {
            return Err(CaptureError::Truncated { offset: start, needed: HEADER_SIZE - got });
        }

        let code = header[0];
        let size = usize::from(u16::from_le_bytes([header[1], header[2]]));
        if size > MSG_BUFFER_SIZE {
            return Err(DecodeError::PayloadTooLarge { size, capacity: MSG_BUFFER_SIZE }.into());
        }

        let mut payload = [0u8; MSG_BUFFER_SIZE];
        let got = read_full(&mut self.inner, &mut payload[..size])?;
        if got < size {
            return Err(CaptureError::Truncated { offset: start, needed: size - got });
        }

        self.offset += (HEADER_SIZE + size) as u64;
        Ok(Some(EventRecord::from_parts(true, code, size, payload)))
    }
}

impl<R: Read> Iterator for CaptureReader<R> {
    type Item = Result<EventRecord, CaptureError>;

    /// Stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Read until `buf` is full or the stream ends.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
