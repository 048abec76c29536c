//! Replayable byte source.
//!
//! Format sniffing has to consume the first bytes of a stream before the
//! format is known, and the chosen parser needs those same bytes again.
//! `ReplayReader` keeps every byte it pulls for indexed reads (`read_at`) in a
//! retained prefix, so they can be served again without touching the
//! underlying stream. Past that prefix it also acts as a plain forward-only
//! `Read`, passing bytes through without retaining them.

use std::cmp;
use std::io::{self, ErrorKind, Read};

/// Carried inside an `io::Error` when a read would go past `Limits::max_scan_bytes`.
#[derive(Debug, thiserror::Error)]
#[error("scan limit of {0} bytes reached")]
pub struct ScanLimitReached(pub u64);

pub struct ReplayReader<'a, R> {
    inner: R,
    prefix: &'a mut Vec<u8>,
    // bytes pulled from `inner` so far; equals `prefix.len()` until the first
    // pass-through read
    consumed: u64,
    cursor: u64,
    max_scan_bytes: Option<u64>,
}

impl<'a, R: Read> ReplayReader<'a, R> {
    /// Wraps `inner`, using `prefix` as storage for retained bytes. The buffer
    /// is cleared but keeps its capacity.
    pub fn new(inner: R, prefix: &'a mut Vec<u8>) -> ReplayReader<'a, R> {
        prefix.clear();
        ReplayReader {
            inner,
            prefix,
            consumed: 0,
            cursor: 0,
            max_scan_bytes: None,
        }
    }

    pub fn with_max_scan_bytes(mut self, max: Option<u64>) -> ReplayReader<'a, R> {
        self.max_scan_bytes = max;
        self
    }

    /// Fills `buf` with the bytes at `offset`.
    ///
    /// The range may lie inside the retained prefix, or start inside or right
    /// at its end as long as no pass-through read happened yet; the missing
    /// tail is then read from the stream and retained. Reads that would skip
    /// over unread bytes fail with `ErrorKind::InvalidInput`.
    pub fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        let retained = self.prefix.len() as u64;
        let end = offset + buf.len() as u64;
        if end > retained {
            if offset > retained || self.consumed != retained {
                return Err(io::Error::new(
                    ErrorKind::InvalidInput,
                    format!(
                        "cannot replay {} bytes at offset {}: {} bytes retained, {} consumed",
                        buf.len(),
                        offset,
                        retained,
                        self.consumed
                    ),
                ));
            }
            self.fill_prefix(end as usize)?;
        }
        let start = offset as usize;
        buf.copy_from_slice(&self.prefix[start..start + buf.len()]);
        Ok(())
    }

    /// Moves the sequential read position forward to `offset`, discarding the
    /// bytes in between.
    pub fn skip_to(&mut self, offset: u64) -> io::Result<()> {
        if offset < self.cursor {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("cannot move back from offset {} to {}", self.cursor, offset),
            ));
        }
        let n = offset - self.cursor;
        let skipped = io::copy(&mut self.by_ref().take(n), &mut io::sink())?;
        if skipped != n {
            return Err(ErrorKind::UnexpectedEof.into());
        }
        Ok(())
    }

    /// Current position of sequential (`Read`) access.
    #[inline]
    pub fn position(&self) -> u64 {
        self.cursor
    }

    #[inline]
    pub fn retained(&self) -> &[u8] {
        &self.prefix[..]
    }

    fn fill_prefix(&mut self, end: usize) -> io::Result<()> {
        let mut filled = self.prefix.len();
        self.prefix.resize(end, 0);
        while filled < end {
            let result = pull(
                &mut self.inner,
                &mut self.consumed,
                self.max_scan_bytes,
                &mut self.prefix[filled..end],
            );
            match result {
                Ok(0) => {
                    self.prefix.truncate(filled);
                    return Err(ErrorKind::UnexpectedEof.into());
                }
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.prefix.truncate(filled);
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

impl<'a, R: Read> Read for ReplayReader<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let retained = self.prefix.len() as u64;
        if self.cursor < retained {
            let start = self.cursor as usize;
            let n = cmp::min(buf.len(), (retained - self.cursor) as usize);
            buf[..n].copy_from_slice(&self.prefix[start..start + n]);
            self.cursor += n as u64;
            return Ok(n);
        }
        debug_assert_eq!(self.cursor, self.consumed);
        let n = pull(&mut self.inner, &mut self.consumed, self.max_scan_bytes, buf)?;
        self.cursor += n as u64;
        Ok(n)
    }
}

// Reads from the underlying stream, never going past the scan limit.
fn pull<R: Read>(inner: &mut R, consumed: &mut u64, max: Option<u64>, buf: &mut [u8]) -> io::Result<usize> {
    if buf.is_empty() {
        return Ok(0);
    }
    let len = match max {
        Some(max) => {
            let remaining = max.saturating_sub(*consumed);
            if remaining == 0 {
                return Err(io::Error::other(ScanLimitReached(max)));
            }
            cmp::min(buf.len() as u64, remaining) as usize
        }
        None => buf.len(),
    };
    let n = inner.read(&mut buf[..len])?;
    *consumed += n as u64;
    Ok(n)
}
