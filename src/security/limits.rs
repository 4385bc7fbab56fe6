//! Request body size limits.
//!
//! # Responsibilities
//! - Enforce the maximum JSON body size while the body is being read
//! - Track how far into the body the decoder has progressed
//!
//! # Design Decisions
//! - The cap is a cumulative byte count checked on every read, not a timeout
//! - Reading exactly `limit` bytes is allowed; the first byte past it fails
//! - Once tripped, every later read fails with the same error

use std::io::{self, Read};
use thiserror::Error;

/// Default ceiling for JSON bodies when none is configured (1 MiB).
pub const DEFAULT_MAX_JSON_SIZE: usize = 1024 * 1024;

/// Raised through `io::Error` when a body runs past its ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request body too large (limit {limit} bytes)")]
pub struct BodyTooLarge {
    pub limit: usize,
}

/// A reader that refuses to hand out more than `limit` bytes.
///
/// Besides the cap it keeps two counters the JSON decoder relies on when
/// explaining a failure: the number of bytes consumed so far (the error
/// offset) and whether anything other than JSON whitespace was seen (an
/// empty body versus a truncated one).
#[derive(Debug)]
pub struct LimitedReader<R> {
    inner: R,
    limit: usize,
    consumed: usize,
    significant: usize,
    exceeded: bool,
}

impl<R: Read> LimitedReader<R> {
    pub fn new(inner: R, limit: usize) -> Self {
        Self {
            inner,
            limit,
            consumed: 0,
            significant: 0,
            exceeded: false,
        }
    }

    /// The configured ceiling in bytes.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes handed to the caller so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// True while only JSON whitespace (or nothing) has been read.
    pub fn is_blank(&self) -> bool {
        self.significant == 0
    }

    /// True once a byte beyond the ceiling was observed.
    pub fn exceeded(&self) -> bool {
        self.exceeded
    }

    fn too_large(&self) -> io::Error {
        io::Error::other(BodyTooLarge { limit: self.limit })
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.exceeded {
            return Err(self.too_large());
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let remaining = self.limit.saturating_sub(self.consumed);
        if remaining == 0 {
            // At the ceiling: a body ending here is fine, one more byte is not.
            let mut extra = [0u8; 1];
            return match self.inner.read(&mut extra)? {
                0 => Ok(0),
                _ => {
                    self.exceeded = true;
                    tracing::debug!(limit = self.limit, "Body exceeded size limit");
                    Err(self.too_large())
                }
            };
        }

        let max = buf.len().min(remaining);
        let n = self.inner.read(&mut buf[..max])?;
        self.significant += buf[..n].iter().filter(|b| !is_json_whitespace(**b)).count();
        self.consumed += n;
        Ok(n)
    }
}

fn is_json_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}
