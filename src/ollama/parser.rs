//! Incremental line decoder for NDJSON streaming responses
//!
//! The daemon writes one JSON object per line, but network chunks do not
//! respect line boundaries. The decoder buffers bytes until a newline
//! arrives and hands back complete lines only.
//! - Buffer: 1MB maximum for a single line, however it was chunked
//! - Splitting happens on raw bytes, so multi-byte UTF-8 sequences that
//!   straddle a chunk boundary are reassembled before decoding

use crate::errors::{LlmError, Result};

/// Maximum size of a single buffered line (1MB)
pub const MAX_LINE_SIZE: usize = 1_048_576;

/// Incremental NDJSON line decoder
#[derive(Debug)]
pub struct LineDecoder {
    /// Bytes received since the last newline
    buffer: Vec<u8>,

    /// Maximum size of a single line
    max_line_size: usize,
}

impl LineDecoder {
    /// Create new decoder with default settings
    pub fn new() -> Self {
        Self::with_capacity(MAX_LINE_SIZE)
    }

    /// Create decoder with custom line size limit
    pub fn with_capacity(max_line_size: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            max_line_size,
        }
    }

    /// Add bytes and return every line they complete
    ///
    /// Blank lines are dropped and a trailing `\r` is stripped. Bytes after
    /// the last newline stay buffered for the next call.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            if pos > self.max_line_size {
                return Err(self.overflow(pos));
            }
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(line) = decode_line(&raw[..pos])? {
                lines.push(line);
            }
        }

        if self.buffer.len() > self.max_line_size {
            return Err(self.overflow(self.buffer.len()));
        }

        Ok(lines)
    }

    /// Drop everything buffered and report an over-long line
    fn overflow(&mut self, size: usize) -> LlmError {
        self.buffer.clear();
        LlmError::JsonParseError(format!(
            "Buffer overflow: line of {} bytes exceeds maximum {}",
            size, self.max_line_size
        ))
    }

    /// Flush the unterminated tail once the body has ended
    pub fn finish(&mut self) -> Result<Option<String>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let raw = std::mem::take(&mut self.buffer);
        decode_line(&raw)
    }

    /// Get current buffer size
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_line(raw: &[u8]) -> Result<Option<String>> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = std::str::from_utf8(raw)
        .map_err(|e| LlmError::JsonParseError(format!("UTF-8 decode error: {}", e)))?;
    let line = line.trim();
    if line.is_empty() {
        Ok(None)
    } else {
        Ok(Some(line.to_string()))
    }
}
