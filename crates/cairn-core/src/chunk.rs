//! Payload chunking: size-bounded splitting that never cuts a UTF-8
//! character in half, and reassembly of downloaded parts.
//!
//! `split` partitions the payload into consecutive byte ranges, so
//! concatenating the chunks in index order always reproduces the
//! original payload exactly, whatever the chunk size.

use bytes::Bytes;

/// One contiguous piece of a payload.
///
/// `index` is the chunk's position in the split sequence, starting at
/// zero. Indices are dense: a payload split into `n` chunks uses
/// indices `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: u32,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    #[error("max chunk size must be at least 1 byte")]
    InvalidChunkSize,
}

/// Split `payload` into chunks of at most `max_chunk_bytes` bytes.
///
/// When a cut would land in the middle of a multi-byte UTF-8 character,
/// the boundary moves back to the start of that character, so the chunk
/// comes out slightly short and the next chunk begins on a character
/// boundary. The one exception is a single encoded character wider than
/// `max_chunk_bytes` itself, which is emitted whole rather than torn.
///
/// An empty payload yields no chunks.
pub fn split(payload: &[u8], max_chunk_bytes: usize) -> Result<Vec<Chunk>, ChunkError> {
    if max_chunk_bytes == 0 {
        return Err(ChunkError::InvalidChunkSize);
    }

    let mut chunks = Vec::with_capacity(payload.len().div_ceil(max_chunk_bytes));
    let mut start = 0;
    let mut index = 0u32;
    while start < payload.len() {
        let mut end = (start + max_chunk_bytes).min(payload.len());
        // Pull the cut back until the next chunk would start on a
        // character boundary.
        while end < payload.len() && end > start && is_continuation(payload[end]) {
            end -= 1;
        }
        if end == start {
            // The character at `start` alone is wider than the budget.
            // Take it whole; tearing it would corrupt both chunks.
            end = start + 1;
            while end < payload.len() && is_continuation(payload[end]) {
                end += 1;
            }
        }
        chunks.push(Chunk {
            index,
            data: Bytes::copy_from_slice(&payload[start..end]),
        });
        index += 1;
        start = end;
    }
    Ok(chunks)
}

/// Concatenate downloaded parts back into one payload.
///
/// Parts must be supplied in index order; the result is their exact
/// byte concatenation.
pub fn reassemble<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> Vec<u8> {
    let mut payload = Vec::new();
    for part in parts {
        payload.extend_from_slice(part);
    }
    payload
}

fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

// ── Tests ──────────────────────────────────────────────────────────────────
