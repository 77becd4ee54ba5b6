//! Overlapping bounded chunks over segment text
//!
//! Offsets and sizes are in characters, not bytes, so multi-byte text
//! never splits a code point.

/// One chunk of segment text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Character offset of this chunk within the segment text
    pub offset: usize,
    /// Chunk length in characters
    pub char_len: usize,
    /// The chunk text
    pub text: String,
}

/// Split `text` into overlapping chunks of at most `chunk_size`
/// characters, consecutive chunks sharing `overlap` characters.
///
/// Requires `overlap < chunk_size` (enforced by config validation).
/// Empty text yields no chunks; text within the limit yields one.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    if text.is_empty() || chunk_size == 0 || overlap >= chunk_size {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return vec![Chunk {
            offset: 0,
            char_len: chars.len(),
            text: text.to_string(),
        }];
    }

    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(Chunk {
            offset: start,
            char_len: end - start,
            text: chars[start..end].iter().collect(),
        });

        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}
