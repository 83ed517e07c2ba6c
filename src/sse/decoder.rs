//! Incremental byte-to-line decoder.
//!
//! Chunks arrive with arbitrary boundaries, so a chunk may end in the middle
//! of a line or in the middle of a multi-byte UTF-8 sequence. The decoder
//! keeps both kinds of remainder until the next [`FrameDecoder::feed`].

/// Splits a byte stream into `\n`-terminated lines.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Decoded text since the last newline. Never contains `\n`.
    buffer: String,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
}

impl FrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return every line it completed, in order,
    /// without the trailing `\n`.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode_into_buffer(chunk);

        if !self.buffer.contains('\n') {
            return Vec::new();
        }

        let mut segments: Vec<String> = self.buffer.split('\n').map(str::to_string).collect();
        // The last segment is unterminated (possibly empty) and stays buffered.
        self.buffer = segments.pop().unwrap_or_default();
        segments
    }

    /// Text held back waiting for a newline.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Drop any residual text and bytes, returning how many bytes were dropped.
    ///
    /// Called at end of stream: an unterminated final line is never parsed.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buffer.len() + self.pending.len();
        self.buffer.clear();
        self.pending.clear();
        dropped
    }

    fn decode_into_buffer(&mut self, chunk: &[u8]) {
        let joined;
        let mut bytes = if self.pending.is_empty() {
            chunk
        } else {
            self.pending.extend_from_slice(chunk);
            joined = std::mem::take(&mut self.pending);
            joined.as_slice()
        };

        loop {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, rest) = bytes.split_at(err.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        self.buffer.push_str(text);
                    }
                    match err.error_len() {
                        // Truncated sequence at the end: wait for more bytes.
                        None => {
                            self.pending = rest.to_vec();
                            return;
                        }
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            bytes = &rest[len..];
                        }
                    }
                }
            }
        }
    }
}
