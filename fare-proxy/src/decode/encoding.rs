//! Candidate text encodings.

use std::fmt;
use std::sync::Arc;

use encoding_rs::{DecoderResult, Encoding};
use tracing::trace;

use super::error::DecodeError;

/// A text encoding the fallback loop can try.
pub trait CandidateEncoding: Send + Sync {
    /// Display name, reported back to callers when every candidate fails.
    fn name(&self) -> &str;

    /// Decode `bytes` to text, dropping any malformed sequences.
    fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError>;
}

/// An `encoding_rs` codec used with drop-invalid semantics.
///
/// Unlike `Encoding::decode`, malformed sequences are skipped rather than
/// replaced with U+FFFD.
#[derive(Clone, Copy)]
pub struct LegacyEncoding {
    encoding: &'static Encoding,
}

impl LegacyEncoding {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    /// Resolve a WHATWG encoding label such as `shift_jis` or `sjis`.
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(Self::new)
    }
}

impl fmt::Debug for LegacyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LegacyEncoding")
            .field(&self.encoding.name())
            .finish()
    }
}

impl CandidateEncoding for LegacyEncoding {
    fn name(&self) -> &str {
        self.encoding.name()
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        let mut decoder = self.encoding.new_decoder_with_bom_removal();
        let capacity = decoder
            .max_utf8_buffer_length_without_replacement(bytes.len())
            .ok_or_else(|| DecodeError::new(self.name(), "input too large to decode"))?;

        let mut output = String::with_capacity(capacity);
        let mut input = bytes;
        let mut dropped = 0usize;

        loop {
            let (result, read) =
                decoder.decode_to_string_without_replacement(input, &mut output, true);
            input = &input[read..];

            match result {
                DecoderResult::InputEmpty => break,
                DecoderResult::Malformed(_, _) => dropped += 1,
                DecoderResult::OutputFull => {
                    let additional = decoder
                        .max_utf8_buffer_length_without_replacement(input.len())
                        .ok_or_else(|| {
                            DecodeError::new(self.name(), "input too large to decode")
                        })?;
                    if additional == 0 {
                        return Err(DecodeError::new(self.name(), "decoder made no progress"));
                    }
                    output.reserve(additional);
                }
            }
        }

        if dropped > 0 {
            trace!(encoding = self.name(), dropped, "dropped malformed byte sequences");
        }

        Ok(output)
    }
}

/// Ordered, non-empty list of candidate encodings.
#[derive(Clone)]
pub struct CandidateList {
    candidates: Vec<Arc<dyn CandidateEncoding>>,
}

impl CandidateList {
    /// Create a list from candidates in priority order. Returns `None` if empty.
    pub fn new(candidates: Vec<Arc<dyn CandidateEncoding>>) -> Option<Self> {
        if candidates.is_empty() {
            None
        } else {
            Some(Self { candidates })
        }
    }

    /// Create a list of `encoding_rs` codecs. Returns `None` if empty.
    pub fn from_legacy(encodings: Vec<LegacyEncoding>) -> Option<Self> {
        Self::new(
            encodings
                .into_iter()
                .map(|e| Arc::new(e) as Arc<dyn CandidateEncoding>)
                .collect(),
        )
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn CandidateEncoding>> {
        self.candidates.iter()
    }

    /// Candidate names in priority order.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl fmt::Debug for CandidateList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|c| c.name())).finish()
    }
}
