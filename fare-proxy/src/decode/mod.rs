//! Decoding of upstream response bytes.
//!
//! The upstream answers in a legacy Japanese encoding and does not always
//! say which one. Response bytes are run through an ordered list of
//! candidate encodings; the first candidate whose (lossy) decode parses as
//! JSON wins.

mod encoding;
mod error;
mod fallback;

pub use encoding::{CandidateEncoding, CandidateList, LegacyEncoding};
pub use error::{AttemptFailure, DecodeError, DecodeExhausted};
pub use fallback::{DecodedBody, decode_and_parse};
