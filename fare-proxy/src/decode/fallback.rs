//! Ordered decode-then-parse fallback.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::encoding::CandidateList;
use super::error::{AttemptFailure, DecodeError, DecodeExhausted};

/// JSON obtained from the first candidate that both decoded and parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBody {
    /// Name of the encoding that succeeded
    pub encoding: String,

    /// Parsed document
    pub value: Value,
}

/// Try each candidate encoding in order until the bytes decode and parse.
///
/// Stops at the first success; later candidates are never touched. When
/// every candidate fails, the error lists them all along with the failure
/// from the last attempt.
pub fn decode_and_parse(
    bytes: &[u8],
    candidates: &CandidateList,
) -> Result<DecodedBody, DecodeExhausted> {
    let mut attempted = Vec::with_capacity(candidates.len());
    let mut last = None;

    for candidate in candidates.iter() {
        let encoding = candidate.name().to_string();
        attempted.push(encoding.clone());

        let failure = match candidate.decode(bytes) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => {
                    info!(
                        encoding = %encoding,
                        attempts = attempted.len(),
                        "decoded upstream response"
                    );
                    return Ok(DecodedBody { encoding, value });
                }
                Err(source) => AttemptFailure::Parse { encoding, source },
            },
            Err(e) => AttemptFailure::Decode(e),
        };

        debug!(encoding = failure.encoding(), error = %failure, "candidate encoding rejected");
        last = Some(failure);
    }

    // CandidateList is never empty, so at least one attempt was recorded.
    let last = last.unwrap_or_else(|| {
        AttemptFailure::Decode(DecodeError::new("-", "no candidate encodings"))
    });
    warn!(attempted = ?attempted, error = %last, "no candidate encoding produced valid JSON");

    Err(DecodeExhausted { attempted, last })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::decode::{CandidateEncoding, LegacyEncoding};

    /// Behaviour of a spy candidate.
    #[derive(Clone, Copy)]
    enum Spy {
        /// Decode as UTF-8
        Utf8,
        /// Produce text that is not JSON
        Garbage,
        /// Fail to decode
        Fail,
    }

    /// Candidate that counts how often it is asked to decode.
    struct SpyEncoding {
        name: String,
        behaviour: Spy,
        calls: Arc<AtomicUsize>,
    }

    impl CandidateEncoding for SpyEncoding {
        fn name(&self) -> &str {
            &self.name
        }

        fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Spy::Utf8 => Ok(String::from_utf8_lossy(bytes).into_owned()),
                Spy::Garbage => Ok("<html>503 Service Unavailable</html>".to_string()),
                Spy::Fail => Err(DecodeError::new(&self.name, "simulated failure")),
            }
        }
    }

    /// Build a spy list; returns the shared attempt counter.
    fn spies(behaviours: &[Spy]) -> (CandidateList, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let candidates = behaviours
            .iter()
            .enumerate()
            .map(|(i, b)| {
                Arc::new(SpyEncoding {
                    name: format!("spy-{i}"),
                    behaviour: *b,
                    calls: calls.clone(),
                }) as Arc<dyn CandidateEncoding>
            })
            .collect();
        (CandidateList::new(candidates).unwrap(), calls)
    }

    const FARES: &[u8] = br#"{"ResultSet":{"Course":[{"Price":[{"Oneway":"210"},{"Oneway":"209"}]}]}}"#;

    #[test]
    fn first_candidate_wins_without_trying_others() {
        let (list, calls) = spies(&[Spy::Utf8, Spy::Fail, Spy::Garbage]);

        let body = decode_and_parse(FARES, &list).unwrap();

        assert_eq!(body.encoding, "spy-0");
        assert_eq!(body.value, serde_json::from_slice::<Value>(FARES).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn falls_through_to_nth_candidate() {
        let (list, calls) = spies(&[Spy::Garbage, Spy::Fail, Spy::Garbage, Spy::Utf8, Spy::Fail]);

        let body = decode_and_parse(FARES, &list).unwrap();

        assert_eq!(body.encoding, "spy-3");
        assert_eq!(body.value["ResultSet"]["Course"][0]["Price"][1]["Oneway"], "209");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn exhaustion_lists_every_candidate_in_order() {
        let (list, calls) = spies(&[Spy::Fail, Spy::Garbage, Spy::Garbage]);

        let err = decode_and_parse(FARES, &list).unwrap_err();

        assert_eq!(err.attempted, vec!["spy-0", "spy-1", "spy-2"]);
        assert_eq!(err.last.kind(), "parse");
        assert_eq!(err.last.encoding(), "spy-2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn exhaustion_reports_decode_failure_when_last() {
        let (list, _) = spies(&[Spy::Garbage, Spy::Fail]);

        let err = decode_and_parse(FARES, &list).unwrap_err();

        assert_eq!(err.last.kind(), "decode");
        assert!(err.last.to_string().contains("simulated failure"));
    }

    #[test]
    fn shift_jis_response_decodes_with_default_candidates() {
        let list = crate::config::ProxyConfig::default().candidate_list().unwrap();
        let bytes = b"{\"Name\":\"\x93\x8c\x8b\x9e\"}";

        let body = decode_and_parse(bytes, &list).unwrap();

        assert_eq!(body.encoding, "Shift_JIS");
        assert_eq!(body.value, json!({"Name": "東京"}));
    }

    #[test]
    fn html_error_page_exhausts_real_encodings() {
        let list = CandidateList::from_legacy(vec![
            LegacyEncoding::for_label("shift_jis").unwrap(),
            LegacyEncoding::for_label("utf-8").unwrap(),
        ])
        .unwrap();

        let err = decode_and_parse(b"<html><body>Bad Gateway</body></html>", &list).unwrap_err();

        assert_eq!(err.attempted, vec!["Shift_JIS", "UTF-8"]);
        assert_eq!(err.last.kind(), "parse");
    }
}
