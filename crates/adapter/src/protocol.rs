//! Protocol module - JSON message types for the leaderboard
//!
//! One JSON object per line, tagged by `type`. Every message carries the
//! sender's `seq`; replies echo the request's `seq`.

use serde::{Deserialize, Serialize};

/// Display names longer than this are truncated on insert.
pub const MAX_NAME_CHARS: usize = 20;

/// Entries returned by `get_scores` when the request gives no limit.
pub const DEFAULT_SCORES_LIMIT: usize = 10;

// ============== Client -> Server Messages ==============

/// Requests accepted by the leaderboard server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Record a finished game.
    SaveScore {
        seq: u64,
        player: String,
        score: u32,
        elapsed_ms: u64,
    },
    /// Fetch the top of the board.
    GetScores {
        seq: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },
}

impl Request {
    pub fn seq(&self) -> u64 {
        match self {
            Request::SaveScore { seq, .. } | Request::GetScores { seq, .. } => *seq,
        }
    }
}

// ============== Server -> Client Messages ==============

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub display_name: String,
    pub score: u32,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Not JSON, or JSON of the wrong shape.
    InvalidMessage,
    /// Well-formed but the `type` is not a request we serve.
    UnknownType,
    /// A field failed validation (e.g. an empty player name).
    InvalidField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// A score was stored; `rank` is its 1-based position after insert.
    Ack { seq: u64, rank: usize },
    Scores { seq: u64, entries: Vec<ScoreEntry> },
    Error {
        seq: u64,
        code: ErrorCode,
        message: String,
    },
}

impl Response {
    pub fn seq(&self) -> u64 {
        match self {
            Response::Ack { seq, .. } | Response::Scores { seq, .. } | Response::Error { seq, .. } => {
                *seq
            }
        }
    }
}

/// Build an error reply.
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> Response {
    Response::Error {
        seq,
        code,
        message: message.to_string(),
    }
}

/// Parse one request line.
///
/// Unknown `type` values and malformed input are turned into the error reply
/// the server should send, echoing `seq` when it can be recovered.
pub fn parse_request(line: &str) -> Result<Request, Response> {
    match serde_json::from_str::<Request>(line) {
        Ok(req) => Ok(req),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct Envelope<'a> {
                #[serde(rename = "type", borrow)]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let Ok(env) = serde_json::from_str::<Envelope>(line) else {
                return Err(create_error(0, ErrorCode::InvalidMessage, &e.to_string()));
            };
            let seq = env.seq.unwrap_or(0);
            match env.msg_type {
                Some("save_score") | Some("get_scores") => {
                    Err(create_error(seq, ErrorCode::InvalidMessage, &e.to_string()))
                }
                Some(other) => Err(create_error(
                    seq,
                    ErrorCode::UnknownType,
                    &format!("unknown message type: {other}"),
                )),
                None => Err(create_error(seq, ErrorCode::InvalidMessage, "missing type")),
            }
        }
    }
}

/// Trim and cut a player name to [`MAX_NAME_CHARS`] characters.
pub fn truncate_name(name: &str) -> String {
    name.trim().chars().take(MAX_NAME_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_save_score() {
        let req =
            parse_request(r#"{"type":"save_score","seq":4,"player":"ada","score":900,"elapsed_ms":61000}"#)
                .unwrap();
        assert_eq!(
            req,
            Request::SaveScore {
                seq: 4,
                player: "ada".to_string(),
                score: 900,
                elapsed_ms: 61_000,
            }
        );
    }

    #[test]
    fn test_get_scores_limit_is_optional() {
        let req = parse_request(r#"{"type":"get_scores","seq":2}"#).unwrap();
        assert_eq!(req, Request::GetScores { seq: 2, limit: None });
        assert_eq!(req.seq(), 2);
    }

    #[test]
    fn test_unknown_type_echoes_seq() {
        let err = parse_request(r#"{"type":"hello","seq":9}"#).unwrap_err();
        match err {
            Response::Error { seq, code, .. } => {
                assert_eq!(seq, 9);
                assert_eq!(code, ErrorCode::UnknownType);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_fields_and_garbage() {
        let err = parse_request(r#"{"type":"save_score","seq":3,"score":"lots"}"#).unwrap_err();
        assert!(matches!(
            err,
            Response::Error {
                seq: 3,
                code: ErrorCode::InvalidMessage,
                ..
            }
        ));

        let err = parse_request("not json").unwrap_err();
        assert!(matches!(
            err,
            Response::Error {
                seq: 0,
                code: ErrorCode::InvalidMessage,
                ..
            }
        ));
    }

    #[test]
    fn test_response_wire_format() {
        let json = serde_json::to_string(&Response::Ack { seq: 1, rank: 2 }).unwrap();
        assert_eq!(json, r#"{"type":"ack","seq":1,"rank":2}"#);

        let err = create_error(5, ErrorCode::InvalidField, "empty player");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains(r#""code":"invalid_field""#));
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("  ada  "), "ada");
        let long = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(truncate_name(long), "abcdefghijklmnopqrst");
        assert_eq!(truncate_name("ünïcödé-ünïcödé-ünïcödé").chars().count(), 20);
    }
}
