//! Protocol parser and command definitions for featureboard
//!
//! Requests are single lines: a verb, an optional id argument, and for ADD
//! a single-line JSON payload (titles and details are free text and cannot
//! ride in a space-delimited field). Verbs are parsed with nom combinators.

use crate::error::{FeatureBoardError, Result};
use crate::store::{Feature, FeatureSummary};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::space1,
    combinator::{map, map_res},
    sequence::{terminated, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::str;

/// Payload of an ADD command. All fields default to empty; the store
/// rejects a missing title as an invalid argument rather than a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: String,
}

/// Commands supported by the featureboard protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    List,
    Top,
    Get { id: u64 },
    Add(AddRequest),
    Vote { id: u64 },
    Complete { id: u64 },
    Delete { id: u64 },
}

/// Response types from the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Ok,
    Feature(Feature),
    Summary(FeatureSummary),
    List(Vec<FeatureSummary>),
    NotFound(String),
    Invalid(String),
    Error(String),
}

impl Response {
    /// Serialize response to bytes for network transmission. Record
    /// payloads are JSON, so embedded newlines stay escaped and every
    /// response is exactly one line.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let line = match self {
            Response::Ok => "OK".to_string(),
            Response::Feature(feature) => {
                format!("FEATURE {}", serde_json::to_string(feature)?)
            }
            Response::Summary(summary) => {
                format!("SUMMARY {}", serde_json::to_string(summary)?)
            }
            Response::List(summaries) => {
                format!("LIST {}", serde_json::to_string(summaries)?)
            }
            Response::NotFound(msg) => format!("NOT_FOUND {}", msg),
            Response::Invalid(msg) => format!("INVALID {}", msg),
            Response::Error(msg) => format!("ERROR {}", msg),
        };
        Ok(format!("{}\r\n", line).into_bytes())
    }
}

/// Parse a complete command from input bytes
pub fn parse_command(input: &[u8]) -> Result<Command> {
    let (_, command) = command_parser(input)
        .map_err(|e| FeatureBoardError::Protocol(format!("Failed to parse command: {:?}", e)))?;
    Ok(command)
}

/// Main command parser using nom combinators
fn command_parser(input: &[u8]) -> IResult<&[u8], Command> {
    terminated(
        alt((
            list_command,
            top_command,
            get_command,
            add_command,
            vote_command,
            complete_command,
            delete_command,
        )),
        alt((tag(b"\r\n"), tag(b"\n"))),
    )(input)
}

/// Parse a decimal id argument
fn id_argument(input: &[u8]) -> IResult<&[u8], u64> {
    map_res(
        take_while1(|c: u8| c.is_ascii_digit()),
        |bytes: &[u8]| str::from_utf8(bytes).unwrap_or("").parse::<u64>(),
    )(input)
}

/// Parse LIST command
fn list_command(input: &[u8]) -> IResult<&[u8], Command> {
    map(tag(b"LIST"), |_| Command::List)(input)
}

/// Parse TOP command
fn top_command(input: &[u8]) -> IResult<&[u8], Command> {
    map(tag(b"TOP"), |_| Command::Top)(input)
}

/// Parse GET command: GET <id>
fn get_command(input: &[u8]) -> IResult<&[u8], Command> {
    map(
        tuple((tag(b"GET"), space1, id_argument)),
        |(_, _, id)| Command::Get { id },
    )(input)
}

/// Parse ADD command: ADD <json payload>
fn add_command(input: &[u8]) -> IResult<&[u8], Command> {
    map_res(
        tuple((tag(b"ADD"), space1, take_until("\r\n"))),
        |(_, _, payload): (&[u8], &[u8], &[u8])| {
            serde_json::from_slice::<AddRequest>(payload).map(Command::Add)
        },
    )(input)
}

/// Parse VOTE command: VOTE <id>
fn vote_command(input: &[u8]) -> IResult<&[u8], Command> {
    map(
        tuple((tag(b"VOTE"), space1, id_argument)),
        |(_, _, id)| Command::Vote { id },
    )(input)
}

/// Parse COMPLETE command: COMPLETE <id>
fn complete_command(input: &[u8]) -> IResult<&[u8], Command> {
    map(
        tuple((tag(b"COMPLETE"), space1, id_argument)),
        |(_, _, id)| Command::Complete { id },
    )(input)
}

/// Parse DELETE command: DELETE <id>
fn delete_command(input: &[u8]) -> IResult<&[u8], Command> {
    map(
        tuple((tag(b"DELETE"), space1, id_argument)),
        |(_, _, id)| Command::Delete { id },
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_command() {
        let result = parse_command(b"LIST\r\n").unwrap();
        assert_eq!(result, Command::List);
    }

    #[test]
    fn test_parse_top_command() {
        let result = parse_command(b"TOP\r\n").unwrap();
        assert_eq!(result, Command::Top);
    }

    #[test]
    fn test_parse_id_commands() {
        assert_eq!(parse_command(b"GET 7\r\n").unwrap(), Command::Get { id: 7 });
        assert_eq!(parse_command(b"VOTE 1\r\n").unwrap(), Command::Vote { id: 1 });
        assert_eq!(
            parse_command(b"COMPLETE 42\r\n").unwrap(),
            Command::Complete { id: 42 }
        );
        assert_eq!(
            parse_command(b"DELETE 3\r\n").unwrap(),
            Command::Delete { id: 3 }
        );
    }

    #[test]
    fn test_parse_add_command() {
        let input = b"ADD {\"title\":\"Dark Mode\",\"description\":\"theme\",\"details\":\"line one\\nline two\"}\r\n";
        let result = parse_command(input).unwrap();
        assert_eq!(
            result,
            Command::Add(AddRequest {
                title: "Dark Mode".to_string(),
                description: "theme".to_string(),
                details: "line one\nline two".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_add_command_defaults_missing_fields() {
        let result = parse_command(b"ADD {\"title\":\"Minimal\"}\r\n").unwrap();
        assert_eq!(
            result,
            Command::Add(AddRequest {
                title: "Minimal".to_string(),
                description: String::new(),
                details: String::new(),
            })
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_command(b"FROB 1\r\n").is_err());
        assert!(parse_command(b"GET abc\r\n").is_err());
        assert!(parse_command(b"ADD not-json\r\n").is_err());
        assert!(parse_command(b"LIST trailing\r\n").is_err());
    }

    #[test]
    fn test_response_serialization() {
        assert_eq!(Response::Ok.to_bytes().unwrap(), b"OK\r\n");
        assert_eq!(
            Response::NotFound("no features found".to_string())
                .to_bytes()
                .unwrap(),
            b"NOT_FOUND no features found\r\n"
        );
        assert_eq!(
            Response::Invalid("title is required".to_string())
                .to_bytes()
                .unwrap(),
            b"INVALID title is required\r\n"
        );
        assert_eq!(
            Response::Error("boom".to_string()).to_bytes().unwrap(),
            b"ERROR boom\r\n"
        );
    }

    #[test]
    fn test_feature_response_is_single_line_json() {
        let feature = Feature {
            id: 1,
            title: "Dark Mode".to_string(),
            description: "theme".to_string(),
            details: "line one\nline two".to_string(),
            upvotes: 3,
            completed: false,
        };

        let bytes = Response::Feature(feature.clone()).to_bytes().unwrap();
        let line = String::from_utf8(bytes).unwrap();
        assert!(line.ends_with("\r\n"));
        // Only the terminator may contain a raw newline.
        assert_eq!(line.matches('\n').count(), 1);

        let payload = line.trim_end().strip_prefix("FEATURE ").unwrap();
        let decoded: Feature = serde_json::from_str(payload).unwrap();
        assert_eq!(decoded, feature);
    }
}
