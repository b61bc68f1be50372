//! Client library for connecting to a featureboard server
//!
//! Provides a typed interface over the line protocol, one method per
//! operation. NOT_FOUND and INVALID response lines surface as the matching
//! typed errors so callers see the same taxonomy the store reports.

use crate::error::{FeatureBoardError, Result};
use crate::protocol::{AddRequest, Command, Response};
use crate::store::{Feature, FeatureSummary};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;

/// Client for connecting to a featureboard server
pub struct Client {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: BufWriter<tokio::net::tcp::OwnedWriteHalf>,
}

/// Serialize a command to its wire line
fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let line = match command {
        Command::List => "LIST".to_string(),
        Command::Top => "TOP".to_string(),
        Command::Get { id } => format!("GET {}", id),
        Command::Add(request) => format!("ADD {}", serde_json::to_string(request)?),
        Command::Vote { id } => format!("VOTE {}", id),
        Command::Complete { id } => format!("COMPLETE {}", id),
        Command::Delete { id } => format!("DELETE {}", id),
    };
    Ok(format!("{}\r\n", line).into_bytes())
}

/// Parse a server response line
fn parse_response(response: &str) -> Result<Response> {
    if response == "OK" {
        Ok(Response::Ok)
    } else if let Some(payload) = response.strip_prefix("FEATURE ") {
        Ok(Response::Feature(serde_json::from_str(payload)?))
    } else if let Some(payload) = response.strip_prefix("SUMMARY ") {
        Ok(Response::Summary(serde_json::from_str(payload)?))
    } else if let Some(payload) = response.strip_prefix("LIST ") {
        Ok(Response::List(serde_json::from_str(payload)?))
    } else if let Some(msg) = response.strip_prefix("NOT_FOUND ") {
        Ok(Response::NotFound(msg.to_string()))
    } else if let Some(msg) = response.strip_prefix("INVALID ") {
        Ok(Response::Invalid(msg.to_string()))
    } else if let Some(msg) = response.strip_prefix("ERROR ") {
        Ok(Response::Error(msg.to_string()))
    } else {
        Err(FeatureBoardError::Protocol(format!(
            "Unknown response format: {}",
            response
        )))
    }
}

/// Convert a non-success response into the matching typed error
fn response_error(operation: &str, response: Response) -> FeatureBoardError {
    match response {
        Response::NotFound(msg) => FeatureBoardError::NotFound(msg),
        Response::Invalid(msg) => FeatureBoardError::InvalidArgument(msg),
        Response::Error(msg) => FeatureBoardError::Server(msg),
        other => FeatureBoardError::Protocol(format!(
            "Unexpected response for {}: {:?}",
            operation, other
        )),
    }
}

impl Client {
    /// Connect to a featureboard server
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = stream.into_split();
        let reader = BufReader::new(read_half);
        let writer = BufWriter::new(write_half);

        Ok(Self { reader, writer })
    }

    /// Send a command and receive a response
    async fn send_command(&mut self, command: &Command) -> Result<Response> {
        let command_bytes = encode_command(command)?;

        self.writer.write_all(&command_bytes).await?;
        self.writer.flush().await?;

        let mut response_line = String::new();
        let read = self.reader.read_line(&mut response_line).await?;
        if read == 0 {
            return Err(FeatureBoardError::Client(
                "Server closed the connection".to_string(),
            ));
        }

        parse_response(response_line.trim())
    }

    /// List all features, most upvoted first
    pub async fn list(&mut self) -> Result<Vec<FeatureSummary>> {
        match self.send_command(&Command::List).await? {
            Response::List(summaries) => Ok(summaries),
            other => Err(response_error("LIST", other)),
        }
    }

    /// Get the single most upvoted feature
    pub async fn top(&mut self) -> Result<FeatureSummary> {
        match self.send_command(&Command::Top).await? {
            Response::Summary(summary) => Ok(summary),
            other => Err(response_error("TOP", other)),
        }
    }

    /// Get the full record for a feature
    pub async fn get(&mut self, id: u64) -> Result<Feature> {
        match self.send_command(&Command::Get { id }).await? {
            Response::Feature(feature) => Ok(feature),
            other => Err(response_error("GET", other)),
        }
    }

    /// Create a new feature request
    pub async fn add(&mut self, title: &str, description: &str, details: &str) -> Result<Feature> {
        let request = AddRequest {
            title: title.to_string(),
            description: description.to_string(),
            details: details.to_string(),
        };

        match self.send_command(&Command::Add(request)).await? {
            Response::Feature(feature) => Ok(feature),
            other => Err(response_error("ADD", other)),
        }
    }

    /// Upvote a feature
    pub async fn vote(&mut self, id: u64) -> Result<Feature> {
        match self.send_command(&Command::Vote { id }).await? {
            Response::Feature(feature) => Ok(feature),
            other => Err(response_error("VOTE", other)),
        }
    }

    /// Mark a feature as completed
    pub async fn complete(&mut self, id: u64) -> Result<Feature> {
        match self.send_command(&Command::Complete { id }).await? {
            Response::Feature(feature) => Ok(feature),
            other => Err(response_error("COMPLETE", other)),
        }
    }

    /// Delete a feature
    pub async fn delete(&mut self, id: u64) -> Result<()> {
        match self.send_command(&Command::Delete { id }).await? {
            Response::Ok => Ok(()),
            other => Err(response_error("DELETE", other)),
        }
    }

    /// Close the connection
    pub async fn close(mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command() {
        assert_eq!(encode_command(&Command::List).unwrap(), b"LIST\r\n");
        assert_eq!(encode_command(&Command::Top).unwrap(), b"TOP\r\n");
        assert_eq!(encode_command(&Command::Get { id: 7 }).unwrap(), b"GET 7\r\n");
        assert_eq!(
            encode_command(&Command::Vote { id: 1 }).unwrap(),
            b"VOTE 1\r\n"
        );

        let encoded = encode_command(&Command::Add(AddRequest {
            title: "Dark Mode".to_string(),
            description: String::new(),
            details: "a\nb".to_string(),
        }))
        .unwrap();
        let line = String::from_utf8(encoded).unwrap();
        assert!(line.starts_with("ADD {"));
        // Newlines in details stay escaped; the command is one line.
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_parse_response() {
        assert_eq!(parse_response("OK").unwrap(), Response::Ok);
        assert_eq!(
            parse_response("NOT_FOUND feature with id 9 not found").unwrap(),
            Response::NotFound("feature with id 9 not found".to_string())
        );
        assert_eq!(
            parse_response("INVALID title is required").unwrap(),
            Response::Invalid("title is required".to_string())
        );
        assert_eq!(
            parse_response("ERROR boom").unwrap(),
            Response::Error("boom".to_string())
        );

        let parsed = parse_response(
            "SUMMARY {\"id\":1,\"title\":\"Dark Mode\",\"upvotes\":142,\"completed\":false}",
        )
        .unwrap();
        assert_eq!(
            parsed,
            Response::Summary(FeatureSummary {
                id: 1,
                title: "Dark Mode".to_string(),
                upvotes: 142,
                completed: false,
            })
        );

        assert!(parse_response("BOGUS line").is_err());
    }

    #[test]
    fn test_response_error_mapping() {
        let err = response_error("GET", Response::NotFound("gone".to_string()));
        assert!(matches!(err, FeatureBoardError::NotFound(_)));

        let err = response_error("ADD", Response::Invalid("title is required".to_string()));
        assert!(matches!(err, FeatureBoardError::InvalidArgument(_)));

        let err = response_error("LIST", Response::Ok);
        assert!(matches!(err, FeatureBoardError::Protocol(_)));
    }
}
