//! Failures of a submit or evaluate call.
//!
//! Every variant aborts the invocation that produced it. Errors coming out
//! of the transport or the query handler are carried transparently so their
//! original message and source chain stay intact.

use crate::transaction::TransactionState;
use gateway_common::PeerFailure;

use std::time::Duration;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// One or more arguments were not strings. Nothing was sent.
    #[error("Transaction parameters must be strings: {0}")]
    InvalidArgument(String),

    #[error("No results were returned from the request")]
    NoResponses,

    #[error("No valid responses from any peers. {}", describe_failures(.0))]
    NoValidResponses(Vec<PeerFailure>),

    #[error(
        "Failed to send peer responses for transaction '{tx_id}' to orderer. \
         Response status: {status}"
    )]
    OrderingService { tx_id: String, status: String },

    /// The orderer accepted the transaction but not enough commit events
    /// arrived in time. The transaction may still commit: the outcome is
    /// unknown, not rolled back.
    #[error(
        "Event strategy not satisfied within {timeout:?} for transaction '{tx_id}'; \
         it was accepted by the orderer so its commit outcome is unknown"
    )]
    CommitTimeout { tx_id: String, timeout: Duration },

    #[error("Peer {peer} has rejected transaction '{tx_id}' with code {code}")]
    CommitRejected {
        tx_id: String,
        peer: String,
        code: String,
    },

    #[error("No event hub reported a commit for transaction '{tx_id}'")]
    EventHubsUnavailable { tx_id: String },

    #[error("Query failed. {}", describe_failures(.0))]
    QueryFailed(Vec<PeerFailure>),

    #[error("cannot {operation} a transaction in state {state:?}")]
    InvalidState {
        state: TransactionState,
        operation: &'static str,
    },

    #[error(transparent)]
    Transport(anyhow::Error),

    #[error(transparent)]
    Query(anyhow::Error),
}

impl Error {
    /// Unwraps a query handler error, keeping this crate's own variants
    /// as they are and passing anything else through untouched.
    pub(crate) fn from_query(e: anyhow::Error) -> Self {
        match e.downcast::<Error>() {
            Ok(e) => e,
            Err(e) => Error::Query(e),
        }
    }
}

fn describe_failures(failures: &[PeerFailure]) -> String {
    let details: Vec<String> = failures
        .iter()
        .map(|failure| match failure.status {
            Some(status) => format!("{} (status {}): {}", failure.peer, status, failure.message),
            None => format!("{}: {}", failure.peer, failure.message),
        })
        .collect();
    format!("{} peer error responses: {}", failures.len(), details.join("; "))
}

#[cfg(test)]
mod error_test {
    use super::*;

    #[test]
    fn no_valid_responses_lists_failures() {
        let e = Error::NoValidResponses(vec![
            PeerFailure {
                peer: "peer0".to_string(),
                status: Some(500),
                message: "chaincode panicked".to_string(),
            },
            PeerFailure {
                peer: "peer1".to_string(),
                status: None,
                message: "connection refused".to_string(),
            },
        ]);
        let message = e.to_string();
        assert!(message.starts_with("No valid responses from any peers"));
        assert!(message.contains("peer0 (status 500): chaincode panicked"));
        assert!(message.contains("peer1: connection refused"));
    }

    #[test]
    fn foreign_query_errors_pass_through() {
        let e = Error::from_query(anyhow::anyhow!("handler exploded"));
        assert!(matches!(e, Error::Query(_)));
        assert_eq!(e.to_string(), "handler exploded");

        let e = Error::from_query(Error::QueryFailed(vec![]).into());
        assert!(matches!(e, Error::QueryFailed(_)));
    }
}
