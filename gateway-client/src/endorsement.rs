use crate::error::{Error, Result};
use gateway_common::{PeerFailure, PeerResponse, ProposalResponse};

use log::{debug, warn};

/// Peer responses split by outcome, in the order the peers answered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Endorsements {
    pub valid: Vec<ProposalResponse>,
    pub invalid: Vec<PeerFailure>,
}

impl Endorsements {
    /// Payload of the first valid response. An empty payload is "no value",
    /// which is a successful result.
    pub fn payload(&self) -> Option<Vec<u8>> {
        self.valid
            .first()
            .map(|response| &response.payload)
            .filter(|payload| !payload.is_empty())
            .cloned()
    }
}

/// Applies the acceptance policy to the responses of one proposal.
///
/// A single valid endorsement is enough to carry on. Endorsement policy
/// proper is checked by the network when the transaction is validated, not
/// here.
pub fn evaluate_responses(responses: Vec<PeerResponse>) -> Result<Endorsements> {
    if responses.is_empty() {
        return Err(Error::NoResponses);
    }

    let mut endorsements = Endorsements::default();
    for response in responses {
        match response {
            PeerResponse::Endorsed(response) if response.is_success() => {
                debug!("valid endorsement from {}", response.peer);
                endorsements.valid.push(response);
            }
            PeerResponse::Endorsed(response) => {
                endorsements.invalid.push(PeerFailure {
                    peer: response.peer,
                    status: Some(response.status),
                    message: response.message,
                })
            }
            PeerResponse::Failed(failure) => endorsements.invalid.push(failure),
        }
    }

    for failure in &endorsements.invalid {
        warn!(
            "invalid endorsement from {} (status {:?}): {}",
            failure.peer, failure.status, failure.message
        );
    }

    if endorsements.valid.is_empty() {
        return Err(Error::NoValidResponses(endorsements.invalid));
    }
    Ok(endorsements)
}

#[cfg(test)]
mod endorsement_test {
    use super::*;

    fn endorsed(peer: &str, status: u32, payload: &[u8]) -> PeerResponse {
        PeerResponse::Endorsed(ProposalResponse {
            peer: peer.to_string(),
            status,
            message: String::new(),
            payload: payload.to_vec(),
        })
    }

    fn failed(peer: &str) -> PeerResponse {
        PeerResponse::Failed(PeerFailure {
            peer: peer.to_string(),
            status: None,
            message: "timeout".to_string(),
        })
    }

    #[test]
    fn empty_set_is_no_responses() {
        let e = evaluate_responses(vec![]).unwrap_err();
        assert!(matches!(e, Error::NoResponses));
        assert_eq!(e.to_string(), "No results were returned from the request");
    }

    #[test]
    fn all_invalid_is_no_valid_responses() {
        let e = evaluate_responses(vec![endorsed("peer0", 500, b""), failed("peer1")]).unwrap_err();
        match &e {
            Error::NoValidResponses(failures) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].status, Some(500));
                assert_eq!(failures[1].peer, "peer1");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(e.to_string().contains("No valid responses from any peers"));
    }

    #[test]
    fn one_valid_is_enough() {
        let endorsements =
            evaluate_responses(vec![failed("peer0"), endorsed("peer1", 200, b"ok")]).unwrap();
        assert_eq!(endorsements.valid.len(), 1);
        assert_eq!(endorsements.valid[0].peer, "peer1");
        assert_eq!(endorsements.invalid.len(), 1);
        assert_eq!(endorsements.payload(), Some(b"ok".to_vec()));
    }

    #[test]
    fn payload_comes_from_first_valid() {
        let endorsements =
            evaluate_responses(vec![endorsed("peer0", 200, b""), endorsed("peer1", 200, b"late")])
                .unwrap();
        assert_eq!(endorsements.payload(), None);
    }
}
