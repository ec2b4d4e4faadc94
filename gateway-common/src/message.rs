use crate::identity::TransactionId;

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use chrono::Utc;

/// Status a peer returns for a successful endorsement.
pub const ENDORSEMENT_SUCCESS: u32 = 200;
/// Acknowledgement status the ordering service returns on acceptance.
pub const ORDERER_SUCCESS: &str = "SUCCESS";
/// Validation code of a transaction committed as valid.
pub const VALIDATION_VALID: &str = "VALID";

pub type TransientMap = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct ChaincodeProposal {
    pub fcn: String,
    pub tx_id: String,
    pub chaincode_id: String,
    pub args: Vec<String>,
    pub transient_map: Option<TransientMap>,
}

#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct ProposalHeader {
    pub channel_id: String,
    pub tx_id: String,
    pub creator: Vec<u8>,
    pub nonce: Vec<u8>,
    /// Milliseconds since the unix epoch, UTC.
    pub timestamp: i64,
}

impl ProposalHeader {
    pub fn new(channel_id: &str, tx_id: &TransactionId) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            tx_id: tx_id.as_str().to_string(),
            creator: tx_id.creator().to_vec(),
            nonce: tx_id.nonce().to_vec(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct ProposalResponse {
    pub peer: String,
    pub status: u32,
    pub message: String,
    pub payload: Vec<u8>,
}

impl ProposalResponse {
    pub fn is_success(&self) -> bool {
        self.status == ENDORSEMENT_SUCCESS
    }
}

/// A peer that could not produce an endorsement, either because the call
/// itself failed or because the peer answered with a bad status.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerFailure {
    pub peer: String,
    pub status: Option<u32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PeerResponse {
    Endorsed(ProposalResponse),
    Failed(PeerFailure),
}

#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct CommitRequest {
    pub proposal: ChaincodeProposal,
    pub header: ProposalHeader,
    pub responses: Vec<ProposalResponse>,
}

#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct OrdererAck {
    pub status: String,
    pub info: Option<String>,
}

impl OrdererAck {
    pub fn is_success(&self) -> bool {
        self.status == ORDERER_SUCCESS
    }
}

#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct CommitEvent {
    pub tx_id: String,
    pub peer: String,
    pub validation_code: String,
}

impl CommitEvent {
    pub fn is_valid(&self) -> bool {
        self.validation_code == VALIDATION_VALID
    }
}

/// Frames a client sends to a peer's endorsement or event endpoint.
#[derive(Debug, Clone, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum PeerRequest {
    Propose {
        proposal: ChaincodeProposal,
        header: ProposalHeader,
    },
    SubscribeCommit {
        tx_id: String,
    },
}
