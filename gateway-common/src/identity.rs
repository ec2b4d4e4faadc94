use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

pub const NONCE_LENGTH: usize = 24;

/// Identity of a single invocation.
///
/// The textual id is the hex encoded SHA-256 of `nonce || creator`, so two
/// transactions from the same creator differ only by their nonce.
#[derive(Clone, Debug, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub struct TransactionId {
    id: String,
    nonce: Vec<u8>,
    creator: Vec<u8>,
}

impl TransactionId {
    pub fn new(creator: &[u8]) -> Self {
        Self::from_parts(generate_nonce(), creator.to_vec())
    }

    pub fn from_parts(nonce: Vec<u8>, creator: Vec<u8>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&nonce);
        hasher.update(&creator);
        let id = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Self { id, nonce, creator }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    pub fn creator(&self) -> &[u8] {
        &self.creator
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

fn generate_nonce() -> Vec<u8> {
    let mut rng = thread_rng();
    let mut result = vec![0; NONCE_LENGTH];
    rng.fill(&mut result[..]);
    result
}
