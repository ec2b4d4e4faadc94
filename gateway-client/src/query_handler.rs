use crate::error::Error;
use crate::network::Channel;
use crate::proposal::build_proposal;
use gateway_common::{PeerFailure, PeerResponse, ProposalHeader, TransactionId, TransientMap};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Resolves read-only invocations. Owns peer selection, failover and the
/// choice of which answer to return.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    async fn query_chaincode(
        &self,
        chaincode_id: &str,
        tx_id: &TransactionId,
        fcn: &str,
        args: &[String],
        transient_map: Option<&TransientMap>,
    ) -> Result<Vec<u8>>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStrategy {
    /// Stick to the last peer that answered, moving on only when it fails.
    #[default]
    MspScopeSingle,
    /// Start each query at the next peer in turn.
    MspScopeRoundRobin,
}

/// Queries the organisation's own peers one at a time until one answers.
pub struct PeerQueryHandler {
    channel: Arc<dyn Channel>,
    peers: Vec<String>,
    strategy: QueryStrategy,
    cursor: AtomicUsize,
}

impl PeerQueryHandler {
    pub fn new(channel: Arc<dyn Channel>, peers: Vec<String>, strategy: QueryStrategy) -> Self {
        Self {
            channel,
            peers,
            strategy,
            cursor: AtomicUsize::new(0),
        }
    }

    fn first_peer(&self) -> usize {
        match self.strategy {
            QueryStrategy::MspScopeSingle => self.cursor.load(Ordering::Relaxed),
            QueryStrategy::MspScopeRoundRobin => self.cursor.fetch_add(1, Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl QueryHandler for PeerQueryHandler {
    async fn query_chaincode(
        &self,
        chaincode_id: &str,
        tx_id: &TransactionId,
        fcn: &str,
        args: &[String],
        transient_map: Option<&TransientMap>,
    ) -> Result<Vec<u8>> {
        let proposal = build_proposal(chaincode_id, fcn, tx_id, args.to_vec(), transient_map);
        let header = ProposalHeader::new(self.channel.name(), tx_id);

        let mut failures = Vec::new();
        let start = self.first_peer();
        for offset in 0..self.peers.len() {
            let index = (start + offset) % self.peers.len();
            let peer = &self.peers[index];
            let failure = match self.channel.send_proposal_to(peer, &proposal, &header).await {
                Ok(PeerResponse::Endorsed(response)) if response.is_success() => {
                    debug!("{} answered query {}", peer, tx_id);
                    if self.strategy == QueryStrategy::MspScopeSingle {
                        self.cursor.store(index, Ordering::Relaxed);
                    }
                    return Ok(response.payload);
                }
                Ok(PeerResponse::Endorsed(response)) => PeerFailure {
                    peer: peer.clone(),
                    status: Some(response.status),
                    message: response.message,
                },
                Ok(PeerResponse::Failed(failure)) => failure,
                Err(e) => PeerFailure {
                    peer: peer.clone(),
                    status: None,
                    message: e.to_string(),
                },
            };
            warn!("query {} failed on {}: {}", tx_id, peer, failure.message);
            failures.push(failure);
        }
        Err(Error::QueryFailed(failures).into())
    }
}
