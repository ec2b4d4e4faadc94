//! In-memory collaborators shared by the unit tests.

use crate::event_handler::EventHub;
use crate::network::{Channel, Identity, PeerInfo};
use crate::query_handler::QueryHandler;
use gateway_common::{
    ChaincodeProposal, CommitEvent, CommitRequest, OrdererAck, PeerResponse, ProposalHeader,
    ProposalResponse, TransactionId, TransientMap,
};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::oneshot;

pub fn identity() -> Identity {
    Identity {
        msp_id: "Org1MSP".to_string(),
        creator: b"user1@org1".to_vec(),
    }
}

pub fn endorsed(peer: &str, status: u32, payload: &[u8]) -> PeerResponse {
    PeerResponse::Endorsed(ProposalResponse {
        peer: peer.to_string(),
        status,
        message: if status == 200 {
            String::new()
        } else {
            "chaincode error".to_string()
        },
        payload: payload.to_vec(),
    })
}

pub type Journal = Arc<Mutex<Vec<String>>>;

pub struct RecordingChannel {
    pub responses: Vec<PeerResponse>,
    pub peer_responses: HashMap<String, PeerResponse>,
    pub ack_status: String,
    pub transport_error: Option<String>,
    pub peers: Vec<PeerInfo>,
    pub proposals: Mutex<Vec<ChaincodeProposal>>,
    pub headers: Mutex<Vec<ProposalHeader>>,
    pub commits: Mutex<Vec<CommitRequest>>,
    pub journal: Journal,
}

impl RecordingChannel {
    pub fn new(responses: Vec<PeerResponse>) -> Self {
        Self {
            responses,
            ..Default::default()
        }
    }
}

impl Default for RecordingChannel {
    fn default() -> Self {
        let peer = |name: &str, msp_id: &str| PeerInfo {
            name: name.to_string(),
            msp_id: msp_id.to_string(),
        };
        Self {
            responses: Vec::new(),
            peer_responses: HashMap::new(),
            ack_status: "SUCCESS".to_string(),
            transport_error: None,
            peers: vec![
                peer("peer0.org1", "Org1MSP"),
                peer("peer1.org1", "Org1MSP"),
                peer("peer0.org2", "Org2MSP"),
            ],
            proposals: Default::default(),
            headers: Default::default(),
            commits: Default::default(),
            journal: Default::default(),
        }
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "mychannel"
    }

    fn peers(&self) -> Vec<PeerInfo> {
        self.peers.clone()
    }

    async fn send_proposal(
        &self,
        proposal: &ChaincodeProposal,
        header: &ProposalHeader,
    ) -> Result<Vec<PeerResponse>> {
        self.journal.lock().unwrap().push("send_proposal".to_string());
        if let Some(e) = &self.transport_error {
            return Err(anyhow!(e.clone()));
        }
        self.proposals.lock().unwrap().push(proposal.clone());
        self.headers.lock().unwrap().push(header.clone());
        Ok(self.responses.clone())
    }

    async fn send_proposal_to(
        &self,
        peer: &str,
        proposal: &ChaincodeProposal,
        _header: &ProposalHeader,
    ) -> Result<PeerResponse> {
        self.journal.lock().unwrap().push(format!("query:{}", peer));
        self.proposals.lock().unwrap().push(proposal.clone());
        self.peer_responses
            .get(peer)
            .cloned()
            .ok_or_else(|| anyhow!("{} unreachable", peer))
    }

    async fn send_to_orderer(&self, request: CommitRequest) -> Result<OrdererAck> {
        self.journal.lock().unwrap().push("send_to_orderer".to_string());
        self.commits.lock().unwrap().push(request);
        Ok(OrdererAck {
            status: self.ack_status.clone(),
            info: None,
        })
    }
}

pub struct MemoryEventHub {
    name: String,
    msp_id: String,
    listeners: Mutex<HashMap<String, oneshot::Sender<CommitEvent>>>,
}

impl MemoryEventHub {
    pub fn new(name: &str, msp_id: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            msp_id: msp_id.to_string(),
            listeners: Default::default(),
        })
    }

    pub fn commit(&self, tx_id: &TransactionId, validation_code: &str) {
        if let Some(listener) = self.listeners.lock().unwrap().remove(tx_id.as_str()) {
            let _ = listener.send(CommitEvent {
                tx_id: tx_id.to_string(),
                peer: self.name.clone(),
                validation_code: validation_code.to_string(),
            });
        }
    }

    pub fn disconnect(&self, tx_id: &TransactionId) {
        self.listeners.lock().unwrap().remove(tx_id.as_str());
    }

    pub fn is_listening(&self, tx_id: &TransactionId) -> bool {
        self.listeners.lock().unwrap().contains_key(tx_id.as_str())
    }
}

#[async_trait]
impl EventHub for MemoryEventHub {
    fn name(&self) -> &str {
        &self.name
    }

    fn msp_id(&self) -> &str {
        &self.msp_id
    }

    async fn register_commit_listener(
        &self,
        tx_id: &TransactionId,
    ) -> Result<oneshot::Receiver<CommitEvent>> {
        let (sender, receiver) = oneshot::channel();
        self.listeners
            .lock()
            .unwrap()
            .insert(tx_id.to_string(), sender);
        Ok(receiver)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryCall {
    pub chaincode_id: String,
    pub tx_id: TransactionId,
    pub fcn: String,
    pub args: Vec<String>,
    pub transient_map: Option<TransientMap>,
}

#[derive(Default)]
pub struct ScriptedQueryHandler {
    pub result: Option<Vec<u8>>,
    pub calls: Mutex<Vec<QueryCall>>,
}

impl ScriptedQueryHandler {
    pub fn returning(payload: &[u8]) -> Self {
        Self {
            result: Some(payload.to_vec()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl QueryHandler for ScriptedQueryHandler {
    async fn query_chaincode(
        &self,
        chaincode_id: &str,
        tx_id: &TransactionId,
        fcn: &str,
        args: &[String],
        transient_map: Option<&TransientMap>,
    ) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(QueryCall {
            chaincode_id: chaincode_id.to_string(),
            tx_id: tx_id.clone(),
            fcn: fcn.to_string(),
            args: args.to_vec(),
            transient_map: transient_map.cloned(),
        });
        self.result
            .clone()
            .ok_or_else(|| anyhow!("query handler failed"))
    }
}
