//! Channel and event hubs over the framed TCP transport.
//!
//! Every frame is a borsh encoded message from `gateway-common`: peers take
//! a [`PeerRequest`] and answer a proposal with a [`ProposalResponse`] or a
//! commit subscription with a stream of [`CommitEvent`]s; the orderer takes
//! a [`CommitRequest`] and answers with an [`OrdererAck`].

use crate::event_handler::EventHub;
use crate::network::{Channel, PeerInfo};
use gateway_common::{
    ChaincodeProposal, CommitEvent, CommitRequest, OrdererAck, PeerFailure, PeerRequest,
    PeerResponse, ProposalHeader, ProposalResponse, TransactionId,
};
use gateway_network::Client;

use std::net::SocketAddr;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use borsh::{BorshDeserialize, BorshSerialize};
use futures::future::join_all;
use log::{trace, warn};
use tokio::sync::oneshot;

#[derive(Clone, Debug)]
pub struct PeerEndpoint {
    pub info: PeerInfo,
    pub addr: SocketAddr,
}

pub struct TcpChannel {
    name: String,
    peers: Vec<PeerEndpoint>,
    orderer_addr: SocketAddr,
    client: Client,
}

impl TcpChannel {
    pub fn new(
        name: &str,
        peers: Vec<PeerEndpoint>,
        orderer_addr: SocketAddr,
        client: Client,
    ) -> Self {
        Self {
            name: name.to_string(),
            peers,
            orderer_addr,
            client,
        }
    }

    async fn propose(
        &self,
        peer: &PeerEndpoint,
        proposal: &ChaincodeProposal,
        header: &ProposalHeader,
    ) -> PeerResponse {
        let result = async {
            let request = PeerRequest::Propose {
                proposal: proposal.clone(),
                header: header.clone(),
            }
            .try_to_vec()?;
            let reply = self.client.request(peer.addr, request.into()).await?;
            Ok::<_, anyhow::Error>(ProposalResponse::try_from_slice(&reply)?)
        }
        .await;

        match result {
            Ok(response) => {
                trace!("{} answered {} with {}", peer.info.name, proposal.tx_id, response.status);
                PeerResponse::Endorsed(response)
            }
            Err(e) => PeerResponse::Failed(PeerFailure {
                peer: peer.info.name.clone(),
                status: None,
                message: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Channel for TcpChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn peers(&self) -> Vec<PeerInfo> {
        self.peers.iter().map(|peer| peer.info.clone()).collect()
    }

    async fn send_proposal(
        &self,
        proposal: &ChaincodeProposal,
        header: &ProposalHeader,
    ) -> Result<Vec<PeerResponse>> {
        Ok(join_all(
            self.peers
                .iter()
                .map(|peer| self.propose(peer, proposal, header)),
        )
        .await)
    }

    async fn send_proposal_to(
        &self,
        peer: &str,
        proposal: &ChaincodeProposal,
        header: &ProposalHeader,
    ) -> Result<PeerResponse> {
        let endpoint = self
            .peers
            .iter()
            .find(|endpoint| endpoint.info.name == peer)
            .ok_or_else(|| anyhow!("peer {} is not part of channel {}", peer, self.name))?;
        Ok(self.propose(endpoint, proposal, header).await)
    }

    async fn send_to_orderer(&self, request: CommitRequest) -> Result<OrdererAck> {
        let reply = self
            .client
            .request(self.orderer_addr, request.try_to_vec()?.into())
            .await?;
        Ok(OrdererAck::try_from_slice(&reply)?)
    }
}

/// Commit events from one peer. Each registration opens its own
/// subscription, closed once the event for that transaction arrived.
pub struct TcpEventHub {
    name: String,
    msp_id: String,
    addr: SocketAddr,
    client: Client,
}

impl TcpEventHub {
    pub fn new(name: &str, msp_id: &str, addr: SocketAddr, client: Client) -> Self {
        Self {
            name: name.to_string(),
            msp_id: msp_id.to_string(),
            addr,
            client,
        }
    }
}

#[async_trait]
impl EventHub for TcpEventHub {
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
        let subscription = PeerRequest::SubscribeCommit {
            tx_id: tx_id.to_string(),
        }
        .try_to_vec()?;
        let mut frames = self.client.subscribe(self.addr, subscription.into()).await?;
        let (mut sender, receiver) = oneshot::channel();
        let hub = self.name.clone();
        let tx_id = tx_id.to_string();
        // Returning drops both the sender, which tells the waiter this hub is
        // gone, and the subscription, which closes the connection.
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = frames.recv() => match frame {
                        Some(frame) => match CommitEvent::try_from_slice(&frame) {
                            Ok(event) if event.tx_id == tx_id => {
                                let _ = sender.send(event);
                                return;
                            }
                            Ok(event) => {
                                trace!("{} sent unrelated event for {}", hub, event.tx_id)
                            }
                            Err(e) => {
                                warn!("{} sent an undecodable event: {}", hub, e);
                                return;
                            }
                        },
                        None => return,
                    },
                    _ = sender.closed() => {
                        trace!("stopped listening on {} for {}", hub, tx_id);
                        return;
                    }
                }
            }
        });
        Ok(receiver)
    }
}
