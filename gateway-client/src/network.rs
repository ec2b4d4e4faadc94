use crate::contract::Contract;
use crate::event_handler::{EventHandlerOptions, EventHub, EventStrategyFactory};
use crate::query_handler::{PeerQueryHandler, QueryHandler, QueryStrategy};
use gateway_common::{
    ChaincodeProposal, CommitRequest, OrdererAck, PeerResponse, ProposalHeader, TransactionId,
};

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerInfo {
    pub name: String,
    pub msp_id: String,
}

/// Transport to the peers and the ordering service of one channel.
///
/// Implementations own connection handling, signing and retries. Errors are
/// returned to the caller of submit/evaluate as they are.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Endorsing peers of the channel, in the order they are asked.
    fn peers(&self) -> Vec<PeerInfo>;

    /// Sends a proposal to every endorsing peer. A peer that fails is
    /// reported as [`PeerResponse::Failed`] instead of failing the call.
    async fn send_proposal(
        &self,
        proposal: &ChaincodeProposal,
        header: &ProposalHeader,
    ) -> Result<Vec<PeerResponse>>;

    async fn send_proposal_to(
        &self,
        peer: &str,
        proposal: &ChaincodeProposal,
        header: &ProposalHeader,
    ) -> Result<PeerResponse>;

    async fn send_to_orderer(&self, request: CommitRequest) -> Result<OrdererAck>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub msp_id: String,
    pub creator: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkOptions {
    pub event_handler_options: EventHandlerOptions,
    pub query_strategy: QueryStrategy,
}

/// Everything a transaction needs from its surroundings: the channel, the
/// submitting identity, commit event sources and the default strategies.
///
/// Shared by any number of concurrent transactions.
pub struct Network {
    channel: Arc<dyn Channel>,
    identity: Identity,
    event_hubs: Vec<Arc<dyn EventHub>>,
    options: NetworkOptions,
    query_handler: Arc<dyn QueryHandler>,
    event_strategy: Arc<dyn EventStrategyFactory>,
}

impl Network {
    pub fn new(
        channel: Arc<dyn Channel>,
        identity: Identity,
        event_hubs: Vec<Arc<dyn EventHub>>,
        options: NetworkOptions,
    ) -> Self {
        let org_peers = channel
            .peers()
            .into_iter()
            .filter(|peer| peer.msp_id == identity.msp_id)
            .map(|peer| peer.name)
            .collect();
        let query_handler: Arc<dyn QueryHandler> = Arc::new(PeerQueryHandler::new(
            channel.clone(),
            org_peers,
            options.query_strategy,
        ));
        let event_strategy: Arc<dyn EventStrategyFactory> =
            Arc::new(options.event_handler_options.strategy);
        Self {
            channel,
            identity,
            event_hubs,
            options,
            query_handler,
            event_strategy,
        }
    }

    pub fn with_query_handler(mut self, query_handler: Arc<dyn QueryHandler>) -> Self {
        self.query_handler = query_handler;
        self
    }

    pub fn contract(self: &Arc<Self>, chaincode_id: &str) -> Contract {
        Contract::new(self.clone(), chaincode_id, None)
    }

    pub fn contract_with_namespace(
        self: &Arc<Self>,
        chaincode_id: &str,
        namespace: &str,
    ) -> Contract {
        Contract::new(self.clone(), chaincode_id, Some(namespace))
    }

    pub fn new_transaction_id(&self) -> TransactionId {
        TransactionId::new(&self.identity.creator)
    }

    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn event_hubs(&self) -> &[Arc<dyn EventHub>] {
        &self.event_hubs
    }

    pub fn options(&self) -> &NetworkOptions {
        &self.options
    }

    pub fn query_handler(&self) -> &Arc<dyn QueryHandler> {
        &self.query_handler
    }

    pub fn default_event_strategy(&self) -> Arc<dyn EventStrategyFactory> {
        self.event_strategy.clone()
    }
}
