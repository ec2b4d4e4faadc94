use crate::error::Result;
use crate::event_strategy::{CommitWaiter, HubScope, WaitPolicy};
use crate::network::Network;
use gateway_common::{CommitEvent, TransactionId};

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

pub const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Waits for commit confirmation of one submitted transaction.
///
/// `start_listening` is called before the transaction goes to the orderer,
/// so no commit event can be missed; `wait_for_events` afterwards.
#[async_trait]
pub trait TransactionEventHandler: Send {
    async fn start_listening(&mut self) -> Result<()>;

    async fn wait_for_events(&mut self) -> Result<()>;
}

/// Builds the event handler for a transaction.
///
/// Any `Fn(&TransactionId, &Network, &EventHandlerOptions)` returning a
/// boxed handler is a factory.
pub trait EventStrategyFactory: Send + Sync {
    fn create(
        &self,
        tx_id: &TransactionId,
        network: &Network,
        options: &EventHandlerOptions,
    ) -> Box<dyn TransactionEventHandler>;
}

impl<F> EventStrategyFactory for F
where
    F: Fn(&TransactionId, &Network, &EventHandlerOptions) -> Box<dyn TransactionEventHandler>
        + Send
        + Sync,
{
    fn create(
        &self,
        tx_id: &TransactionId,
        network: &Network,
        options: &EventHandlerOptions,
    ) -> Box<dyn TransactionEventHandler> {
        self(tx_id, network, options)
    }
}

/// A source of commit events, usually one peer.
#[async_trait]
pub trait EventHub: Send + Sync {
    fn name(&self) -> &str;

    fn msp_id(&self) -> &str;

    /// Registers interest in the commit of `tx_id`. The receiver yields the
    /// commit event once; a dropped sender means the hub disconnected.
    async fn register_commit_listener(
        &self,
        tx_id: &TransactionId,
    ) -> anyhow::Result<oneshot::Receiver<CommitEvent>>;
}

/// Built-in strategies.
///
/// `MspScope*` listens to the hubs of the client's own organisation,
/// `NetworkScope*` to every hub. `*AllForTx` waits for every hub to report,
/// `*AnyForTx` for the first one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStrategy {
    #[default]
    MspScopeAllForTx,
    MspScopeAnyForTx,
    NetworkScopeAllForTx,
    NetworkScopeAnyForTx,
}

impl EventStrategy {
    fn scope(&self) -> HubScope {
        match self {
            EventStrategy::MspScopeAllForTx | EventStrategy::MspScopeAnyForTx => HubScope::Msp,
            EventStrategy::NetworkScopeAllForTx | EventStrategy::NetworkScopeAnyForTx => {
                HubScope::Network
            }
        }
    }

    fn policy(&self) -> WaitPolicy {
        match self {
            EventStrategy::MspScopeAllForTx | EventStrategy::NetworkScopeAllForTx => {
                WaitPolicy::All
            }
            EventStrategy::MspScopeAnyForTx | EventStrategy::NetworkScopeAnyForTx => {
                WaitPolicy::Any
            }
        }
    }
}

impl EventStrategyFactory for EventStrategy {
    fn create(
        &self,
        tx_id: &TransactionId,
        network: &Network,
        options: &EventHandlerOptions,
    ) -> Box<dyn TransactionEventHandler> {
        Box::new(CommitWaiter::new(
            tx_id.clone(),
            self.scope().select(network),
            self.policy(),
            options.commit_timeout,
        ))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EventHandlerOptions {
    pub commit_timeout: Duration,
    pub strategy: EventStrategy,
}

impl Default for EventHandlerOptions {
    fn default() -> Self {
        Self {
            commit_timeout: DEFAULT_COMMIT_TIMEOUT,
            strategy: EventStrategy::default(),
        }
    }
}
