use crate::error::{Error, Result};
use crate::event_handler::{EventHub, TransactionEventHandler};
use crate::network::Network;
use gateway_common::{CommitEvent, TransactionId};

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, trace, warn};
use tokio::{sync::oneshot, time};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HubScope {
    /// Hubs of the submitting organisation only.
    Msp,
    Network,
}

impl HubScope {
    pub fn select(&self, network: &Network) -> Vec<Arc<dyn EventHub>> {
        network
            .event_hubs()
            .iter()
            .filter(|hub| match self {
                HubScope::Msp => hub.msp_id() == network.identity().msp_id,
                HubScope::Network => true,
            })
            .cloned()
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitPolicy {
    All,
    Any,
}

/// Counts commit events from a fixed set of hubs.
///
/// A hub that disconnects counts as answered without confirming. The wait
/// succeeds once the policy is met and at least one hub confirmed; a hub
/// reporting the transaction as invalid fails it straight away.
pub struct CommitWaiter {
    tx_id: TransactionId,
    hubs: Vec<Arc<dyn EventHub>>,
    policy: WaitPolicy,
    timeout: Duration,
    listeners: Vec<(String, oneshot::Receiver<CommitEvent>)>,
}

impl CommitWaiter {
    pub fn new(
        tx_id: TransactionId,
        hubs: Vec<Arc<dyn EventHub>>,
        policy: WaitPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            tx_id,
            hubs,
            policy,
            timeout,
            listeners: Vec::new(),
        }
    }

    async fn collect(&mut self) -> Result<()> {
        let mut pending: FuturesUnordered<_> = mem::take(&mut self.listeners)
            .into_iter()
            .map(|(hub, listener)| async move { (hub, listener.await) })
            .collect();

        let mut committed = 0;
        while let Some((hub, outcome)) = pending.next().await {
            match outcome {
                Ok(event) if event.is_valid() => {
                    debug!("{} confirmed commit of {}", hub, self.tx_id);
                    committed += 1;
                    if self.policy == WaitPolicy::Any {
                        return Ok(());
                    }
                }
                Ok(event) => {
                    return Err(Error::CommitRejected {
                        tx_id: self.tx_id.to_string(),
                        peer: event.peer,
                        code: event.validation_code,
                    })
                }
                Err(_) => warn!("event hub {} disconnected before {} committed", hub, self.tx_id),
            }
        }

        if committed == 0 {
            return Err(Error::EventHubsUnavailable {
                tx_id: self.tx_id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionEventHandler for CommitWaiter {
    async fn start_listening(&mut self) -> Result<()> {
        for hub in &self.hubs {
            match hub.register_commit_listener(&self.tx_id).await {
                Ok(listener) => {
                    trace!("listening on {} for {}", hub.name(), self.tx_id);
                    self.listeners.push((hub.name().to_string(), listener));
                }
                Err(e) => warn!("cannot listen on event hub {}: {}", hub.name(), e),
            }
        }
        Ok(())
    }

    async fn wait_for_events(&mut self) -> Result<()> {
        if self.hubs.is_empty() {
            warn!("no event hubs to wait on for {}, not waiting", self.tx_id);
            return Ok(());
        }
        let timeout = self.timeout;
        let outcome = time::timeout(timeout, self.collect()).await;
        match outcome {
            Ok(result) => result,
            Err(_) => Err(Error::CommitTimeout {
                tx_id: self.tx_id.to_string(),
                timeout,
            }),
        }
    }
}
