use crate::args::{validate, Argument};
use crate::commit;
use crate::endorsement::evaluate_responses;
use crate::error::{Error, Result};
use crate::event_handler::EventStrategyFactory;
use crate::network::Network;
use crate::proposal::build_proposal;
use gateway_common::{ProposalHeader, TransactionId, TransientMap};

use std::sync::Arc;

use log::{debug, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    Created,
    Submitting,
    Evaluating,
    Resolved,
    Failed,
}

/// One invocation of a chaincode function.
///
/// A transaction is either submitted or evaluated, once. Transient data and
/// the event strategy can only be changed before that.
pub struct Transaction {
    network: Arc<Network>,
    chaincode_id: String,
    name: String,
    tx_id: TransactionId,
    transient_map: Option<TransientMap>,
    event_strategy: Arc<dyn EventStrategyFactory>,
    strategy_overridden: bool,
    state: TransactionState,
}

impl Transaction {
    pub fn new(
        network: Arc<Network>,
        chaincode_id: impl Into<String>,
        name: impl Into<String>,
        tx_id: TransactionId,
    ) -> Self {
        let event_strategy = network.default_event_strategy();
        Self {
            network,
            chaincode_id: chaincode_id.into(),
            name: name.into(),
            tx_id,
            transient_map: None,
            event_strategy,
            strategy_overridden: false,
            state: TransactionState::Created,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.tx_id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn set_transient(&mut self, transient_map: TransientMap) -> Result<&mut Self> {
        self.expect_created("set transient data on")?;
        self.transient_map = Some(transient_map);
        Ok(self)
    }

    /// Replaces the network's default event strategy for this transaction.
    /// Allowed once, before submitting.
    pub fn set_event_handler_strategy<F>(&mut self, factory: F) -> Result<&mut Self>
    where
        F: EventStrategyFactory + 'static,
    {
        self.expect_created("change the event strategy of")?;
        if self.strategy_overridden {
            return Err(Error::InvalidState {
                state: self.state,
                operation: "override the event strategy twice on",
            });
        }
        self.event_strategy = Arc::new(factory);
        self.strategy_overridden = true;
        Ok(self)
    }

    /// Endorses, orders and waits for the commit of this transaction.
    ///
    /// Resolves to the payload of the first valid endorsement, or `None` if
    /// that payload is empty. A [`Error::CommitTimeout`] means the orderer
    /// accepted the transaction but the commit was not seen in time.
    pub async fn submit<I, A>(&mut self, args: I) -> Result<Option<Vec<u8>>>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        self.begin(TransactionState::Submitting, "submit")?;
        let args: Vec<Argument> = args.into_iter().map(Into::into).collect();
        let result = self.run_submit(&args).await;
        self.finish(&result);
        result
    }

    /// Runs the function on peers without ordering it.
    pub async fn evaluate<I, A>(&mut self, args: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        self.begin(TransactionState::Evaluating, "evaluate")?;
        let args: Vec<Argument> = args.into_iter().map(Into::into).collect();
        let result = self.run_evaluate(&args).await;
        self.finish(&result);
        result
    }

    async fn run_submit(&self, args: &[Argument]) -> Result<Option<Vec<u8>>> {
        let args = validate(args)?;
        let channel = self.network.channel();
        let proposal = build_proposal(
            &self.chaincode_id,
            &self.name,
            &self.tx_id,
            args,
            self.transient_map.as_ref(),
        );
        let header = ProposalHeader::new(channel.name(), &self.tx_id);

        debug!("sending proposal {} for {}", self.tx_id, self.name);
        let responses = channel
            .send_proposal(&proposal, &header)
            .await
            .map_err(Error::Transport)?;
        let endorsements = evaluate_responses(responses)?;
        let payload = endorsements.payload();

        let options = &self.network.options().event_handler_options;
        let mut event_handler = self.event_strategy.create(&self.tx_id, &self.network, options);
        event_handler.start_listening().await?;

        commit::send_to_orderer(channel.as_ref(), proposal, header, endorsements.valid).await?;

        trace!("waiting for commit of {}", self.tx_id);
        event_handler.wait_for_events().await?;
        Ok(payload)
    }

    async fn run_evaluate(&self, args: &[Argument]) -> Result<Vec<u8>> {
        let args = validate(args)?;
        debug!("evaluating {} as {}", self.name, self.tx_id);
        self.network
            .query_handler()
            .query_chaincode(
                &self.chaincode_id,
                &self.tx_id,
                &self.name,
                &args,
                self.transient_map.as_ref(),
            )
            .await
            .map_err(Error::from_query)
    }

    fn expect_created(&self, operation: &'static str) -> Result<()> {
        if self.state != TransactionState::Created {
            return Err(Error::InvalidState {
                state: self.state,
                operation,
            });
        }
        Ok(())
    }

    fn begin(&mut self, next: TransactionState, operation: &'static str) -> Result<()> {
        self.expect_created(operation)?;
        self.state = next;
        Ok(())
    }

    fn finish<T>(&mut self, result: &Result<T>) {
        self.state = match result {
            Ok(_) => TransactionState::Resolved,
            Err(e) => {
                warn!("transaction {} ({}) failed: {}", self.tx_id, self.name, e);
                TransactionState::Failed
            }
        };
    }
}
