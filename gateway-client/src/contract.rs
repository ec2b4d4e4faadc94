use crate::args::Argument;
use crate::error::Result;
use crate::network::Network;
use crate::transaction::Transaction;

use std::sync::Arc;

/// A chaincode deployed on the network, optionally narrowed to one
/// namespace (smart contract) inside it.
#[derive(Clone)]
pub struct Contract {
    network: Arc<Network>,
    chaincode_id: String,
    namespace: Option<String>,
}

impl Contract {
    pub fn new(network: Arc<Network>, chaincode_id: &str, namespace: Option<&str>) -> Self {
        Self {
            network,
            chaincode_id: chaincode_id.to_string(),
            namespace: namespace.map(ToString::to_string),
        }
    }

    pub fn chaincode_id(&self) -> &str {
        &self.chaincode_id
    }

    /// Fresh transaction with its own identity. Names are qualified as
    /// `namespace:name` when the contract has a namespace.
    pub fn create_transaction(&self, name: &str) -> Transaction {
        let qualified = match &self.namespace {
            Some(namespace) => format!("{}:{}", namespace, name),
            None => name.to_string(),
        };
        Transaction::new(
            self.network.clone(),
            self.chaincode_id.clone(),
            qualified,
            self.network.new_transaction_id(),
        )
    }

    pub async fn submit_transaction<I, A>(&self, name: &str, args: I) -> Result<Option<Vec<u8>>>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        self.create_transaction(name).submit(args).await
    }

    pub async fn evaluate_transaction<I, A>(&self, name: &str, args: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        self.create_transaction(name).evaluate(args).await
    }
}
