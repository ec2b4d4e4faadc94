pub mod args;
pub mod client;
pub mod commit;
pub mod config;
pub mod contract;
pub mod endorsement;
pub mod error;
pub mod event_handler;
pub mod event_strategy;
pub mod invocation;
pub mod network;
pub mod proposal;
pub mod query_handler;
pub mod transaction;
pub mod transport;

#[cfg(test)]
mod testing;

pub use args::Argument;
pub use contract::Contract;
pub use error::{Error, Result};
pub use event_handler::{
    EventHandlerOptions, EventHub, EventStrategy, EventStrategyFactory, TransactionEventHandler,
};
pub use network::{Channel, Identity, Network, NetworkOptions, PeerInfo};
pub use query_handler::{QueryHandler, QueryStrategy};
pub use transaction::{Transaction, TransactionState};
