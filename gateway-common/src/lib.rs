pub mod identity;
pub mod message;

pub use identity::TransactionId;
pub use message::*;
