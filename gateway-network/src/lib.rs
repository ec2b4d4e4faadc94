pub mod client;
pub mod common;
pub mod server;

pub use client::Client;
pub use server::Server;
