pub mod client;
pub mod core;
pub mod reports;
pub mod security;

#[cfg(test)]
mod test_server;

pub use client::{build_client, build_client_with_transport, execute, ClientHandle, DateRange, RowStream};
pub use self::core::*;
pub use reports::*;
pub use security::{load_credentials, Credential};
