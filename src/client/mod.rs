//! Client factory, query executor and the HTTP transport behind them

pub mod executor;
pub mod factory;
pub mod gaql;
pub mod http;

pub use executor::{execute, RowStream};
pub use factory::{build_client, build_client_with_transport, ClientHandle};
pub use gaql::DateRange;
pub use http::HttpSearchTransport;
