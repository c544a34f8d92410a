//! Client-side JSON-RPC support for the CLI commands that talk to a running
//! Siteforge server over its Unix socket.

mod transport;

pub use transport::{ClientRequest, ConnectionState, JsonRpcClient};
