//! JSON-RPC/LSP protocol types and capability configuration for claw-lsp.

#![deny(unsafe_code)]

mod capabilities;
mod jsonrpc;
pub mod methods;

pub use capabilities::server_capabilities;
pub use jsonrpc::{JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
