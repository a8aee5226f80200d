//! LSP transport layer: `Content-Length`-framed JSON-RPC over any
//! [`BufRead`](std::io::BufRead)/[`Write`](std::io::Write) pair, normally
//! stdin/stdout.

#![deny(unsafe_code)]

mod framing;

pub use framing::{read_message, write_message, Frame};
