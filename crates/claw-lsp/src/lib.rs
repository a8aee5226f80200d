//! The claw/volt Language Server: request dispatch and process-wide state.

#![deny(unsafe_code)]

mod handlers;

use claw_analysis::DocumentStore;
use claw_protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use claw_transport::{read_message, write_message, Frame};
use std::io::{BufRead, Write};

/// Process-wide server state. The source keeps this as a set of globals;
/// here it is a single value constructed once in `main` and threaded into
/// every handler as an explicit parameter, which also documents the
/// single-threaded, strictly sequential dispatch discipline: no handler
/// ever runs concurrently with another.
#[derive(Default)]
pub struct Server {
    pub store: DocumentStore,
    pub workspace_root: Option<String>,
}

impl Server {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one request or notification. Returns any notifications that
    /// must be flushed first (diagnostics, mainly) and the response, if
    /// any — notifications never produce one.
    pub fn handle(&mut self, request: JsonRpcRequest) -> (Vec<JsonRpcNotification>, Option<JsonRpcResponse>) {
        handlers::dispatch(self, request)
    }

    /// Run the read-dispatch-respond loop until EOF or a framing failure
    /// severe enough that the read loop cannot recover. One message is
    /// read, handled, and responded to before the next is read.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: &mut R, writer: &mut W, log: bool) -> std::io::Result<()> {
        loop {
            match read_message(reader)? {
                Frame::Eof => {
                    if log {
                        eprintln!("claw-lsp: end of input, shutting down");
                    }
                    return Ok(());
                }
                Frame::Invalid => continue,
                Frame::Request(request) => {
                    if log {
                        eprintln!("claw-lsp: received {}", request.method);
                    }
                    let (notifications, response) = self.handle(request);
                    for notification in notifications {
                        write_message(writer, &notification.to_value())?;
                    }
                    if let Some(response) = response {
                        write_message(writer, &response.to_value())?;
                    }
                }
            }
        }
    }
}
