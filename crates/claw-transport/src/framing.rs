use claw_protocol::JsonRpcRequest;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};

/// Outcome of reading one framed message.
pub enum Frame {
    /// A well-formed request or notification body.
    Request(JsonRpcRequest),
    /// The frame was read but its body wasn't a usable JSON-RPC message
    /// (bad JSON, missing `method`). The caller should swallow it and keep
    /// reading — no response is sent.
    Invalid,
    /// End of stream, or framing broke down badly enough that the read
    /// loop cannot recover (missing `Content-Length`, truncated body).
    /// The caller should stop reading.
    Eof,
}

/// Read one `Content-Length`-framed message from `reader`.
///
/// Only the `Content-Length` header is honored; any other header line is
/// parsed but otherwise ignored, matching the base protocol's "headers
/// other than Content-Length may be present and are ignored" rule.
pub fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Frame> {
    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(Frame::Eof);
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    let Some(length) = headers.get("Content-Length").and_then(|v| v.parse::<usize>().ok()) else {
        return Ok(Frame::Eof);
    };

    let mut body = vec![0u8; length];
    let mut read = 0;
    while read < length {
        match reader.read(&mut body[read..])? {
            0 => return Ok(Frame::Eof),
            n => read += n,
        }
    }

    let Ok(text) = String::from_utf8(body) else {
        return Ok(Frame::Invalid);
    };
    let Ok(value) = claw_json::parse(&text) else {
        return Ok(Frame::Invalid);
    };
    match JsonRpcRequest::from_value(&value) {
        Some(request) => Ok(Frame::Request(request)),
        None => Ok(Frame::Invalid),
    }
}

/// Write a framed JSON payload to `writer` and flush it.
pub fn write_message<W: Write>(writer: &mut W, value: &claw_json::Value) -> io::Result<()> {
    let body = claw_json::stringify(value);
    write!(writer, "Content-Length: {}\r\n\r\n{}", body.len(), body)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use claw_protocol::JsonRpcResponse;
    use std::io::Cursor;

    fn framed(body: &str) -> Vec<u8> {
        format!("Content-Length: {}\r\n\r\n{}", body.len(), body).into_bytes()
    }

    #[test]
    fn reads_a_well_formed_request() {
        let raw = framed(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#);
        let mut cursor = Cursor::new(raw);
        match read_message(&mut cursor).unwrap() {
            Frame::Request(req) => assert_eq!(req.method, "initialize"),
            _ => panic!("expected a request"),
        }
    }

    #[test]
    fn reads_multiple_headers_honoring_only_content_length() {
        let body = r#"{"jsonrpc":"2.0","method":"textDocument/didOpen","params":{}}"#;
        let raw = format!("Content-Type: application/vscode-jsonrpc\r\nContent-Length: {}\r\n\r\n{}", body.len(), body);
        let mut cursor = Cursor::new(raw.into_bytes());
        match read_message(&mut cursor).unwrap() {
            Frame::Request(req) => assert!(req.is_notification()),
            _ => panic!("expected a request"),
        }
    }

    #[test]
    fn empty_stream_is_eof() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(matches!(read_message(&mut cursor).unwrap(), Frame::Eof));
    }

    #[test]
    fn truncated_body_is_eof() {
        let raw = b"Content-Length: 100\r\n\r\n{\"short\":true}".to_vec();
        let mut cursor = Cursor::new(raw);
        assert!(matches!(read_message(&mut cursor).unwrap(), Frame::Eof));
    }

    #[test]
    fn malformed_json_body_is_invalid_not_eof() {
        let raw = framed("{not json");
        let mut cursor = Cursor::new(raw);
        assert!(matches!(read_message(&mut cursor).unwrap(), Frame::Invalid));
    }

    #[test]
    fn write_then_read_round_trips() {
        let resp = JsonRpcResponse::success(Some(claw_json::Value::from(1i64)), claw_json::Value::from("ok"));
        let mut out = Vec::new();
        write_message(&mut out, &resp.to_value()).unwrap();
        let mut cursor = Cursor::new(out);
        let mut line = String::new();
        cursor.read_line(&mut line).unwrap();
        assert!(line.starts_with("Content-Length:"));
    }
}
