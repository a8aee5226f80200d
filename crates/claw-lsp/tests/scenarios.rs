//! End-to-end handler scenarios, driven through `Server::handle` directly
//! rather than the stdio transport.

use claw_json::Value;
use claw_lsp::Server;
use claw_protocol::{methods, JsonRpcRequest};

fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
    JsonRpcRequest { id: Some(Value::from(id)), method: method.to_string(), params }
}

fn notification(method: &str, params: Value) -> JsonRpcRequest {
    JsonRpcRequest { id: None, method: method.to_string(), params }
}

fn text_document(uri: &str) -> Value {
    let mut obj = Value::object();
    obj.insert("uri", Value::from(uri));
    obj
}

fn did_open_params(uri: &str, text: &str) -> Value {
    let mut text_doc = Value::object();
    text_doc.insert("uri", Value::from(uri));
    text_doc.insert("text", Value::from(text));
    let mut params = Value::object();
    params.insert("textDocument", text_doc);
    params
}

fn position(line: i64, character: i64) -> Value {
    let mut p = Value::object();
    p.insert("line", Value::from(line));
    p.insert("character", Value::from(character));
    p
}

fn open(server: &mut Server, uri: &str, text: &str) {
    let (_notifications, response) = server.handle(notification(methods::DID_OPEN, did_open_params(uri, text)));
    assert!(response.is_none());
}

#[test]
fn s1_top_level_symbol_resolution() {
    let mut server = Server::new();
    open(&mut server, "file:///s1.claw", "let x = 42\nlet y = x\n");

    let mut params = Value::object();
    params.insert("textDocument", text_document("file:///s1.claw"));
    let (_n, response) = server.handle(request(1, methods::DOCUMENT_SYMBOL, params));
    let result = response.unwrap().result.unwrap();
    let names: Vec<&str> = result.as_array().unwrap().iter().filter_map(|s| s.get_str("name")).collect();
    assert!(names.contains(&"x"));
    assert!(names.contains(&"y"));
}

#[test]
fn s2_unknown_identifier_publishes_diagnostic() {
    let mut server = Server::new();
    let (notifications, _) = server.handle(notification(methods::DID_OPEN, did_open_params("file:///s2.claw", "let a = b\n")));
    assert_eq!(notifications.len(), 1);
    let params = &notifications[0].params;
    let diagnostics = params.get_array("diagnostics").unwrap();
    let warning = diagnostics.iter().find(|d| d.get_f64("severity") == Some(2.0)).unwrap();
    assert_eq!(warning.get_str("message"), Some("Unknown identifier"));
}

#[test]
fn s3_formatter_idempotence_through_formatting_handler() {
    let mut server = Server::new();
    open(&mut server, "file:///s3.claw", "fn f(a,b){return a+b;}");

    let mut params = Value::object();
    params.insert("textDocument", text_document("file:///s3.claw"));
    let (_n, response) = server.handle(request(1, methods::FORMATTING, params));
    let result = response.unwrap().result.unwrap();
    let edits = result.as_array().unwrap();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].get_str("newText"), Some("fn f(a, b) {\n  return a + b;\n}"));
}

#[test]
fn s4_rename_across_documents() {
    let mut server = Server::new();
    open(&mut server, "file:///a.claw", "let foo = 1\n");
    open(&mut server, "file:///b.claw", "let foo = 2\n");

    let mut params = Value::object();
    params.insert("textDocument", text_document("file:///a.claw"));
    params.insert("position", position(0, 4));
    params.insert("newName", Value::from("bar"));
    let (_n, response) = server.handle(request(1, methods::RENAME, params));
    let result = response.unwrap().result.unwrap();
    let changes = result.get("changes").unwrap().as_object().unwrap();
    assert_eq!(changes.len(), 2);
    for (_uri, edits) in changes {
        let edits = edits.as_array().unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].get_str("newText"), Some("bar"));
    }
}

#[test]
fn s5_signature_help_parameter_counting() {
    let mut server = Server::new();
    open(&mut server, "file:///s5.claw", "fn add(x, y) { return x + y }\nadd(1, ");

    let mut params = Value::object();
    params.insert("textDocument", text_document("file:///s5.claw"));
    params.insert("position", position(1, 7));
    let (_n, response) = server.handle(request(1, methods::SIGNATURE_HELP, params));
    let result = response.unwrap().result.unwrap();
    assert_eq!(result.get_f64("activeParameter"), Some(1.0));
    let signatures = result.get_array("signatures").unwrap();
    assert_eq!(signatures[0].get_str("label"), Some("add(x, y)"));
}

#[test]
fn s7_hover_on_local_matches_declaration_not_every_reference() {
    let mut server = Server::new();
    open(&mut server, "file:///s7.claw", "fn f(a) { return a; }\n");

    let mut params = Value::object();
    params.insert("textDocument", text_document("file:///s7.claw"));
    params.insert("position", position(0, 5)); // the `a` in `f(a)`
    let (_n, response) = server.handle(request(1, methods::HOVER, params));
    let result = response.unwrap().result.unwrap();
    assert_eq!(result.get_path(&["contents", "value"]).and_then(Value::as_str), Some("**a**: symbol"));

    let mut params = Value::object();
    params.insert("textDocument", text_document("file:///s7.claw"));
    params.insert("position", position(0, 17)); // the `a` in `return a`
    let (_n, response) = server.handle(request(2, methods::HOVER, params));
    let result = response.unwrap().result.unwrap();
    assert!(result.is_null());
}

#[test]
fn s6_style_diagnostics_three_distinct_issues() {
    let mut server = Server::new();
    let mut line = "\tlet a = 1".to_string();
    line.push_str("   ");
    while line.chars().count() < 130 {
        line.push('x');
    }
    let (notifications, _) = server.handle(notification(methods::DID_OPEN, did_open_params("file:///s6.claw", &line)));
    let diagnostics = notifications[0].params.get_array("diagnostics").unwrap();
    let infos: Vec<&str> = diagnostics.iter().filter(|d| d.get_f64("severity") == Some(3.0)).filter_map(|d| d.get_str("message")).collect();
    assert!(infos.iter().any(|m| m.contains("tab character")));
    assert!(infos.iter().any(|m| m.contains("trailing whitespace")));
    assert!(infos.iter().any(|m| m.contains("120 characters")));
}
