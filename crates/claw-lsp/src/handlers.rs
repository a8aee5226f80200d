//! One function per supported LSP method, plus the dispatcher that routes
//! an incoming request to its handler.

use crate::Server;
use claw_analysis::{Document, TypeName};
use claw_json::Value;
use claw_protocol::{methods, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use claw_token::{Position, Range, TokenTag};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

pub(crate) fn dispatch(server: &mut Server, request: JsonRpcRequest) -> (Vec<JsonRpcNotification>, Option<JsonRpcResponse>) {
    let id = request.id.clone();
    match request.method.as_str() {
        methods::INITIALIZE => respond(id, initialize(server, &request.params)),
        methods::DID_OPEN => (did_open(server, &request.params), None),
        methods::DID_CHANGE => (did_change(server, &request.params), None),
        methods::HOVER => respond(id, hover(server, &request.params)),
        methods::DEFINITION => respond(id, definition(server, &request.params)),
        methods::REFERENCES => respond(id, references(server, &request.params)),
        methods::COMPLETION => respond(id, completion(server, &request.params)),
        methods::DOCUMENT_SYMBOL => respond(id, document_symbol(server, &request.params)),
        methods::SIGNATURE_HELP => respond(id, signature_help(server, &request.params)),
        methods::WORKSPACE_SYMBOL => respond(id, workspace_symbol(server, &request.params)),
        methods::RENAME => respond(id, rename(server, &request.params)),
        methods::FORMATTING => respond(id, formatting(server, &request.params)),
        methods::RANGE_FORMATTING => respond(id, range_formatting(server, &request.params)),
        methods::ON_TYPE_FORMATTING => respond(id, on_type_formatting(server, &request.params)),
        methods::CODE_ACTION => respond(id, code_action(server, &request.params)),
        _ => {
            if request.is_notification() {
                (vec![], None)
            } else {
                (vec![], Some(JsonRpcResponse::null(id)))
            }
        }
    }
}

fn respond(id: Option<Value>, result: Value) -> (Vec<JsonRpcNotification>, Option<JsonRpcResponse>) {
    (vec![], Some(JsonRpcResponse::success(id, result)))
}

// ---- parameter extraction -------------------------------------------------

fn extract_uri(params: &Value) -> String {
    params.get_path(&["textDocument", "uri"]).and_then(Value::as_str).unwrap_or("").to_string()
}

fn extract_position(params: &Value) -> Position {
    position_from(params.get("position").unwrap_or(&Value::Null))
}

fn position_from(v: &Value) -> Position {
    Position { line: v.get_usize("line").unwrap_or(0), character: v.get_usize("character").unwrap_or(0) }
}

fn range_from(v: &Value) -> Range {
    Range::new(position_from(v.get("start").unwrap_or(&Value::Null)), position_from(v.get("end").unwrap_or(&Value::Null)))
}

fn position_to_value(p: Position) -> Value {
    let mut obj = Value::object();
    obj.insert("line", Value::from(p.line));
    obj.insert("character", Value::from(p.character));
    obj
}

fn range_to_value(r: &Range) -> Value {
    let mut obj = Value::object();
    obj.insert("start", position_to_value(r.start));
    obj.insert("end", position_to_value(r.end));
    obj
}

fn location(uri: &str, range: &Range) -> Value {
    let mut obj = Value::object();
    obj.insert("uri", Value::from(uri));
    obj.insert("range", range_to_value(range));
    obj
}

fn text_edit(range: &Range, new_text: &str) -> Value {
    let mut obj = Value::object();
    obj.insert("range", range_to_value(range));
    obj.insert("newText", Value::from(new_text));
    obj
}

/// A document mirrored only into `workspaceDocs` was installed with an
/// empty `uri` — derive one from its path on demand rather than storing a
/// redundant, possibly-stale URI.
fn doc_uri(doc: &Document) -> String {
    if doc.uri.is_empty() {
        claw_uri::path_to_uri(&doc.path)
    } else {
        doc.uri.clone()
    }
}

fn symbol_kind(type_name: TypeName) -> i64 {
    match type_name {
        TypeName::Function => 12,
        TypeName::Class => 5,
        _ => 13,
    }
}

// ---- lifecycle -------------------------------------------------------------

fn initialize(server: &mut Server, params: &Value) -> Value {
    let root = params
        .get_str("rootUri")
        .map(claw_uri::uri_to_path)
        .or_else(|| params.get_str("rootPath").map(str::to_string));

    if let Some(root) = root {
        scan_workspace(server, &root);
        server.workspace_root = Some(root);
    }

    claw_protocol::server_capabilities()
}

fn scan_workspace(server: &mut Server, root: &str) {
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !has_source_extension(path) {
            continue;
        }
        if let Ok(text) = fs::read_to_string(path) {
            server.store.install_workspace_only(text, path.to_string_lossy().into_owned());
        }
    }
}

fn has_source_extension(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("claw") | Some("volt"))
}

fn did_open(server: &mut Server, params: &Value) -> Vec<JsonRpcNotification> {
    let uri = extract_uri(params);
    let text = params.get_path(&["textDocument", "text"]).and_then(Value::as_str).unwrap_or("").to_string();
    let path = claw_uri::uri_to_path(&uri);
    server.store.analyze_and_install(text, uri.clone(), path);
    vec![publish_diagnostics(server, &uri)]
}

fn did_change(server: &mut Server, params: &Value) -> Vec<JsonRpcNotification> {
    let uri = extract_uri(params);
    let text = params
        .get_array("contentChanges")
        .and_then(|changes| changes.first())
        .and_then(|c| c.get_str("text"))
        .unwrap_or("")
        .to_string();
    let path = claw_uri::uri_to_path(&uri);
    server.store.analyze_and_install(text, uri.clone(), path);
    vec![publish_diagnostics(server, &uri)]
}

fn publish_diagnostics(server: &Server, uri: &str) -> JsonRpcNotification {
    let mut diagnostics = Value::array();
    if let Some(doc) = server.store.get_open(uri) {
        for message in &doc.parser_errors {
            diagnostics.push(diagnostic(&Range::point(0, 0), message, 1));
        }
        for r in &doc.unknown_refs {
            diagnostics.push(diagnostic(r, "Unknown identifier", 2));
        }
        for (r, message) in &doc.style_issues {
            diagnostics.push(diagnostic(r, message, 3));
        }
    }
    let mut params = Value::object();
    params.insert("uri", Value::from(uri));
    params.insert("diagnostics", diagnostics);
    JsonRpcNotification::new(methods::PUBLISH_DIAGNOSTICS, params)
}

fn diagnostic(range: &Range, message: &str, severity: i64) -> Value {
    let mut obj = Value::object();
    obj.insert("range", range_to_value(range));
    obj.insert("message", Value::from(message));
    obj.insert("severity", Value::from(severity));
    obj
}

// ---- navigation --------------------------------------------------------

fn symbol_at_def(doc: &Document, pos: Position) -> Option<&claw_analysis::SymbolInfo> {
    doc.symbols.values().find(|s| s.def.contains(pos))
}

fn local_at_def(doc: &Document, pos: Position) -> Option<&claw_analysis::SymbolInfo> {
    doc.locals.values().find(|s| s.def.contains(pos))
}

fn symbol_at_ref(doc: &Document, pos: Position) -> Option<&claw_analysis::SymbolInfo> {
    doc.symbols.values().find(|s| s.refs.iter().any(|r| r.contains(pos)))
}

fn identifier_at(doc: &Document, pos: Position) -> Option<String> {
    doc.tokens.iter().find(|t| t.tag == TokenTag::Ident && t.range().contains(pos)).map(|t| t.lexeme.clone())
}

fn token_at(doc: &Document, pos: Position) -> Option<&claw_token::Token> {
    doc.tokens.iter().find(|t| t.range().contains(pos))
}

fn hover(server: &Server, params: &Value) -> Value {
    let uri = extract_uri(params);
    let pos = extract_position(params);
    let Some(doc) = server.store.get_open(&uri) else {
        return Value::Null;
    };

    let value = if let Some(sym) = symbol_at_def(doc, pos) {
        describe_symbol(sym)
    } else if let Some(sym) = local_at_def(doc, pos) {
        describe_local(sym)
    } else if let Some(tok) = token_at(doc, pos) {
        match tok.tag {
            TokenTag::Number => Some("number".to_string()),
            TokenTag::Str => Some("string".to_string()),
            _ => None,
        }
        .unwrap_or_default()
    } else {
        String::new()
    };

    if value.is_empty() {
        return Value::Null;
    }
    let mut contents = Value::object();
    contents.insert("kind", Value::from("markdown"));
    contents.insert("value", Value::from(value));
    let mut result = Value::object();
    result.insert("contents", contents);
    result
}

fn describe_symbol(sym: &claw_analysis::SymbolInfo) -> String {
    if sym.type_name == TypeName::Function {
        format!("**{}**: function\n\n{}({})", sym.name, sym.name, sym.params.join(", "))
    } else {
        format!("**{}**: {}", sym.name, sym.type_name.as_str())
    }
}

/// Locals are never type-inferred, unlike top-level symbols — `Unknown`
/// here means "a local binding with nothing else to say", so it reads as
/// "symbol" rather than the top-level "unknown".
fn describe_local(sym: &claw_analysis::SymbolInfo) -> String {
    let label = if sym.type_name == TypeName::Unknown { "symbol" } else { sym.type_name.as_str() };
    format!("**{}**: {}", sym.name, label)
}

fn definition(server: &Server, params: &Value) -> Value {
    let uri = extract_uri(params);
    let pos = extract_position(params);
    let mut results = Value::array();
    let Some(doc) = server.store.get_open(&uri) else {
        return results;
    };

    if let Some(sym) = symbol_at_ref(doc, pos) {
        results.push(location(&uri, &sym.def));
        return results;
    }

    if let Some(target) = identifier_at(doc, pos) {
        for other in server.store.all_documents() {
            if let Some(sym) = other.symbols.get(&target) {
                results.push(location(&doc_uri(other), &sym.def));
            }
        }
    }
    results
}

fn references(server: &Server, params: &Value) -> Value {
    let uri = extract_uri(params);
    let pos = extract_position(params);
    let mut results = Value::array();
    let Some(doc) = server.store.get_open(&uri) else {
        return results;
    };

    let target = if let Some(sym) = symbol_at_def(doc, pos) {
        sym.name.clone()
    } else if let Some(name) = identifier_at(doc, pos) {
        name
    } else {
        return results;
    };

    if let Some(sym) = doc.symbols.get(&target) {
        for r in &sym.refs {
            results.push(location(&uri, r));
        }
    }
    for other in server.store.all_documents() {
        if let Some(ranges) = other.ref_by_name.get(&target) {
            for r in ranges {
                results.push(location(&doc_uri(other), r));
            }
        }
    }
    results
}

fn document_symbol(server: &Server, params: &Value) -> Value {
    let uri = extract_uri(params);
    let mut results = Value::array();
    let Some(doc) = server.store.get_open(&uri) else {
        return results;
    };
    for sym in doc.symbols.values() {
        results.push(symbol_information(sym, &uri));
    }
    results
}

fn symbol_information(sym: &claw_analysis::SymbolInfo, uri: &str) -> Value {
    let mut obj = Value::object();
    obj.insert("name", Value::from(sym.name.clone()));
    obj.insert("kind", Value::from(symbol_kind(sym.type_name)));
    obj.insert("location", location(uri, &sym.def));
    obj
}

fn workspace_symbol(server: &Server, params: &Value) -> Value {
    let query = params.get_str("query").unwrap_or("");
    let mut results = Value::array();
    for doc in server.store.all_documents() {
        let uri = doc_uri(doc);
        for sym in doc.symbols.values() {
            if query.is_empty() || sym.name.contains(query) {
                results.push(symbol_information(sym, &uri));
            }
        }
    }
    results
}

fn rename(server: &Server, params: &Value) -> Value {
    let uri = extract_uri(params);
    let pos = extract_position(params);
    let new_name = params.get_str("newName").unwrap_or("");

    let mut result = Value::object();
    let Some(doc) = server.store.get_open(&uri) else {
        result.insert("changes", Value::object());
        return result;
    };

    let target = if let Some(sym) = symbol_at_ref(doc, pos) {
        sym.name.clone()
    } else if let Some(name) = identifier_at(doc, pos) {
        name
    } else {
        result.insert("changes", Value::object());
        return result;
    };

    let mut changes = Value::object();
    for other in server.store.all_documents() {
        let mut edits = Vec::new();
        if let Some(sym) = other.symbols.get(&target) {
            edits.push(sym.def);
            edits.extend(sym.refs.iter().copied());
        }
        if let Some(ranges) = other.ref_by_name.get(&target) {
            edits.extend(ranges.iter().copied());
        }
        if edits.is_empty() {
            continue;
        }
        let mut edit_values = Value::array();
        for r in edits {
            edit_values.push(text_edit(&r, new_name));
        }
        changes.insert(doc_uri(other), edit_values);
    }
    result.insert("changes", changes);
    result
}

// ---- formatting ---------------------------------------------------------

fn formatting(server: &Server, params: &Value) -> Value {
    let uri = extract_uri(params);
    let mut results = Value::array();
    let Some(doc) = server.store.get_open(&uri) else {
        return results;
    };
    let formatted = claw_format::format_default(&claw_lexer::lex(&doc.text));
    let line_count = doc.text.split('\n').count();
    let range = Range::new(Position { line: 0, character: 0 }, Position { line: line_count, character: 0 });
    results.push(text_edit(&range, &formatted));
    results
}

fn range_formatting(server: &Server, params: &Value) -> Value {
    let uri = extract_uri(params);
    let mut results = Value::array();
    let Some(doc) = server.store.get_open(&uri) else {
        return results;
    };
    let Some(requested) = params.get("range") else {
        return results;
    };
    let range = range_from(requested);
    let fragment = slice_range(&doc.text, &range);
    let formatted = claw_format::format_default(&claw_lexer::lex(&fragment));
    results.push(text_edit(&range, &formatted));
    results
}

fn on_type_formatting(server: &Server, params: &Value) -> Value {
    let uri = extract_uri(params);
    let pos = extract_position(params);
    let mut results = Value::array();
    let Some(doc) = server.store.get_open(&uri) else {
        return results;
    };
    let lines: Vec<&str> = doc.text.split('\n').collect();
    let Some(line) = lines.get(pos.line) else {
        return results;
    };
    let formatted = claw_format::format_default(&claw_lexer::lex(line));
    let range = Range::new(Position { line: pos.line, character: 0 }, Position { line: pos.line, character: line.chars().count() });
    results.push(text_edit(&range, &formatted));
    results
}

/// Extract the text a Range covers, joining multi-line spans with the
/// newlines that separated them in the source.
fn slice_range(text: &str, range: &Range) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    if range.start.line == range.end.line {
        let chars: Vec<char> = lines.get(range.start.line).copied().unwrap_or("").chars().collect();
        let start = range.start.character.min(chars.len());
        let end = range.end.character.min(chars.len());
        return chars[start..end].iter().collect();
    }

    let mut out = String::new();
    for (idx, line) in lines.iter().enumerate().take(range.end.line + 1).skip(range.start.line) {
        let chars: Vec<char> = line.chars().collect();
        if idx == range.start.line {
            let start = range.start.character.min(chars.len());
            out.extend(chars[start..].iter().copied());
            out.push('\n');
        } else if idx == range.end.line {
            let end = range.end.character.min(chars.len());
            out.extend(chars[..end].iter().copied());
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

// ---- completion / signature help ----------------------------------------

fn completion_item(label: &str, kind: i64) -> Value {
    let mut obj = Value::object();
    obj.insert("label", Value::from(label));
    obj.insert("kind", Value::from(kind));
    obj
}

fn callable_completion_item(name: &str, params: &[String]) -> Value {
    let snippet: Vec<String> = params.iter().enumerate().map(|(i, p)| format!("${{{}:{}}}", i + 1, p)).collect();
    let mut obj = Value::object();
    obj.insert("label", Value::from(name));
    obj.insert("kind", Value::from(3i64));
    obj.insert("detail", Value::from(format!("{name}({})", params.join(", "))));
    obj.insert("insertText", Value::from(format!("{name}({})", snippet.join(", "))));
    obj.insert("insertTextFormat", Value::from(2i64));
    obj
}

fn synth_params(arity: usize) -> Vec<String> {
    (1..=arity).map(|i| format!("arg{i}")).collect()
}

fn completion(server: &Server, params: &Value) -> Value {
    let uri = extract_uri(params);
    let pos = extract_position(params);
    let mut items = Value::array();

    if dot_chain_before(server, &uri, pos) {
        for name in claw_analysis::globals::ARRAY_METHODS {
            items.push(completion_item(name, 2));
        }
        for name in claw_analysis::globals::MAP_METHODS {
            items.push(completion_item(name, 2));
        }
    }

    for kw in claw_analysis::globals::KEYWORDS {
        items.push(completion_item(kw, 14));
    }

    let mut builtin_names: Vec<&str> = claw_analysis::globals::builtins().keys().copied().collect();
    builtin_names.sort();
    for name in &builtin_names {
        items.push(completion_item(name, 3));
    }

    if let Some(doc) = server.store.get_open(&uri) {
        for sym in doc.symbols.values() {
            if sym.type_name == TypeName::Function {
                items.push(callable_completion_item(&sym.name, &sym.params));
            } else {
                items.push(completion_item(&sym.name, 6));
            }
        }
        for name in doc.locals.keys() {
            items.push(completion_item(name, 6));
        }
    }

    for name in &builtin_names {
        let arity = *claw_analysis::globals::builtins().get(*name).unwrap_or(&0);
        items.push(callable_completion_item(name, &synth_params(arity)));
    }

    items
}

/// Whether the cursor sits right after a `.`-chained identifier suffix on
/// the current line, stepping backward over `[A-Za-z0-9_]` characters.
fn dot_chain_before(server: &Server, uri: &str, pos: Position) -> bool {
    let Some(doc) = server.store.get_open(uri) else {
        return false;
    };
    let Some(line) = doc.text.split('\n').nth(pos.line) else {
        return false;
    };
    let chars: Vec<char> = line.chars().collect();
    let mut i = pos.character.min(chars.len());
    while i > 0 && (chars[i - 1].is_ascii_alphanumeric() || chars[i - 1] == '_') {
        i -= 1;
    }
    i > 0 && chars[i - 1] == '.'
}

fn signature_help(server: &Server, params: &Value) -> Value {
    let uri = extract_uri(params);
    let pos = extract_position(params);
    let mut signatures = Value::array();
    let mut result = Value::object();

    let Some(doc) = server.store.get_open(&uri) else {
        result.insert("signatures", signatures);
        result.insert("activeSignature", Value::from(0i64));
        result.insert("activeParameter", Value::from(0i64));
        return result;
    };

    let line_tokens: Vec<&claw_token::Token> = doc.tokens.iter().filter(|t| t.line == pos.line + 1).collect();

    let paren_idx = line_tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.tag == TokenTag::LParen && t.range().start.character <= pos.character)
        .map(|(i, _)| i)
        .last();

    let mut active_parameter = 0usize;
    let mut callee = None;
    if let Some(paren_idx) = paren_idx {
        callee = line_tokens[..paren_idx].iter().rev().find(|t| t.tag == TokenTag::Ident).map(|t| t.lexeme.clone());
        active_parameter = line_tokens[paren_idx + 1..]
            .iter()
            .filter(|t| t.tag == TokenTag::Comma && t.range().start.character <= pos.character)
            .count();
    }

    if let Some(callee) = callee {
        let params_list = if let Some(sym) = doc.symbols.get(&callee).filter(|s| s.type_name == TypeName::Function) {
            Some(sym.params.clone())
        } else {
            claw_analysis::globals::arity_of(&callee).map(synth_params)
        };

        if let Some(params_list) = params_list {
            let n = params_list.len();
            active_parameter = if n == 0 { 0 } else { active_parameter.min(n - 1) };

            let mut sig = Value::object();
            sig.insert("label", Value::from(format!("{callee}({})", params_list.join(", "))));
            let mut sig_params = Value::array();
            for p in &params_list {
                let mut po = Value::object();
                po.insert("label", Value::from(p.clone()));
                sig_params.push(po);
            }
            sig.insert("parameters", sig_params);
            signatures.push(sig);
        }
    }

    result.insert("signatures", signatures);
    result.insert("activeSignature", Value::from(0i64));
    result.insert("activeParameter", Value::from(active_parameter));
    result
}

fn code_action(server: &Server, params: &Value) -> Value {
    let uri = extract_uri(params);
    let mut actions = Value::array();
    let Some(doc) = server.store.get_open(&uri) else {
        return actions;
    };
    let Some(requested) = params.get("range") else {
        return actions;
    };
    let requested_range = range_from(requested);

    for (range, message) in &doc.style_issues {
        if !range.lines_overlap(&requested_range) {
            continue;
        }
        let mut changes = Value::object();
        let mut edits = Value::array();
        edits.push(text_edit(range, ""));
        changes.insert(uri.clone(), edits);

        let mut edit = Value::object();
        edit.insert("changes", changes);

        let mut action = Value::object();
        action.insert("title", Value::from(message.clone()));
        action.insert("kind", Value::from("quickfix"));
        action.insert("edit", edit);
        actions.push(action);
    }
    actions
}
