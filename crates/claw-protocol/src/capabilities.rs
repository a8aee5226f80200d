//! Server capabilities advertised in the `initialize` response.
//!
//! The capability set is fixed — there is no build-time feature gating
//! here, just the single object this server always reports.

use claw_json::Value;

/// Build the `ServerCapabilities` object returned from `initialize`.
///
/// `onTypeFormattingProvider`'s trigger set is `}` (first) plus `\n`
/// (additional) — listed once, not reassigned, unlike the double
/// assignment this was ported from.
pub fn server_capabilities() -> Value {
    let mut caps = Value::object();

    let mut sync = Value::object();
    sync.insert("openClose", Value::from(true));
    sync.insert("change", Value::from(2i64));
    caps.insert("textDocumentSync", sync);

    caps.insert("hoverProvider", Value::from(true));
    caps.insert("definitionProvider", Value::from(true));
    caps.insert("referencesProvider", Value::from(true));
    caps.insert("documentSymbolProvider", Value::from(true));
    caps.insert("workspaceSymbolProvider", Value::from(true));
    caps.insert("renameProvider", Value::from(true));
    caps.insert("documentFormattingProvider", Value::from(true));
    caps.insert("documentRangeFormattingProvider", Value::from(true));
    caps.insert("codeActionProvider", Value::from(true));

    let mut completion = Value::object();
    completion.insert("triggerCharacters", Value::from(vec![".", "("]));
    completion.insert("resolveProvider", Value::from(false));
    caps.insert("completionProvider", completion);

    let mut signature_help = Value::object();
    signature_help.insert("triggerCharacters", Value::from(vec!["(", ","]));
    caps.insert("signatureHelpProvider", signature_help);

    let mut on_type_formatting = Value::object();
    on_type_formatting.insert("firstTriggerCharacter", Value::from("}"));
    on_type_formatting.insert("moreTriggerCharacter", Value::from(vec!["\n"]));
    caps.insert("documentOnTypeFormattingProvider", on_type_formatting);

    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advertises_incremental_sync() {
        let caps = server_capabilities();
        assert_eq!(caps.get_path(&["textDocumentSync", "change"]).and_then(Value::as_i64), Some(2));
    }

    #[test]
    fn on_type_formatting_has_a_single_stable_trigger_set() {
        let caps = server_capabilities();
        let first = caps.get_path(&["documentOnTypeFormattingProvider", "firstTriggerCharacter"]);
        assert_eq!(first.and_then(Value::as_str), Some("}"));
    }

    #[test]
    fn completion_triggers_on_dot_and_paren() {
        let caps = server_capabilities();
        let triggers = caps.get_path(&["completionProvider", "triggerCharacters"]).and_then(Value::as_array).unwrap();
        assert_eq!(triggers.len(), 2);
    }
}
