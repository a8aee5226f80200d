use crate::document::Document;
use std::collections::HashMap;

/// The two keyed document caches: open-editor documents by URI, and
/// workspace-scanned documents by native path.
///
/// `analyze_and_install` is the sole mutation primitive — every handler
/// that needs to create or update a document goes through it, which is
/// what keeps the two maps in sync (invariant: `openDocs[u].text ==
/// workspaceDocs[uriToPath(u)].text` whenever both exist).
#[derive(Debug, Default)]
pub struct DocumentStore {
    pub open_docs: HashMap<String, Document>,
    pub workspace_docs: HashMap<String, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a document from `text`, analyze it, and place it in both
    /// stores keyed by `uri` and `path` respectively.
    pub fn analyze_and_install(&mut self, text: impl Into<String>, uri: impl Into<String>, path: impl Into<String>) {
        let uri = uri.into();
        let path = path.into();
        let doc = Document::new(uri.clone(), path.clone(), text);
        self.open_docs.insert(uri, doc.clone());
        self.workspace_docs.insert(path, doc);
    }

    /// Same as `analyze_and_install` but only mirrors into `workspace_docs`
    /// — used by the workspace scan at `initialize`, where there is no
    /// corresponding open editor buffer yet.
    pub fn install_workspace_only(&mut self, text: impl Into<String>, path: impl Into<String>) {
        let path = path.into();
        let doc = Document::new(String::new(), path.clone(), text);
        self.workspace_docs.insert(path, doc);
    }

    pub fn get_open(&self, uri: &str) -> Option<&Document> {
        self.open_docs.get(uri)
    }

    pub fn get_workspace(&self, path: &str) -> Option<&Document> {
        self.workspace_docs.get(path)
    }

    /// Iterate every document across both stores. A document open in the
    /// editor and also present in the workspace scan is yielded twice,
    /// matching how handlers like `rename` and `workspace/symbol` walk
    /// "every document in both stores".
    pub fn all_documents(&self) -> impl Iterator<Item = &Document> {
        self.open_docs.values().chain(self.workspace_docs.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_and_install_mirrors_both_stores() {
        let mut store = DocumentStore::new();
        store.analyze_and_install("let x = 1\n", "file:///a.claw", "a.claw");
        assert_eq!(store.get_open("file:///a.claw").unwrap().text, store.get_workspace("a.claw").unwrap().text);
    }
}
