//! Document analysis: lexing, parsing, symbol extraction, reference
//! resolution, and style diagnostics, plus the open/workspace document
//! stores that hold the results.

#![deny(unsafe_code)]

mod document;
pub mod globals;
mod store;
mod symbol;

pub use document::Document;
pub use store::DocumentStore;
pub use symbol::{SymbolInfo, TypeName};
