//! The interpreter's globally bound names, as a read-only view.
//!
//! The real interpreter runtime is an external collaborator (see the
//! engine's scope notes); all the analyzer and handlers need from it is a
//! name -> arity lookup for the fixed built-in function set. This module
//! stands in for that collaborator with a static table.

use std::collections::HashMap;
use std::sync::OnceLock;

static GLOBALS: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();

/// Lazily build and cache the built-in name -> arity table.
pub fn builtins() -> &'static HashMap<&'static str, usize> {
    GLOBALS.get_or_init(|| {
        let mut m = HashMap::new();
        let mut put = |name: &'static str, arity: usize| {
            m.insert(name, arity);
        };
        // string
        put("len", 1);
        put("str", 1);
        put("substr", 3);
        put("toUpper", 1);
        put("toLower", 1);
        put("split", 2);
        put("trim", 1);
        put("indexOf", 2);
        // math
        put("pow", 2);
        put("sqrt", 1);
        put("sin", 1);
        put("cos", 1);
        put("tan", 1);
        put("abs", 1);
        put("min", 2);
        put("max", 2);
        put("round", 1);
        put("floor", 1);
        put("ceil", 1);
        put("random", 0);
        // file
        put("readFile", 1);
        put("writeFile", 2);
        put("appendFile", 2);
        put("exists", 1);
        put("fileSize", 1);
        // collection
        put("keys", 1);
        put("values", 1);
        put("has", 2);
        put("remove", 2);
        // functional
        put("compose", 2);
        put("pipe", 2);
        // misc
        put("benchmark", 1);
        put("sleep", 1);
        put("now", 0);
        put("formatDate", 2);
        put("jsonEncode", 1);
        put("jsonDecode", 1);
        put("type", 1);
        m
    })
}

/// Whether `name` is a known global, regardless of arity.
pub fn is_global(name: &str) -> bool {
    builtins().contains_key(name)
}

/// The arity of a known global, if any.
pub fn arity_of(name: &str) -> Option<usize> {
    builtins().get(name).copied()
}

/// The full keyword set recognized by the lexer, in glossary order.
pub const KEYWORDS: &[&str] = &[
    "let", "fn", "class", "init", "return", "if", "else", "while", "for", "run", "until", "break", "continue",
    "try", "catch", "throw",
];

/// Array method names suggested after a `.` on an array-typed expression.
pub const ARRAY_METHODS: &[&str] = &["push", "pop", "reverse", "map", "filter", "reduce", "join", "concat", "slice", "flat", "flatMap", "length"];

/// Map method names suggested after a `.` on a map-typed expression.
pub const MAP_METHODS: &[&str] = &["keys", "values", "has", "remove", "size"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_known_builtin_arity() {
        assert_eq!(arity_of("substr"), Some(3));
        assert_eq!(arity_of("now"), Some(0));
    }

    #[test]
    fn unknown_name_is_not_global() {
        assert!(!is_global("definitelyNotABuiltin"));
    }
}
