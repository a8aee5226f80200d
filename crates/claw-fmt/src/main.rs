//! claw/volt formatter CLI.
//!
//! Usage:
//!   claw-fmt \[options\]
//!
//! Options:
//!   --write        Rewrite files in place
//!   --check        Exit 2 if any file would change, 0 otherwise
//!   --root=PATH    Scan root (default: current working directory)
//!   --help         Show this help message

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use walkdir::WalkDir;

struct Options {
    write: bool,
    check: bool,
    root: PathBuf,
}

fn main() {
    let options = match parse_args(env::args().skip(1)) {
        Ok(o) => o,
        Err(message) => {
            eprintln!("{message}");
            print_help();
            process::exit(1);
        }
    };

    let mut any_changed = false;
    for entry in WalkDir::new(&options.root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() || !has_source_extension(entry.path()) {
            continue;
        }
        let path = entry.path();
        let Ok(original) = fs::read_to_string(path) else {
            continue;
        };
        let formatted = claw_format::format_default(&claw_lexer::lex(&original));
        if formatted == original {
            continue;
        }
        any_changed = true;
        if options.write {
            if let Err(e) = fs::write(path, &formatted) {
                eprintln!("claw-fmt: failed to write {}: {e}", path.display());
                process::exit(1);
            }
        } else if options.check {
            println!("would reformat {}", path.display());
        }
    }

    if options.check && any_changed {
        process::exit(2);
    }
}

fn has_source_extension(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("claw") | Some("volt"))
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut write = false;
    let mut check = false;
    let mut root = env::current_dir().unwrap_or_default();

    for arg in args {
        match arg.as_str() {
            "--write" => write = true,
            "--check" => check = true,
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            _ if arg.starts_with("--root=") => {
                root = PathBuf::from(arg.trim_start_matches("--root="));
            }
            other => return Err(format!("Unknown option: {other}")),
        }
    }

    Ok(Options { write, check, root })
}

fn print_help() {
    eprintln!("claw/volt formatter");
    eprintln!();
    eprintln!("Usage: claw-fmt [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --write        Rewrite files in place");
    eprintln!("  --check        Exit 2 if any file would change, 0 otherwise");
    eprintln!("  --root=PATH    Scan root (default: current working directory)");
    eprintln!("  --help         Show this help message");
}
