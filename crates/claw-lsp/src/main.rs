//! claw/volt Language Server binary.
//!
//! Usage:
//!   claw-lsp \[options\]
//!
//! Options:
//!   --log        Enable logging to stderr
//!   --health     Quick health check
//!   --version    Show version information
//!   --help       Show this help message

use claw_lsp::Server;
use std::env;
use std::io::{self, BufReader};
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut enable_logging = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--log" => enable_logging = true,
            "--health" => {
                println!("ok {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "--version" => {
                println!("claw-lsp {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if enable_logging {
        eprintln!("claw-lsp starting, stdio mode");
    }

    let mut server = Server::new();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut writer = stdout.lock();

    if let Err(e) = server.run(&mut reader, &mut writer, enable_logging) {
        eprintln!("claw-lsp: fatal error: {e}");
        process::exit(1);
    }
}

fn print_help() {
    eprintln!("claw/volt Language Server");
    eprintln!();
    eprintln!("Usage: claw-lsp [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --log        Enable logging to stderr");
    eprintln!("  --health     Quick health check (prints 'ok <version>')");
    eprintln!("  --version    Show version information");
    eprintln!("  --help       Show this help message");
    eprintln!();
    eprintln!("Communicates over stdio using LSP framing.");
}
