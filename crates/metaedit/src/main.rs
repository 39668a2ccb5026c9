//! # Metaedit CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this file only
//! invokes `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/cli/)                                       │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - config, logging and dispatch (commands.rs)               │
//! │  - terminal rendering and prompts (render.rs, prompt.rs)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  metaeditapp                                                │
//! │  - MetadataList over a FileItemStore (or local-only)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each subcommand drives the list exactly as an interactive host would: open a row,
//! type into it, save or delete, answer the confirmation. Rejections are shown by the
//! terminal notification sink, so they are not printed a second time here.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        if !e.is::<cli::AlreadyReported>() {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}
