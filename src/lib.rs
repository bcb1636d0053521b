//! Web chat backend for an AI agency site.
//!
//! Forwards visitor messages to a hosted model together with company facts,
//! service offerings and document text, keeps per-session chat history in
//! `SQLite`, and serves a small shop with a session cart.

// Rustc: warnings are errors
#![deny(warnings)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(dead_code)]
#![deny(non_camel_case_types)]
#![deny(unused_imports)]
#![deny(unused_variables)]
#![deny(unused_must_use)]
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![deny(overflowing_literals)]
// Clippy
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::missing_const_for_fn)]
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::module_inception)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)]
#![deny(clippy::too_many_arguments)]
#![deny(clippy::cognitive_complexity)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic, clippy::significant_drop_tightening))]

/// Chat request pipeline.
pub mod chat;
/// Chat turn model and conversation store.
pub mod conversation;
/// Configuration, errors and identifiers.
pub mod core;
/// Reference tables and document knowledge.
pub mod knowledge;
/// Hosted model gateway.
pub mod llm;
/// Prompt assembly.
pub mod prompt;
/// HTTP server and routes.
#[allow(
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::unused_async
)]
pub mod server;
/// Product catalog and cart.
pub mod shop;
/// Entry helpers to start the server.
pub mod start_agency_chat;
/// Database setup.
pub mod storage;
