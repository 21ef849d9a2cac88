/// Re-exports from the diagnostics crate.
pub mod diag;
/// JSON serialization helpers for the schema.
pub mod dump;
/// LiquidCode emitter — converts a schema back to canonical notation text.
pub mod emit;
/// LiquidCode parser — converts tokens into a `LiquidSchema`.
pub mod parser;
/// LiquidCode scanner — tokenizes raw input into a stream of borrowed tokens.
pub mod scanner;
/// LiquidCode schema types — the parsed representation of a UI document.
pub mod schema;
