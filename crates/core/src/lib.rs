//! LiquidCode compiler core library.
//!
//! Provides parsing, emission, and equivalence checking for LiquidCode, a
//! compact notation for describing UI trees. The main entry points are
//! [`parse_str`] for parsing, [`emit`] for canonical output, and
//! [`roundtrip`] for verifying that the two are semantically inverse.

#![warn(missing_docs)]

/// LiquidCode grammar: scanner, schema model, parser, emitter, and related
/// utilities.
pub mod grammar;
/// Emit → reparse → compare equivalence checking.
pub mod roundtrip;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Parser
pub use grammar::parser::{ParseError, ParseResult, parse_str, parse_with_version};

// Schema
pub use grammar::schema::{
    Binding, Block, BlockType, CondOp, Condition, Layer, Layout, LiquidSchema, Signal, SignalRefs,
    Style, Trigger, TriggerAction,
};

// Scanner
pub use grammar::scanner::{ScanError, preprocess, scan};

// Emitter
pub use grammar::emit::{EmitConfig, EmitError, emit};

// Equivalence checker
pub use roundtrip::{RoundtripError, RoundtripReport, compare_schemas, roundtrip};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, LineIndex, Severity, Span, codes};

// Serialization helpers
pub use grammar::dump::to_pretty_json;

// ── Format detection ────────────────────────────────────────────────────────

/// What a piece of source text appears to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Compact LiquidCode notation.
    LiquidCode,
    /// A JSON-serialized [`LiquidSchema`].
    SchemaJson,
}

/// Cheaply sniff whether text is LiquidCode notation or serialized schema
/// JSON. Harnesses that accept either use this to pick a decoder; it never
/// validates the content.
pub fn detect_format(text: &str) -> SourceFormat {
    if text.trim_start().starts_with('{') {
        SourceFormat::SchemaJson
    } else {
        SourceFormat::LiquidCode
    }
}

#[cfg(test)]
mod tests {
    use super::{SourceFormat, detect_format};

    #[test]
    fn detects_schema_json_by_leading_brace() {
        assert_eq!(
            detect_format(r#"{"version":"1.0","layers":[]}"#),
            SourceFormat::SchemaJson
        );
        assert_eq!(
            detect_format("\n  {\"version\":\"1.0\"}"),
            SourceFormat::SchemaJson
        );
    }

    #[test]
    fn everything_else_is_liquidcode() {
        assert_eq!(detect_format("Bt \"Click\""), SourceFormat::LiquidCode);
        assert_eq!(detect_format(""), SourceFormat::LiquidCode);
        assert_eq!(detect_format("// comment"), SourceFormat::LiquidCode);
    }
}
