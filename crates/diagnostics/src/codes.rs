//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. IDs are stable: tooling may filter on them.

/// Malformed token aborted the scan.
pub const SCAN_MALFORMED_TOKEN: &str = "LC.SCAN.0001";
/// String literal was not closed before end of input.
pub const SCAN_UNTERMINATED_STRING: &str = "LC.SCAN.0002";

/// A signal was declared more than once; later declarations are ignored.
pub const PARSE_DUPLICATE_SIGNAL: &str = "LC.PARSE.0101";
/// Input contained no blocks at all.
pub const PARSE_EMPTY_INPUT: &str = "LC.PARSE.0102";
/// A modifier overrode an earlier modifier of the same category.
pub const PARSE_MODIFIER_OVERRIDE: &str = "LC.PARSE.0103";

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    match id {
        SCAN_MALFORMED_TOKEN => Some("The scanner hit a character sequence that does not form a valid LiquidCode token."),
        SCAN_UNTERMINATED_STRING => Some("A double-quoted string literal reached end of input without a closing quote."),
        PARSE_DUPLICATE_SIGNAL => Some("The same signal name was declared twice; the first declaration wins."),
        PARSE_EMPTY_INPUT => Some("The source contained declarations or whitespace only, producing no layers."),
        PARSE_MODIFIER_OVERRIDE => Some("Two modifiers of the same category appeared on one block; the later one replaced the earlier."),
        _ => None,
    }
}
