//! Shared test helpers for `liquidcode_core` integration tests.

#![allow(unreachable_pub)]
#![allow(dead_code)]

use liquidcode_core::grammar::parser::{ParseResult, parse_str};
use liquidcode_core::grammar::schema::{Block, LiquidSchema};
use liquidcode_core::roundtrip::roundtrip;

/// Parse input that the test expects to be valid.
pub fn parse_ok(input: &str) -> ParseResult {
    parse_str(input).unwrap_or_else(|e| panic!("parse of {input:?} failed: {e}"))
}

/// Parse and return just the schema.
pub fn schema_of(input: &str) -> LiquidSchema {
    parse_ok(input).schema
}

/// The base layer's root block.
pub fn base_root(schema: &LiquidSchema) -> &Block {
    &schema.layers[0].root
}

/// Children of the base layer's root, panicking when there are none.
pub fn root_children(schema: &LiquidSchema) -> &[Block] {
    base_root(schema)
        .children
        .as_deref()
        .expect("root has children")
}

/// Collect diagnostic ids from a parse result.
pub fn diag_ids(result: &ParseResult) -> Vec<String> {
    result
        .diagnostics
        .iter()
        .map(|d| d.id.to_string())
        .collect()
}

/// Assert that `parse → emit → reparse` reconstructs an equivalent schema.
pub fn assert_roundtrip(input: &str) {
    let schema = schema_of(input);
    let report = roundtrip(&schema).unwrap_or_else(|e| panic!("roundtrip of {input:?} failed: {e}"));
    assert!(
        report.is_equivalent,
        "\n--- Round-trip failed ---\nInput:\n{}\nEmitted:\n{}\nDifferences:\n{}\n",
        input,
        report.dsl,
        report.differences.join("\n")
    );
}
