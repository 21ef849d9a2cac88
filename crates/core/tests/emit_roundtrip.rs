//! Round-trip tests for the LiquidCode emitter.
//!
//! Gold-standard guarantee: for every valid input, `parse(emit(parse(input)))`
//! is structurally equivalent to `parse(input)`. Canonical output may differ
//! textually from the input (alias expansion, layout), never in meaning.

mod common;

use common::{assert_roundtrip, schema_of};
use liquidcode_core::grammar::emit::{EmitConfig, EmitError, emit};
use liquidcode_core::grammar::schema::{Block, BlockType, Layer, LiquidSchema};
use liquidcode_registry::{MAX_NESTING_DEPTH, RegistryError};

// ── Spec scenarios ──────────────────────────────────────────────────────

#[test]
fn kpi_binding_roundtrip() {
    assert_roundtrip("Kp :revenue");
}

#[test]
fn tab_strip_roundtrip() {
    assert_roundtrip(
        r#"@tab
Ts [Bt "Tab 1" >tab=1, Bt "Tab 2" >tab=2, Bt "Tab 3" >tab=3]"#,
    );
}

#[test]
fn grid_of_cards_roundtrip() {
    assert_roundtrip(r#"Gd 3 [Cd "A" [Kp :a], Cd "B" [Kp :b], Cd "C" [Kp :c]]"#);
}

#[test]
fn modal_layer_roundtrip() {
    assert_roundtrip(
        r#"Bt "Open" >/1
/1
9 "Confirm" [Tx "Are you sure?", Bt "Yes" !submit, Bt "No" /<]"#,
    );
}

#[test]
fn list_template_roundtrip() {
    assert_roundtrip("Ls :items [Tx :.name]");
    assert_roundtrip("Ls :items [Tx :.name, Tx :.email, Bt \"View\"]");
}

// ── Broader coverage ────────────────────────────────────────────────────

#[test]
fn modifier_heavy_block_roundtrip() {
    assert_roundtrip("Kp :revenue \"Revenue\" !h *f ^g #green %lg");
}

#[test]
fn alias_canonicalization_is_stable() {
    // First emit expands #g to #green; a second pass must be a fixpoint.
    assert_roundtrip("Kp :revenue #g %large");
}

#[test]
fn condition_and_signal_wiring_roundtrip() {
    assert_roundtrip("@active:number=1\n@query\nIn <>query\nTx :status ?@active>=1");
}

#[test]
fn expr_value_and_index_bindings_roundtrip() {
    assert_roundtrip("Tx =price*qty");
    assert_roundtrip("Tx =42");
    assert_roundtrip(r#"Tx ="n/a""#);
    assert_roundtrip("Tb 012");
}

#[test]
fn grid_spec_roundtrip() {
    assert_roundtrip("Gd3x2c [Tx :a, Tx :b]");
    assert_roundtrip("Gd~fit [Tx :a]");
    assert_roundtrip("Gd~300 [Tx :a]");
}

#[test]
fn nested_document_roundtrip() {
    assert_roundtrip(
        r#"@tab:number=0
Gd 2 [
  Cd "Left" [Kp :a !p, Sp :trend]
  Cd "Right" [Ls :rows [Tx :.label, Bg :.status]]
]
/1
Md "Details" [Tx :detail, Bt "Close" /<]
Bt "More" >/1"#,
    );
}

#[test]
fn escaped_label_roundtrip() {
    assert_roundtrip(r#"Tx "He said \"hi\"\nnext line\ttabbed""#);
}

#[test]
fn tab_keyword_roundtrip() {
    assert_roundtrip(r#"Ts [tab "One" [Tx :a], tab "Two" [Tx :b]]"#);
}

#[test]
fn empty_document_roundtrip() {
    assert_roundtrip("");
}

// ── Canonical output shape ──────────────────────────────────────────────

#[test]
fn emit_is_deterministic() {
    let schema = schema_of("Gd 3 [Cd \"A\" [Kp :a], Cd \"B\" [Kp :b], Cd \"C\" [Kp :c]]");
    let first = emit(&schema, &EmitConfig::default()).expect("emit");
    let second = emit(&schema, &EmitConfig::default()).expect("emit");
    assert_eq!(first, second);
}

#[test]
fn canonical_text_for_a_simple_block() {
    let schema = schema_of("Kp   :revenue   // trailing comment");
    let out = emit(&schema, &EmitConfig::default()).expect("emit");
    assert_eq!(out, "Kp :revenue\n");
}

#[test]
fn compact_config_prefers_digit_codes() {
    let schema = schema_of("Kp :revenue");
    let out = emit(&schema, &EmitConfig { compact: true }).expect("emit");
    assert_eq!(out, "1 :revenue\n");
    // Compact output parses back to the same schema.
    assert_roundtrip("1 :revenue");
}

#[test]
fn compact_falls_back_for_types_without_digits() {
    let schema = schema_of("Md \"Hello\"");
    let out = emit(&schema, &EmitConfig { compact: true }).expect("emit");
    assert_eq!(out, "Md \"Hello\"\n");
}

#[test]
fn signal_declarations_emit_on_the_first_line() {
    let schema = schema_of("@tab:number=0!\n@query\nTx <query");
    let out = emit(&schema, &EmitConfig::default()).expect("emit");
    assert_eq!(out.lines().next(), Some("@tab:number=0! @query"));
}

#[test]
fn short_leaf_groups_stay_inline() {
    let schema = schema_of("Cd [Tx :a, Tx :b]");
    let out = emit(&schema, &EmitConfig::default()).expect("emit");
    assert_eq!(out, "Cd [Tx :a, Tx :b]\n");
}

#[test]
fn long_groups_go_one_per_line() {
    let schema = schema_of("Cd [Tx :a, Tx :b, Tx :c, Tx :d]");
    let out = emit(&schema, &EmitConfig::default()).expect("emit");
    assert_eq!(out, "Cd [\n  Tx :a\n  Tx :b\n  Tx :c\n  Tx :d\n]\n");
}

#[test]
fn nested_groups_indent_by_two_spaces() {
    let schema = schema_of("Cd [Cn [Tx :a, Tx :b, Tx :c, Tx :d], Tx :e]");
    let out = emit(&schema, &EmitConfig::default()).expect("emit");
    let expected = "Cd [\n  Cn [\n    Tx :a\n    Tx :b\n    Tx :c\n    Tx :d\n  ]\n  Tx :e\n]\n";
    assert_eq!(out, expected);
}

#[test]
fn hidden_layers_emit_on_their_marker_line() {
    let schema = schema_of("Bt \"Open\" >/1\n/1\nTx \"overlay\"");
    let out = emit(&schema, &EmitConfig::default()).expect("emit");
    assert_eq!(out, "Bt \"Open\" >/1\n/1 Tx \"overlay\"\n");
}

#[test]
fn base_blocks_after_an_overlay_stay_in_the_base_layer() {
    let input = "Bt \"Open\" >/1\n/1\nMd \"Details\" [Tx \"body\"]\nKp :revenue";
    assert_roundtrip(input);
    let out = emit(&schema_of(input), &EmitConfig::default()).expect("emit");
    assert_eq!(
        out,
        "Bt \"Open\" >/1\nKp :revenue\n/1 Md \"Details\" [Tx \"body\"]\n"
    );
}

#[test]
fn nesting_beyond_the_depth_cap_is_refused() {
    // The parser can never build this; only a hand-constructed schema can.
    let mut block = Block::new("leaf".to_string(), BlockType::Text);
    for i in 0..=MAX_NESTING_DEPTH {
        let mut parent = Block::new(format!("n{i}"), BlockType::Card);
        parent.children = Some(vec![block]);
        block = parent;
    }
    let schema = LiquidSchema {
        version: "1.0".to_string(),
        signals: Vec::new(),
        layers: vec![Layer {
            id: 0,
            visible: true,
            root: block,
        }],
    };
    assert!(matches!(
        emit(&schema, &EmitConfig::default()),
        Err(EmitError::InvalidSchema { .. })
    ));
}

#[test]
fn unknown_version_is_refused() {
    let mut schema = schema_of("Kp :revenue");
    schema.version = "9.9".to_string();
    assert!(matches!(
        emit(&schema, &EmitConfig::default()),
        Err(EmitError::Registry(RegistryError::UnknownVersion { .. }))
    ));
}
