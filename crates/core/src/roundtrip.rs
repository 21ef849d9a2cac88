//! Parse/emit equivalence checking — the correctness oracle for the
//! compiler.
//!
//! [`roundtrip`] emits a schema to canonical text, reparses that text, and
//! structurally compares the reconstruction against the original. The
//! comparison ignores parse-time `uid`s and treats absent optionals as their
//! defaults; every mismatch becomes a path-qualified difference string.
//! Mismatches are data, not errors — only emit/reparse failures are.

use crate::grammar::emit::{EmitConfig, EmitError, emit};
use crate::grammar::parser::{ParseError, parse_with_version};
use crate::grammar::schema::{Block, Layout, LiquidSchema, SignalRefs, Style};
use thiserror::Error;

/// The round trip itself failed before any comparison could run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoundtripError {
    /// The schema could not be emitted.
    #[error("emit failed: {0}")]
    Emit(#[from] EmitError),
    /// The emitted text did not parse back. This always indicates a compiler
    /// defect: canonical output must be valid input.
    #[error("reparse of emitted text failed: {0}")]
    Reparse(#[from] ParseError),
}

/// Outcome of an emit → reparse → compare cycle.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RoundtripReport {
    /// The canonical text the schema emitted.
    pub dsl: String,
    /// The schema parsed back from `dsl`.
    pub reconstructed: LiquidSchema,
    /// Whether the reconstruction is structurally equivalent.
    pub is_equivalent: bool,
    /// Path-qualified mismatch descriptions, empty when equivalent
    /// (e.g. `layers[0].root.children[2].style.color: Some("blue") vs None`).
    pub differences: Vec<String>,
}

/// Emit, reparse, and compare a schema against its own reconstruction.
pub fn roundtrip(schema: &LiquidSchema) -> Result<RoundtripReport, RoundtripError> {
    let dsl = emit(schema, &EmitConfig::default())?;
    let reconstructed = parse_with_version(&dsl, &schema.version)?.schema;
    let differences = compare_schemas(schema, &reconstructed);
    Ok(RoundtripReport {
        dsl,
        is_equivalent: differences.is_empty(),
        reconstructed,
        differences,
    })
}

/// Structurally compare two schemas, returning one path-qualified string per
/// mismatch. `uid` fields are never compared; absent optional structures
/// compare as their defaults.
pub fn compare_schemas(expected: &LiquidSchema, actual: &LiquidSchema) -> Vec<String> {
    let mut diffs = Vec::new();
    push_diff(&mut diffs, "", "version", &expected.version, &actual.version);

    if expected.signals.len() != actual.signals.len() {
        diffs.push(format!(
            "signals: {} declared vs {}",
            expected.signals.len(),
            actual.signals.len()
        ));
    }
    for (i, (e, a)) in expected.signals.iter().zip(&actual.signals).enumerate() {
        let path = format!("signals[{i}]");
        push_diff(&mut diffs, &path, "name", &e.name, &a.name);
        push_diff(&mut diffs, &path, "signal_type", &e.signal_type, &a.signal_type);
        push_diff(&mut diffs, &path, "default", &e.default, &a.default);
        push_diff(&mut diffs, &path, "persist", &e.persist, &a.persist);
    }

    if expected.layers.len() != actual.layers.len() {
        diffs.push(format!(
            "layers: {} vs {}",
            expected.layers.len(),
            actual.layers.len()
        ));
    }
    for (i, (e, a)) in expected.layers.iter().zip(&actual.layers).enumerate() {
        let path = format!("layers[{i}]");
        push_diff(&mut diffs, &path, "id", &e.id, &a.id);
        push_diff(&mut diffs, &path, "visible", &e.visible, &a.visible);
        compare_blocks(&mut diffs, &format!("{path}.root"), &e.root, &a.root);
    }
    diffs
}

fn compare_blocks(diffs: &mut Vec<String>, path: &str, expected: &Block, actual: &Block) {
    if expected.block_type != actual.block_type {
        diffs.push(format!(
            "{path}.type: {} vs {}",
            expected.block_type, actual.block_type
        ));
    }
    push_diff(diffs, path, "binding", &expected.binding, &actual.binding);
    push_diff(diffs, path, "label", &expected.label, &actual.label);

    let (el, al) = (
        expected.layout.clone().unwrap_or_default(),
        actual.layout.clone().unwrap_or_default(),
    );
    compare_layout(diffs, path, &el, &al);

    let (es, as_) = (
        expected.style.clone().unwrap_or_default(),
        actual.style.clone().unwrap_or_default(),
    );
    compare_style(diffs, path, &es, &as_);

    push_diff(diffs, path, "action", &expected.action, &actual.action);

    let (er, ar) = (
        expected.signals.clone().unwrap_or_default(),
        actual.signals.clone().unwrap_or_default(),
    );
    compare_signals(diffs, path, &er, &ar);

    push_diff(diffs, path, "condition", &expected.condition, &actual.condition);
    push_diff(diffs, path, "trigger", &expected.trigger, &actual.trigger);

    let empty = Vec::new();
    let ec = expected.children.as_ref().unwrap_or(&empty);
    let ac = actual.children.as_ref().unwrap_or(&empty);
    if ec.len() != ac.len() {
        diffs.push(format!(
            "{path}.children: {} blocks vs {}",
            ec.len(),
            ac.len()
        ));
    }
    for (i, (e, a)) in ec.iter().zip(ac).enumerate() {
        compare_blocks(diffs, &format!("{path}.children[{i}]"), e, a);
    }

    match (&expected.template, &actual.template) {
        (Some(e), Some(a)) => compare_blocks(diffs, &format!("{path}.template"), e, a),
        (Some(_), None) => diffs.push(format!("{path}.template: present vs absent")),
        (None, Some(_)) => diffs.push(format!("{path}.template: absent vs present")),
        (None, None) => {}
    }
}

fn compare_layout(diffs: &mut Vec<String>, path: &str, expected: &Layout, actual: &Layout) {
    push_diff(diffs, path, "layout.priority", &expected.priority, &actual.priority);
    push_diff(diffs, path, "layout.span", &expected.span, &actual.span);
    push_diff(diffs, path, "layout.flex", &expected.flex, &actual.flex);
    push_diff(diffs, path, "layout.columns", &expected.columns, &actual.columns);
    push_diff(diffs, path, "layout.rows", &expected.rows, &actual.rows);
    push_diff(diffs, path, "layout.fit", &expected.fit, &actual.fit);
    push_diff(diffs, path, "layout.center", &expected.center, &actual.center);
}

fn compare_style(diffs: &mut Vec<String>, path: &str, expected: &Style, actual: &Style) {
    push_diff(diffs, path, "style.color", &expected.color, &actual.color);
    push_diff(diffs, path, "style.size", &expected.size, &actual.size);
}

fn compare_signals(diffs: &mut Vec<String>, path: &str, expected: &SignalRefs, actual: &SignalRefs) {
    push_diff(diffs, path, "signals.emit", &expected.emit, &actual.emit);
    push_diff(diffs, path, "signals.receive", &expected.receive, &actual.receive);
    push_diff(diffs, path, "signals.both", &expected.both, &actual.both);
}

fn push_diff<T: std::fmt::Debug + PartialEq>(
    diffs: &mut Vec<String>,
    path: &str,
    field: &str,
    expected: &T,
    actual: &T,
) {
    if expected != actual {
        let dot = if path.is_empty() { "" } else { "." };
        diffs.push(format!("{path}{dot}{field}: {expected:?} vs {actual:?}"));
    }
}
