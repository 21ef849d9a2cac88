//! LiquidCode emitter — converts a schema back into canonical notation text.
//!
//! Emission is deterministic: per block the segments follow a fixed canonical
//! order (type, binding, label, layout, style, action, signals, condition,
//! trigger, children), all iteration follows `Vec` order, and the same schema
//! always produces byte-identical output. Line layout (inline vs. indented
//! child lists) is cosmetic and never carries meaning.

use crate::grammar::schema::{
    Binding, Block, Flex, GridFit, Layer, LiquidSchema, Priority, Signal, SpanValue, TriggerAction,
};
use liquidcode_registry::{BlockType, MAX_NESTING_DEPTH, RegistryError, TypeRegistry, registry_for};
use thiserror::Error;

// ── Configuration ───────────────────────────────────────────────────────

/// Configuration for the LiquidCode emitter.
#[derive(Debug, Clone, Default)]
pub struct EmitConfig {
    /// Prefer single-digit numeric codes over two-letter codes for the ten
    /// types that have them (`1 :revenue` instead of `Kp :revenue`).
    pub compact: bool,
}

/// The schema cannot be rendered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmitError {
    /// The schema carries a version the registry does not know.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A hand-built schema violates an invariant the parser would have
    /// enforced (e.g., an open trigger with no target layer).
    #[error("schema is not emittable: {detail}")]
    InvalidSchema {
        /// What is wrong with the schema.
        detail: String,
    },
}

// ── Public API ──────────────────────────────────────────────────────────

/// Emit canonical LiquidCode text for a schema.
///
/// The schema's version selects the registry tables; an unknown version is
/// refused. Signal declarations render on the first line, the base layer
/// follows, and each hidden layer renders after its `/N` marker.
pub fn emit(schema: &LiquidSchema, config: &EmitConfig) -> Result<String, EmitError> {
    let registry = registry_for(&schema.version)?;
    let mut out = String::new();
    if !schema.signals.is_empty() {
        let decls: Vec<String> = schema.signals.iter().map(signal_decl).collect();
        out.push_str(&decls.join(" "));
        out.push('\n');
    }
    for layer in &schema.layers {
        emit_layer(&mut out, layer, registry, config)?;
    }
    Ok(out)
}

// ── Layer emission ──────────────────────────────────────────────────────

fn emit_layer(
    out: &mut String,
    layer: &Layer,
    registry: &TypeRegistry,
    config: &EmitConfig,
) -> Result<(), EmitError> {
    // A hidden layer has a single root block, bound to its marker; the
    // parser reads exactly one block per `/N`, so the root emits on the
    // marker's line and is never unwrapped.
    if layer.id != 0 {
        let mut line = String::new();
        emit_block(&mut line, &layer.root, registry, config, 0)?;
        out.push('/');
        out.push_str(&layer.id.to_string());
        out.push(' ');
        out.push_str(&line);
        out.push('\n');
        return Ok(());
    }
    // A synthetic base-layer root exists only to make `layers[0].root`
    // singular; its children render as top-level lines and the parser
    // re-wraps them.
    for block in root_blocks(&layer.root) {
        let mut line = String::new();
        emit_block(&mut line, block, registry, config, 0)?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(())
}

/// The top-level blocks of the base layer: the root itself, or its children
/// when the root is a bare wrapper container.
fn root_blocks(root: &Block) -> Vec<&Block> {
    if is_bare_container(root) {
        root.children.iter().flatten().collect()
    } else {
        vec![root]
    }
}

/// A container carrying nothing but two or more children (the shape of a
/// synthetic wrapper inserted by the parser). A single-child container is
/// never unwrapped: the parser only wraps when it has several blocks, so
/// unwrapping one child would not survive a reparse.
fn is_bare_container(block: &Block) -> bool {
    block.block_type == BlockType::Container
        && block.children.as_ref().is_some_and(|c| c.len() >= 2)
        && block.binding.is_none()
        && block.label.is_none()
        && block.layout.is_none()
        && block.style.is_none()
        && block.signals.is_none()
        && block.condition.is_none()
        && block.trigger.is_none()
        && block.action.is_none()
        && block.template.is_none()
}

// ── Block emission ──────────────────────────────────────────────────────

fn emit_block(
    out: &mut String,
    block: &Block,
    registry: &TypeRegistry,
    config: &EmitConfig,
    depth: usize,
) -> Result<(), EmitError> {
    // Same cap the parser enforces; a deeper schema cannot have come from
    // the parser and would otherwise recurse without bound.
    if depth >= MAX_NESTING_DEPTH {
        return Err(EmitError::InvalidSchema {
            detail: format!("nesting exceeds the maximum depth of {MAX_NESTING_DEPTH}"),
        });
    }
    let mut segments: Vec<String> = Vec::new();
    segments.push(type_segment(block, registry, config));

    if let Some(binding) = &block.binding {
        segments.push(binding_segment(binding));
    }
    if let Some(label) = &block.label {
        segments.push(quote(label));
    }
    if let Some(layout) = &block.layout {
        if let Some(priority) = layout.priority {
            segments.push(priority_segment(priority));
        }
        if let Some(span) = layout.span {
            segments.push(span_segment(span));
        }
        if let Some(flex) = layout.flex {
            let c = match flex {
                Flex::Row => 'r',
                Flex::Column => 'c',
                Flex::Grow => 'g',
                Flex::Fixed => 'f',
            };
            segments.push(format!("^{c}"));
        }
    }
    if let Some(style) = &block.style {
        if let Some(color) = &style.color {
            segments.push(format!("#{color}"));
        }
        if let Some(size) = &style.size {
            segments.push(format!("%{size}"));
        }
    }
    if let Some(action) = &block.action {
        segments.push(format!("!{action}"));
    }
    if let Some(refs) = &block.signals {
        if let Some(emit) = &refs.emit {
            let mut s = format!(">{}", emit.name);
            if let Some(value) = &emit.value {
                s.push('=');
                s.push_str(&value_text(value));
            }
            segments.push(s);
        }
        if let Some(receive) = &refs.receive {
            segments.push(format!("<{receive}"));
        }
        if let Some(both) = &refs.both {
            segments.push(format!("<>{both}"));
        }
    }
    if let Some(cond) = &block.condition {
        segments.push(format!(
            "?@{}{}{}",
            cond.signal,
            cond.op.symbol(),
            value_text(&cond.value)
        ));
    }
    if let Some(trigger) = &block.trigger {
        match trigger.action {
            TriggerAction::Open => {
                let Some(layer) = trigger.layer else {
                    return Err(EmitError::InvalidSchema {
                        detail: format!("block {:?} has an open trigger with no layer", block.uid),
                    });
                };
                segments.push(format!(">/{layer}"));
            }
            TriggerAction::Close => segments.push("/<".to_string()),
        }
    }

    out.push_str(&segments.join(" "));

    let items = group_items(block);
    if !items.is_empty() {
        out.push(' ');
        emit_group(out, &items, registry, config, depth)?;
    }
    Ok(())
}

/// The bracket-group members of a block: children, or the template's
/// constituent blocks for list/table.
fn group_items(block: &Block) -> Vec<&Block> {
    if let Some(template) = &block.template {
        if is_bare_container(template) {
            template.children.iter().flatten().collect()
        } else {
            vec![template.as_ref()]
        }
    } else {
        block.children.iter().flatten().collect()
    }
}

/// Render a bracket group: short lists of leaf blocks stay inline, anything
/// bigger gets one block per line with 2-space indentation.
fn emit_group(
    out: &mut String,
    items: &[&Block],
    registry: &TypeRegistry,
    config: &EmitConfig,
    depth: usize,
) -> Result<(), EmitError> {
    let inline = items.len() <= 3 && items.iter().all(|b| b.is_leaf());
    out.push('[');
    if inline {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            emit_block(out, item, registry, config, depth + 1)?;
        }
    } else {
        out.push('\n');
        let indent = "  ".repeat(depth + 1);
        for item in items {
            out.push_str(&indent);
            emit_block(out, item, registry, config, depth + 1)?;
            out.push('\n');
        }
        out.push_str(&"  ".repeat(depth));
    }
    out.push(']');
    Ok(())
}

// ── Segment rendering ───────────────────────────────────────────────────

fn type_segment(block: &Block, registry: &TypeRegistry, config: &EmitConfig) -> String {
    let layout = block.layout.as_ref();
    if block.block_type == BlockType::Grid {
        let mut s = registry.code_of(block.block_type).to_string();
        if let Some(layout) = layout {
            if let Some(fit) = layout.fit {
                match fit {
                    GridFit::Auto => s.push_str("~fit"),
                    GridFit::MinWidth { min } => {
                        s.push('~');
                        s.push_str(&min.to_string());
                    }
                }
            } else if let Some(cols) = layout.columns {
                s.push_str(&cols.to_string());
                if let Some(rows) = layout.rows {
                    s.push('x');
                    s.push_str(&rows.to_string());
                }
            }
            if layout.center {
                s.push('c');
            }
        }
        return s;
    }
    if config.compact
        && let Some(index) = registry.index_of(block.block_type)
    {
        return index.to_string();
    }
    registry.code_of(block.block_type).to_string()
}

fn binding_segment(binding: &Binding) -> String {
    match binding {
        Binding::Field { value, relative } => {
            if *relative {
                format!(":.{value}")
            } else {
                format!(":{value}")
            }
        }
        Binding::Index { value } => value.clone(),
        Binding::Expr { value } => format!("={value}"),
        Binding::Value { value } => format!("={}", value_text(value)),
    }
}

fn priority_segment(priority: Priority) -> String {
    match priority {
        Priority::Hero => "!h".to_string(),
        Priority::Primary => "!p".to_string(),
        Priority::Secondary => "!s".to_string(),
        Priority::Level(n) => format!("!{n}"),
    }
}

fn span_segment(span: SpanValue) -> String {
    match span {
        SpanValue::Cols(n) => format!("*{n}"),
        SpanValue::Full => "*f".to_string(),
        SpanValue::Half => "*h".to_string(),
        SpanValue::Third => "*t".to_string(),
        SpanValue::Quarter => "*q".to_string(),
    }
}

fn signal_decl(signal: &Signal) -> String {
    let mut s = format!("@{}", signal.name);
    if let Some(ty) = &signal.signal_type {
        s.push(':');
        s.push_str(ty);
    }
    if let Some(default) = &signal.default {
        s.push('=');
        s.push_str(&value_text(default));
    }
    if signal.persist {
        s.push('!');
    }
    s
}

/// Render a stored value: bare when it reads back as a number, quoted
/// otherwise.
fn value_text(value: &str) -> String {
    if !value.is_empty() && value.parse::<f64>().is_ok() {
        value.to_string()
    } else {
        quote(value)
    }
}

/// Quote and escape a string literal (`"` `\` newline, tab).
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
