use super::{
    diag::{Diagnostic, LineIndex, codes},
    scanner::{self, ScanError, TokKind, Token, unquote},
    schema::{
        Binding, Block, CondOp, Condition, Emit, Flex, GridFit, Layer, Layout, LiquidSchema,
        Priority, Signal, SignalRefs, SpanValue, Style, Trigger, TriggerAction,
    },
};
use liquidcode_registry::{
    BlockType, MAX_NESTING_DEPTH, RegistryError, SCHEMA_VERSION, TypeRegistry, registry_for,
};
use thiserror::Error;

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Result of parsing a LiquidCode input string.
#[derive(Debug, serde::Serialize)]
pub struct ParseResult {
    /// The parsed schema.
    pub schema: LiquidSchema,
    /// Non-fatal diagnostics (warnings, info) produced during parsing.
    pub diagnostics: Vec<Diagnostic>,
}

/// A structural violation aborted the parse. No partial schema is produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The scanner rejected the input.
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// The registry refused the requested schema version, or its tables are
    /// defective.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A token appeared somewhere the grammar does not allow it.
    #[error("unexpected {found:?} at offset {offset}")]
    UnexpectedToken {
        /// Byte offset of the offending token.
        offset: usize,
        /// The offending token text.
        found: String,
    },
    /// A `[` was never closed.
    #[error("unmatched '[' opened at offset {offset}")]
    UnmatchedBracket {
        /// Byte offset of the opening bracket.
        offset: usize,
    },
    /// A type code not present in the registry for this version.
    #[error("unknown type code {code:?} at offset {offset}")]
    UnknownTypeCode {
        /// Byte offset of the code.
        offset: usize,
        /// The unresolvable code text.
        code: String,
    },
    /// A grid spec suffix that does not match `N`, `NxM`, `~fit`, or `~px`.
    #[error("malformed grid spec {text:?} at offset {offset}")]
    InvalidGridSpec {
        /// Byte offset of the spec.
        offset: usize,
        /// The full spec text.
        text: String,
    },
    /// A modifier body outside its category's vocabulary.
    #[error("invalid modifier {text:?} at offset {offset}")]
    InvalidModifier {
        /// Byte offset of the modifier.
        offset: usize,
        /// The full modifier text.
        text: String,
    },
    /// A leading-dot binding used where no template item exists to resolve it.
    #[error("relative binding {path:?} at offset {offset} is only valid inside a list or table template")]
    RelativeBindingOutsideTemplate {
        /// Byte offset of the binding.
        offset: usize,
        /// The relative path, without sigils.
        path: String,
    },
    /// A signal referenced by wiring or a condition was never declared.
    #[error("signal {name:?} is referenced but never declared")]
    UndeclaredSignal {
        /// The missing signal name.
        name: String,
    },
    /// A trigger targets a layer id with no `/N` definition.
    #[error("trigger references layer {layer}, which is never defined")]
    UndeclaredLayer {
        /// The missing layer id.
        layer: u32,
    },
    /// The same layer id was defined twice (or `/0` shadowed the base layer).
    #[error("layer {layer} is defined more than once")]
    DuplicateLayer {
        /// The duplicated id.
        layer: u32,
    },
    /// A `/N` marker with no block after it to serve as the layer root.
    #[error("layer marker /{layer} at offset {offset} is not followed by a block")]
    EmptyLayer {
        /// Byte offset of the marker.
        offset: usize,
        /// The layer id the marker declared.
        layer: u32,
    },
    /// Nesting beyond the fixed depth cap.
    #[error("nesting exceeds the maximum depth of {max}")]
    DepthExceeded {
        /// The cap that was exceeded.
        max: usize,
    },
}

impl ParseError {
    /// Byte offset of the error in the preprocessed source, when the error
    /// is anchored to a position.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::Scan(e) => Some(e.offset),
            ParseError::UnexpectedToken { offset, .. }
            | ParseError::UnmatchedBracket { offset }
            | ParseError::UnknownTypeCode { offset, .. }
            | ParseError::InvalidGridSpec { offset, .. }
            | ParseError::InvalidModifier { offset, .. }
            | ParseError::RelativeBindingOutsideTemplate { offset, .. }
            | ParseError::EmptyLayer { offset, .. } => Some(*offset),
            ParseError::Registry(_)
            | ParseError::UndeclaredSignal { .. }
            | ParseError::UndeclaredLayer { .. }
            | ParseError::DuplicateLayer { .. }
            | ParseError::DepthExceeded { .. } => None,
        }
    }

    /// 0-indexed line and column of the error within the preprocessed
    /// source, for errors anchored to a position.
    pub fn line_col(&self, source: &str) -> Option<(usize, usize)> {
        self.offset()
            .map(|offset| LineIndex::new(source).line_col(offset))
    }
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Parse a LiquidCode input string under the current schema version.
pub fn parse_str(input: &str) -> Result<ParseResult, ParseError> {
    parse_with_version(input, SCHEMA_VERSION)
}

/// Parse a LiquidCode input string under an explicit schema version.
///
/// The version pins the registry tables for the whole parse; an unknown
/// version is refused before any text is examined.
pub fn parse_with_version(input: &str, version: &str) -> Result<ParseResult, ParseError> {
    let registry = registry_for(version)?;
    let pre = scanner::preprocess(input);
    let toks = scanner::scan(&pre)?;
    Parser::new(&toks, registry).parse(version)
}

// ─── Parser Implementation ──────────────────────────────────────────────────

struct Parser<'t, 'a> {
    toks: &'t [Token<'a>],
    pos: usize,
    registry: &'static TypeRegistry,
    diags: Vec<Diagnostic>,
    signals: Vec<Signal>,
    next_uid: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(toks: &'t [Token<'a>], registry: &'static TypeRegistry) -> Self {
        Self {
            toks,
            pos: 0,
            registry,
            diags: Vec::new(),
            signals: Vec::new(),
            next_uid: 0,
        }
    }

    fn peek(&self) -> Option<&'t Token<'a>> {
        self.toks.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'t Token<'a>> {
        let tok = self.toks.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn fresh_uid(&mut self) -> String {
        let uid = format!("b{}", self.next_uid);
        self.next_uid += 1;
        uid
    }

    fn unexpected(tok: &Token<'_>) -> ParseError {
        ParseError::UnexpectedToken {
            offset: tok.start,
            found: tok.text.to_string(),
        }
    }

    // ── Top level ───────────────────────────────────────────────────────

    /// Parse the whole document: signal declarations, the base layer, and
    /// any `/N` overlay layer sections.
    ///
    /// A layer marker binds exactly one block, which becomes that overlay's
    /// root; every unprefixed block belongs to layer 0, wherever it appears.
    fn parse(mut self, version: &str) -> Result<ParseResult, ParseError> {
        let mut base: Vec<Block> = Vec::new();
        let mut overlays: Vec<(u32, Block)> = Vec::new();

        while let Some(tok) = self.peek() {
            match tok.kind {
                TokKind::Newline | TokKind::Comma => {
                    self.bump();
                }
                TokKind::SignalDecl => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    self.declare_signal(tok);
                }
                TokKind::LayerMarker => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    // Text is "/<digits>"; the scanner guarantees the shape.
                    let id: u32 = tok.text[1..]
                        .parse()
                        .map_err(|_| Self::unexpected(tok))?;
                    if id == 0 || overlays.iter().any(|(seen, _)| *seen == id) {
                        return Err(ParseError::DuplicateLayer { layer: id });
                    }
                    while self
                        .peek()
                        .is_some_and(|t| matches!(t.kind, TokKind::Newline | TokKind::Comma))
                    {
                        self.bump();
                    }
                    if self
                        .peek()
                        .is_none_or(|t| t.kind == TokKind::LayerMarker)
                    {
                        return Err(ParseError::EmptyLayer {
                            offset: tok.start,
                            layer: id,
                        });
                    }
                    let root = self.parse_block(1, false, None)?;
                    overlays.push((id, root));
                }
                _ => {
                    let block = self.parse_block(1, false, None)?;
                    base.push(block);
                }
            }
        }

        if base.is_empty() && overlays.is_empty() {
            self.diags.push(Diagnostic::warn(
                codes::PARSE_EMPTY_INPUT,
                "input contains no blocks",
                None,
            ));
        }

        let mut layers = Vec::with_capacity(1 + overlays.len());
        layers.push(Layer {
            id: 0,
            visible: true,
            root: Self::wrap_blocks(base, "root".to_string()),
        });
        for (id, root) in overlays {
            layers.push(Layer {
                id,
                visible: false,
                root,
            });
        }

        let schema = LiquidSchema {
            version: version.to_string(),
            signals: std::mem::take(&mut self.signals),
            layers,
        };
        self.validate_references(&schema)?;
        Ok(ParseResult {
            schema,
            diagnostics: self.diags,
        })
    }

    /// Collapse a top-level block list into a single root: one block stays
    /// as-is, anything else is wrapped in a synthetic container.
    fn wrap_blocks(mut blocks: Vec<Block>, synthetic_uid: String) -> Block {
        if blocks.len() == 1 {
            return blocks.remove(0);
        }
        let mut root = Block::new(synthetic_uid, BlockType::Container);
        if !blocks.is_empty() {
            root.children = Some(blocks);
        }
        root
    }

    // ── Signal declarations ─────────────────────────────────────────────

    /// Record a `@name[:type][=default][!]` declaration. Duplicates keep the
    /// first declaration and emit a warning.
    fn declare_signal(&mut self, tok: &Token<'_>) {
        let signal = parse_signal_decl(tok.text);
        if self.signals.iter().any(|s| s.name == signal.name) {
            self.diags.push(
                Diagnostic::warn(
                    codes::PARSE_DUPLICATE_SIGNAL,
                    format!("signal {:?} declared more than once; first declaration wins", signal.name),
                    Some(tok.span()),
                )
                .with_context(ctx! { "signal" => signal.name.clone() }),
            );
            return;
        }
        self.signals.push(signal);
    }

    // ── Blocks ──────────────────────────────────────────────────────────

    /// Parse one block: type, then modifiers in any order, then an optional
    /// bracketed child group.
    fn parse_block(
        &mut self,
        depth: usize,
        in_template: bool,
        parent: Option<BlockType>,
    ) -> Result<Block, ParseError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ParseError::DepthExceeded {
                max: MAX_NESTING_DEPTH,
            });
        }
        let Some(head) = self.bump() else {
            return Err(ParseError::UnexpectedToken {
                offset: self.toks.last().map_or(0, |t| t.end),
                found: String::new(),
            });
        };

        let mut layout = Layout::default();
        let block_type = match head.kind {
            TokKind::TypeCode => self
                .registry
                .type_by_code(head.text)
                .ok_or_else(|| ParseError::UnknownTypeCode {
                    offset: head.start,
                    code: head.text.to_string(),
                })?,
            TokKind::Number if head.text.len() == 1 => {
                let digit = head.text.as_bytes()[0] - b'0';
                self.registry
                    .type_by_index(digit)
                    .ok_or_else(|| ParseError::UnknownTypeCode {
                        offset: head.start,
                        code: head.text.to_string(),
                    })?
            }
            TokKind::GridSpec => {
                let (code, spec) = head.text.split_at(2);
                let block_type = self.registry.type_by_code(code).filter(|bt| *bt == BlockType::Grid);
                let Some(block_type) = block_type else {
                    return Err(ParseError::UnknownTypeCode {
                        offset: head.start,
                        code: head.text.to_string(),
                    });
                };
                apply_grid_spec(&mut layout, spec, head)?;
                block_type
            }
            TokKind::Ident if head.text == "tab" && parent == Some(BlockType::Tabs) => {
                BlockType::Tab
            }
            _ => return Err(Self::unexpected(head)),
        };

        let mut block = Block::new(self.fresh_uid(), block_type);
        let mut style = Style::default();
        let mut signals = SignalRefs::default();

        loop {
            let Some(tok) = self.peek() else { break };
            match tok.kind {
                TokKind::Binding => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    let binding = parse_binding(tok, in_template)?;
                    self.set_slot(&mut block.binding, binding, "binding", tok);
                }
                TokKind::Expr => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    let binding = parse_expr_binding(&tok.text[1..]);
                    self.set_slot(&mut block.binding, binding, "binding", tok);
                }
                TokKind::Number => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    if block_type == BlockType::Grid {
                        // Bare number on a grid is the column count.
                        let cols = tok.text.parse::<u8>().map_err(|_| Self::unexpected(tok))?;
                        self.set_slot(&mut layout.columns, cols, "columns", tok);
                    } else {
                        let binding = Binding::Index {
                            value: tok.text.to_string(),
                        };
                        self.set_slot(&mut block.binding, binding, "binding", tok);
                    }
                }
                TokKind::Str => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    let label = unquote(tok.text);
                    if block.label.replace(label).is_some() {
                        self.warn_override("label", tok);
                    }
                }
                TokKind::Modifier => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    self.apply_modifier(tok, &mut block, &mut layout, &mut style)?;
                }
                TokKind::SignalEmit => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    let emit = parse_emit(tok.text);
                    if signals.emit.replace(emit).is_some() {
                        self.warn_override("emit", tok);
                    }
                }
                TokKind::SignalReceive => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    if signals.receive.replace(tok.text[1..].to_string()).is_some() {
                        self.warn_override("receive", tok);
                    }
                }
                TokKind::SignalBoth => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    if signals.both.replace(tok.text[2..].to_string()).is_some() {
                        self.warn_override("both", tok);
                    }
                }
                TokKind::Condition => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    let cond = parse_condition(tok)?;
                    if block.condition.replace(cond).is_some() {
                        self.warn_override("condition", tok);
                    }
                }
                TokKind::TriggerOpen => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    let layer: u32 = tok.text[2..].parse().map_err(|_| Self::unexpected(tok))?;
                    let trigger = Trigger {
                        action: TriggerAction::Open,
                        layer: Some(layer),
                    };
                    if block.trigger.replace(trigger).is_some() {
                        self.warn_override("trigger", tok);
                    }
                }
                TokKind::TriggerClose => {
                    let tok = &self.toks[self.pos];
                    self.bump();
                    let trigger = Trigger {
                        action: TriggerAction::Close,
                        layer: None,
                    };
                    if block.trigger.replace(trigger).is_some() {
                        self.warn_override("trigger", tok);
                    }
                }
                TokKind::LBracket => {
                    let open = &self.toks[self.pos];
                    self.bump();
                    self.parse_group(open, depth, in_template, &mut block)?;
                    // A child group always ends the block.
                    break;
                }
                // Anything else starts a new block or closes the current
                // context; the block is complete.
                _ => break,
            }
        }

        if !layout.is_empty() {
            block.layout = Some(layout);
        }
        if !style.is_empty() {
            block.style = Some(style);
        }
        if !signals.is_empty() {
            block.signals = Some(signals);
        }
        Ok(block)
    }

    /// Parse a bracketed group and attach it as `children`, or as `template`
    /// for list/table blocks.
    fn parse_group(
        &mut self,
        open: &Token<'_>,
        depth: usize,
        in_template: bool,
        block: &mut Block,
    ) -> Result<(), ParseError> {
        let is_template = matches!(block.block_type, BlockType::List | BlockType::Table);
        let inner_template = in_template || is_template;
        let mut items = Vec::new();
        loop {
            let Some(tok) = self.peek() else {
                return Err(ParseError::UnmatchedBracket { offset: open.start });
            };
            match tok.kind {
                TokKind::Newline | TokKind::Comma => {
                    self.bump();
                }
                TokKind::RBracket => {
                    self.bump();
                    break;
                }
                _ => {
                    let child =
                        self.parse_block(depth + 1, inner_template, Some(block.block_type))?;
                    items.push(child);
                }
            }
        }
        if items.is_empty() {
            return Ok(());
        }
        if is_template {
            let uid = self.fresh_uid();
            block.template = Some(Box::new(Self::wrap_blocks(items, uid)));
        } else {
            block.children = Some(items);
        }
        Ok(())
    }

    // ── Modifiers ───────────────────────────────────────────────────────

    /// Apply a sigil modifier (`!` `*` `^` `#` `%`) to the block under
    /// construction. A later modifier in the same category overrides the
    /// earlier one with a warning.
    fn apply_modifier(
        &mut self,
        tok: &Token<'_>,
        block: &mut Block,
        layout: &mut Layout,
        style: &mut Style,
    ) -> Result<(), ParseError> {
        let invalid = || ParseError::InvalidModifier {
            offset: tok.start,
            text: tok.text.to_string(),
        };
        let body = &tok.text[1..];
        match tok.text.as_bytes()[0] {
            b'!' => match body {
                "h" => self.set_slot(&mut layout.priority, Priority::Hero, "priority", tok),
                "p" => {
                    self.set_slot(&mut layout.priority, Priority::Primary, "priority", tok);
                }
                "s" => {
                    self.set_slot(&mut layout.priority, Priority::Secondary, "priority", tok);
                }
                _ if body.len() == 1 && body.as_bytes()[0].is_ascii_digit() => {
                    let level = body.as_bytes()[0] - b'0';
                    self.set_slot(&mut layout.priority, Priority::Level(level), "priority", tok);
                }
                // Multi-letter bodies are action names (`!submit`).
                _ if body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
                    if block.action.replace(body.to_string()).is_some() {
                        self.warn_override("action", tok);
                    }
                }
                _ => return Err(invalid()),
            },
            b'*' => {
                let span = match body {
                    "f" => SpanValue::Full,
                    "h" => SpanValue::Half,
                    "t" => SpanValue::Third,
                    "q" => SpanValue::Quarter,
                    _ if body.len() == 1 && body.as_bytes()[0].is_ascii_digit() => {
                        SpanValue::Cols(body.as_bytes()[0] - b'0')
                    }
                    _ => return Err(invalid()),
                };
                self.set_slot(&mut layout.span, span, "span", tok);
            }
            b'^' => {
                let flex = match body {
                    "r" => Flex::Row,
                    "c" => Flex::Column,
                    "g" => Flex::Grow,
                    "f" => Flex::Fixed,
                    _ => return Err(invalid()),
                };
                self.set_slot(&mut layout.flex, flex, "flex", tok);
            }
            b'#' => {
                let color = self.registry.canonical_color(body).to_string();
                if style.color.replace(color).is_some() {
                    self.warn_override("color", tok);
                }
            }
            b'%' => {
                let size = self.registry.canonical_size(body).to_string();
                if style.size.replace(size).is_some() {
                    self.warn_override("size", tok);
                }
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }

    fn set_slot<T>(&mut self, slot: &mut Option<T>, value: T, what: &str, tok: &Token<'_>) {
        if slot.replace(value).is_some() {
            self.warn_override(what, tok);
        }
    }

    fn warn_override(&mut self, what: &str, tok: &Token<'_>) {
        self.diags.push(
            Diagnostic::warn(
                codes::PARSE_MODIFIER_OVERRIDE,
                format!("{what} specified more than once; the later value wins"),
                Some(tok.span()),
            )
            .with_context(ctx! { "modifier" => what }),
        );
    }

    // ── Post-parse validation ───────────────────────────────────────────

    /// Every referenced signal must be declared and every opened layer must
    /// exist. Runs over the finished schema so forward references work.
    fn validate_references(&self, schema: &LiquidSchema) -> Result<(), ParseError> {
        for layer in &schema.layers {
            self.validate_block(schema, &layer.root)?;
        }
        Ok(())
    }

    fn validate_block(&self, schema: &LiquidSchema, block: &Block) -> Result<(), ParseError> {
        if let Some(refs) = &block.signals {
            for name in refs.names() {
                if schema.signal(name).is_none() {
                    return Err(ParseError::UndeclaredSignal {
                        name: name.to_string(),
                    });
                }
            }
        }
        if let Some(cond) = &block.condition
            && schema.signal(&cond.signal).is_none()
        {
            return Err(ParseError::UndeclaredSignal {
                name: cond.signal.clone(),
            });
        }
        if let Some(trigger) = &block.trigger
            && let Some(layer) = trigger.layer
            && schema.layer(layer).is_none()
        {
            return Err(ParseError::UndeclaredLayer { layer });
        }
        for child in block.children.iter().flatten() {
            self.validate_block(schema, child)?;
        }
        if let Some(template) = &block.template {
            self.validate_block(schema, template)?;
        }
        Ok(())
    }
}

// ─── Token text helpers ─────────────────────────────────────────────────────
// The scanner glues compound tokens (signal declarations, emits, conditions)
// into single slices; these helpers split them back apart. The scanner has
// already validated the shapes, so slicing here is panic-free.

fn ident_end(s: &str) -> usize {
    s.bytes()
        .position(|b| !(b.is_ascii_alphanumeric() || b == b'_'))
        .unwrap_or(s.len())
}

/// Decode a value that may be a quoted literal.
fn decode_value(raw: &str) -> String {
    if raw.starts_with('"') {
        unquote(raw)
    } else {
        raw.to_string()
    }
}

/// Split `@name[:type][=default][!]` into a [`Signal`].
fn parse_signal_decl(text: &str) -> Signal {
    let body = &text[1..];
    let name_end = ident_end(body);
    let name = body[..name_end].to_string();
    let mut rest = &body[name_end..];

    let mut signal_type = None;
    if let Some(after) = rest.strip_prefix(':') {
        let ty_end = ident_end(after);
        signal_type = Some(after[..ty_end].to_string());
        rest = &after[ty_end..];
    }

    let persist = rest.ends_with('!');
    if persist {
        rest = &rest[..rest.len() - 1];
    }

    let default = rest.strip_prefix('=').map(decode_value);
    Signal {
        name,
        signal_type,
        default,
        persist,
    }
}

/// Split `>name[=value]` into an [`Emit`].
fn parse_emit(text: &str) -> Emit {
    let body = &text[1..];
    match body.split_once('=') {
        Some((name, value)) => Emit {
            name: name.to_string(),
            value: Some(decode_value(value)),
        },
        None => Emit {
            name: body.to_string(),
            value: None,
        },
    }
}

/// Interpret a `:path` token as a binding, rejecting relative paths outside
/// template subtrees.
fn parse_binding(tok: &Token<'_>, in_template: bool) -> Result<Binding, ParseError> {
    let body = &tok.text[1..];
    let relative = body.starts_with('.');
    let value = body.trim_start_matches('.').to_string();
    if relative && !in_template {
        return Err(ParseError::RelativeBindingOutsideTemplate {
            offset: tok.start,
            path: value,
        });
    }
    Ok(Binding::Field { value, relative })
}

/// Interpret an `=` body as a constant (`Value`) or computed (`Expr`) binding.
/// Quoted strings and bare numbers are constants; everything else is an
/// expression.
fn parse_expr_binding(body: &str) -> Binding {
    if body.starts_with('"') {
        return Binding::Value {
            value: unquote(body),
        };
    }
    if body.parse::<f64>().is_ok() {
        return Binding::Value {
            value: body.to_string(),
        };
    }
    Binding::Expr {
        value: body.to_string(),
    }
}

/// Split `?@name<op><value>` into a [`Condition`].
fn parse_condition(tok: &Token<'_>) -> Result<Condition, ParseError> {
    let body = &tok.text[2..]; // past "?@"
    let name_end = ident_end(body);
    let signal = body[..name_end].to_string();
    let rest = &body[name_end..];
    let (op, value) = if let Some(v) = rest.strip_prefix(">=") {
        (CondOp::Ge, v)
    } else if let Some(v) = rest.strip_prefix("<=") {
        (CondOp::Le, v)
    } else if let Some(v) = rest.strip_prefix("!=") {
        (CondOp::Ne, v)
    } else if let Some(v) = rest.strip_prefix('=') {
        (CondOp::Eq, v)
    } else if let Some(v) = rest.strip_prefix('>') {
        (CondOp::Gt, v)
    } else if let Some(v) = rest.strip_prefix('<') {
        (CondOp::Lt, v)
    } else {
        return Err(ParseError::UnexpectedToken {
            offset: tok.start,
            found: tok.text.to_string(),
        });
    };
    Ok(Condition {
        signal,
        op,
        value: decode_value(value),
    })
}

/// Apply a grid spec suffix (`3`, `3x2`, `~fit`, `~300`, optional trailing
/// `c`) to the layout under construction.
fn apply_grid_spec(layout: &mut Layout, spec: &str, tok: &Token<'_>) -> Result<(), ParseError> {
    let invalid = || ParseError::InvalidGridSpec {
        offset: tok.start,
        text: tok.text.to_string(),
    };
    let mut spec = spec;
    if let Some(stripped) = spec.strip_suffix('c') {
        // `~fit` also ends in letters; only treat `c` as the centering
        // suffix when what remains is still a well-formed spec.
        if stripped.ends_with(|c: char| c.is_ascii_digit()) || stripped == "~fit" {
            layout.center = true;
            spec = stripped;
        }
    }
    if let Some(rest) = spec.strip_prefix('~') {
        if rest == "fit" {
            layout.fit = Some(GridFit::Auto);
        } else {
            let min = rest.parse::<u32>().map_err(|_| invalid())?;
            layout.fit = Some(GridFit::MinWidth { min });
        }
        return Ok(());
    }
    match spec.split_once('x') {
        Some((cols, rows)) => {
            layout.columns = Some(cols.parse().map_err(|_| invalid())?);
            layout.rows = Some(rows.parse().map_err(|_| invalid())?);
        }
        None => {
            layout.columns = Some(spec.parse().map_err(|_| invalid())?);
        }
    }
    Ok(())
}
