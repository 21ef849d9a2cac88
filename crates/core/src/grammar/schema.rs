use serde::{Deserialize, Serialize};

pub use liquidcode_registry::BlockType;

/// A fully parsed LiquidCode document.
///
/// Produced only by the parser; construction elsewhere is possible but the
/// parser is the sole component that guarantees the structural invariants
/// (unique signal names, unique layer ids, layer 0 present and visible).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiquidSchema {
    /// Schema version the document was parsed under (e.g., `"1.0"`).
    pub version: String,
    /// Declared signals, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<Signal>,
    /// Layers, base layer first. Layer 0 is always present.
    pub layers: Vec<Layer>,
}

impl LiquidSchema {
    /// Look up a declared signal by name.
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Look up a layer by id.
    pub fn layer(&self, id: u32) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }
}

/// A declared state channel (`@name`, `@name:type=default!`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    /// Signal name, unique within the schema.
    pub name: String,
    /// Optional declared value type (e.g., `"number"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_type: Option<String>,
    /// Optional initial value, stored as written (unquoted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Whether the value persists across sessions (`!` marker).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub persist: bool,
}

/// One render surface. Layer 0 is the base surface; layers with id > 0 are
/// overlays, hidden until opened by a trigger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Layer {
    /// Layer id. 0 for the base layer.
    pub id: u32,
    /// Whether the layer renders before any trigger fires.
    pub visible: bool,
    /// Root block of the layer's tree.
    pub root: Block,
}

/// One node of the UI tree.
///
/// `uid` is assigned at parse time for tooling and is never semantic: the
/// equivalence checker ignores it entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    /// Parse-time identifier (`b0`, `b1`, … or `root` for synthetic roots).
    pub uid: String,
    /// The block's kind.
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Data source for the block's primary value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,
    /// Literal caption, distinct from the bound value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Layout directives (priority, span, flex, grid geometry).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    /// Visual styling (color, size), canonical values only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    /// Signal wiring for this block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<SignalRefs>,
    /// Visibility condition evaluated against a signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Layer trigger fired on interaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
    /// Named action (e.g., `submit`) fired on interaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Ordered child blocks. Order is semantic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Block>>,
    /// Repeated sub-tree for list/table blocks. Dot-relative bindings are
    /// valid only inside this subtree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Box<Block>>,
}

impl Block {
    /// A bare block of the given type with a parse-time uid.
    pub fn new(uid: impl Into<String>, block_type: BlockType) -> Self {
        Block {
            uid: uid.into(),
            block_type,
            binding: None,
            label: None,
            layout: None,
            style: None,
            signals: None,
            condition: None,
            trigger: None,
            action: None,
            children: None,
            template: None,
        }
    }

    /// Whether this block has neither children nor a template.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none() && self.template.is_none()
    }
}

/// Data source for a block's primary value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Binding {
    /// Named field path (`:revenue`, `:user.name`). `relative` is true for
    /// template-relative leading-dot paths (`:.name`).
    Field {
        /// Dot-separated path, without the leading `:` or relative dot.
        value: String,
        /// Whether the path resolves against the template item.
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        relative: bool,
    },
    /// Positional digit-string binding (`012` selects columns 0, 1, 2).
    Index {
        /// The digit string as written.
        value: String,
    },
    /// Computed expression (`=price*qty`).
    Expr {
        /// Expression source, without the leading `=`.
        value: String,
    },
    /// Constant literal (`=42`, `="n/a"`).
    Value {
        /// The literal, unquoted.
        value: String,
    },
}

/// Layout directives attached to a block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Layout {
    /// Emphasis level (`!h`, `!p`, `!s`, `!0`–`!9`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Column span (`*1`–`*9`, `*f`, `*h`, `*t`, `*q`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SpanValue>,
    /// Flex behavior (`^r`, `^c`, `^g`, `^f`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flex: Option<Flex>,
    /// Grid column count (`Gd3`, or a bare number on a grid block).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u8>,
    /// Grid row count (`Gd3x2`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u8>,
    /// Column sizing strategy (`Gd~fit`, `Gd~300`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<GridFit>,
    /// Center the items of an incomplete final grid row (`c` suffix).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub center: bool,
}

impl Layout {
    /// Whether no directive is set; such a layout is dropped from the block.
    pub fn is_empty(&self) -> bool {
        *self == Layout::default()
    }
}

/// Emphasis level for a block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Hero emphasis (`!h`).
    Hero,
    /// Primary emphasis (`!p`).
    Primary,
    /// Secondary emphasis (`!s`).
    Secondary,
    /// Explicit numeric level (`!0`–`!9`).
    Level(u8),
}

/// Column span for a block inside a grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpanValue {
    /// Span an explicit number of columns (`*1`–`*9`).
    Cols(u8),
    /// Span the full row (`*f`).
    Full,
    /// Span half the row (`*h`).
    Half,
    /// Span a third of the row (`*t`).
    Third,
    /// Span a quarter of the row (`*q`).
    Quarter,
}

/// Flex behavior for a block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Flex {
    /// Lay children out in a row (`^r`).
    Row,
    /// Lay children out in a column (`^c`).
    Column,
    /// Grow to fill available space (`^g`).
    Grow,
    /// Keep intrinsic size (`^f`).
    Fixed,
}

/// Column sizing strategy for a grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GridFit {
    /// Columns size to content (`Gd~fit`).
    Auto,
    /// Columns auto-fill with the given minimum width in pixels (`Gd~300`).
    MinWidth {
        /// Minimum column width in pixels.
        min: u32,
    },
}

/// Visual styling attached to a block. Values are canonical: shorthand
/// aliases are resolved through the registry at parse time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Style {
    /// Canonical color name (`#g` parses as `"green"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Canonical size token (`%lg` parses as `"lg"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl Style {
    /// Whether neither field is set; such a style is dropped from the block.
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.size.is_none()
    }
}

/// Signal wiring attached to a block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SignalRefs {
    /// Signal written on interaction (`>name`, `>name=value`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emit: Option<Emit>,
    /// Signal read for display (`<name`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receive: Option<String>,
    /// Two-way binding (`<>name`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub both: Option<String>,
}

impl SignalRefs {
    /// Whether no wiring is present; such a value is dropped from the block.
    pub fn is_empty(&self) -> bool {
        self.emit.is_none() && self.receive.is_none() && self.both.is_none()
    }

    /// Iterate over the referenced signal names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.emit
            .iter()
            .map(|e| e.name.as_str())
            .chain(self.receive.as_deref())
            .chain(self.both.as_deref())
    }
}

/// An emitted signal write, with an optional fixed value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Emit {
    /// Target signal name.
    pub name: String,
    /// Value written on interaction (`>tab=1`); `None` means the block's
    /// own value is written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Comparison operator in a visibility condition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CondOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
}

impl CondOp {
    /// The operator's surface spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            CondOp::Eq => "=",
            CondOp::Ne => "!=",
            CondOp::Gt => ">",
            CondOp::Lt => "<",
            CondOp::Ge => ">=",
            CondOp::Le => "<=",
        }
    }
}

/// Visibility condition (`?@signal>=5`). The block renders only while the
/// comparison holds at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    /// Name of the signal compared against.
    pub signal: String,
    /// Comparison operator.
    pub op: CondOp,
    /// Right-hand value, unquoted.
    pub value: String,
}

/// What a trigger does to a layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TriggerAction {
    /// Open the referenced layer (`>/N`).
    Open,
    /// Close the current layer (`/<`).
    Close,
}

/// Layer trigger attached to a block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trigger {
    /// Open or close.
    pub action: TriggerAction,
    /// Target layer id; `None` for close (the current layer closes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<u32>,
}
