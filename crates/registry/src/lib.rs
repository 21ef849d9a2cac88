//! LiquidCode block type registry.
//!
//! Defines the compiled-in tables mapping block type names to their two-letter
//! codes and (for the ten most common types) single-digit numeric codes, plus
//! the color and size alias tables used by the `#` and `%` modifiers.  Tables
//! are keyed by schema version so future grammar revisions can ship their own
//! code assignments without breaking existing documents.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// The only schema version the current tables describe.
pub const SCHEMA_VERSION: &str = "1.0";

/// Depth cap shared by the parser and emitter. Nesting beyond this is
/// rejected rather than risking unbounded recursion.
pub const MAX_NESTING_DEPTH: usize = 64;

// ─── Block types ────────────────────────────────────────────────────────────

/// Every block kind the grammar can express.
///
/// Serialized names are the canonical schema-level type names (kebab-case for
/// the multi-word chart variants), matching the JSON schema format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Generic container / vertical group.
    Container,
    /// Key performance indicator stat.
    Kpi,
    /// Plain text run.
    Text,
    /// Clickable button.
    Button,
    /// Repeating list.
    List,
    /// Tabular data.
    Table,
    /// Column grid.
    Grid,
    /// Free-text input.
    Input,
    /// Form wrapper.
    Form,
    /// Card surface.
    Card,
    /// Dropdown select.
    Select,
    /// Checkbox.
    Checkbox,
    /// Toggle switch.
    Switch,
    /// Radio group.
    Radio,
    /// Value slider.
    Slider,
    /// Modal dialog.
    Modal,
    /// Side drawer.
    Drawer,
    /// Bottom sheet.
    Sheet,
    /// Sidebar region.
    Sidebar,
    /// Tab strip.
    Tabs,
    /// Single tab within a tab strip.
    Tab,
    /// Status badge.
    Badge,
    /// Label tag.
    Tag,
    /// Progress bar.
    Progress,
    /// Radial gauge.
    Gauge,
    /// Heatmap matrix.
    Heatmap,
    /// Date range picker.
    #[serde(rename = "daterange")]
    DateRange,
    /// Preset chooser.
    Preset,
    /// Line chart.
    #[serde(rename = "line-chart")]
    LineChart,
    /// Bar chart.
    #[serde(rename = "bar-chart")]
    BarChart,
    /// Pie chart.
    #[serde(rename = "pie-chart")]
    PieChart,
    /// Area chart.
    #[serde(rename = "area-chart")]
    AreaChart,
    /// Scatter chart.
    #[serde(rename = "scatter-chart")]
    ScatterChart,
    /// Inline sparkline.
    Sparkline,
    /// Image.
    Image,
    /// Avatar.
    Avatar,
    /// Horizontal divider.
    Divider,
    /// Section heading.
    Heading,
    /// Stack layout.
    Stack,
    /// Geographic map.
    Map,
    /// Event timeline.
    Timeline,
    /// Breadcrumb trail.
    Breadcrumb,
}

impl BlockType {
    /// All variants, in table order. Keep in sync with `ENTRIES_V1`.
    pub const ALL: &'static [BlockType] = &[
        BlockType::Container,
        BlockType::Kpi,
        BlockType::Text,
        BlockType::Button,
        BlockType::List,
        BlockType::Table,
        BlockType::Grid,
        BlockType::Input,
        BlockType::Form,
        BlockType::Card,
        BlockType::Select,
        BlockType::Checkbox,
        BlockType::Switch,
        BlockType::Radio,
        BlockType::Slider,
        BlockType::Modal,
        BlockType::Drawer,
        BlockType::Sheet,
        BlockType::Sidebar,
        BlockType::Tabs,
        BlockType::Tab,
        BlockType::Badge,
        BlockType::Tag,
        BlockType::Progress,
        BlockType::Gauge,
        BlockType::Heatmap,
        BlockType::DateRange,
        BlockType::Preset,
        BlockType::LineChart,
        BlockType::BarChart,
        BlockType::PieChart,
        BlockType::AreaChart,
        BlockType::ScatterChart,
        BlockType::Sparkline,
        BlockType::Image,
        BlockType::Avatar,
        BlockType::Divider,
        BlockType::Heading,
        BlockType::Stack,
        BlockType::Map,
        BlockType::Timeline,
        BlockType::Breadcrumb,
    ];

    /// Canonical schema-level name (the serde name).
    pub fn name(self) -> &'static str {
        match self {
            BlockType::Container => "container",
            BlockType::Kpi => "kpi",
            BlockType::Text => "text",
            BlockType::Button => "button",
            BlockType::List => "list",
            BlockType::Table => "table",
            BlockType::Grid => "grid",
            BlockType::Input => "input",
            BlockType::Form => "form",
            BlockType::Card => "card",
            BlockType::Select => "select",
            BlockType::Checkbox => "checkbox",
            BlockType::Switch => "switch",
            BlockType::Radio => "radio",
            BlockType::Slider => "slider",
            BlockType::Modal => "modal",
            BlockType::Drawer => "drawer",
            BlockType::Sheet => "sheet",
            BlockType::Sidebar => "sidebar",
            BlockType::Tabs => "tabs",
            BlockType::Tab => "tab",
            BlockType::Badge => "badge",
            BlockType::Tag => "tag",
            BlockType::Progress => "progress",
            BlockType::Gauge => "gauge",
            BlockType::Heatmap => "heatmap",
            BlockType::DateRange => "daterange",
            BlockType::Preset => "preset",
            BlockType::LineChart => "line-chart",
            BlockType::BarChart => "bar-chart",
            BlockType::PieChart => "pie-chart",
            BlockType::AreaChart => "area-chart",
            BlockType::ScatterChart => "scatter-chart",
            BlockType::Sparkline => "sparkline",
            BlockType::Image => "image",
            BlockType::Avatar => "avatar",
            BlockType::Divider => "divider",
            BlockType::Heading => "heading",
            BlockType::Stack => "stack",
            BlockType::Map => "map",
            BlockType::Timeline => "timeline",
            BlockType::Breadcrumb => "breadcrumb",
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Registry tables ────────────────────────────────────────────────────────

/// One row of the type code table.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TypeEntry {
    /// The block type this row describes.
    pub block_type: BlockType,
    /// Two-letter compact code (e.g., `"Kp"`).
    pub code: &'static str,
    /// Single-digit numeric code, assigned to the ten most common types only.
    pub index: Option<u8>,
}

const fn entry(block_type: BlockType, code: &'static str, index: Option<u8>) -> TypeEntry {
    TypeEntry {
        block_type,
        code,
        index,
    }
}

/// Version 1.0 type code assignments.
static ENTRIES_V1: &[TypeEntry] = &[
    entry(BlockType::Container, "Cn", Some(0)),
    entry(BlockType::Kpi, "Kp", Some(1)),
    entry(BlockType::Text, "Tx", Some(2)),
    entry(BlockType::Button, "Bt", Some(3)),
    entry(BlockType::List, "Ls", Some(4)),
    entry(BlockType::Table, "Tb", Some(5)),
    entry(BlockType::Grid, "Gd", Some(6)),
    entry(BlockType::Input, "In", Some(7)),
    entry(BlockType::Form, "Fm", Some(8)),
    entry(BlockType::Card, "Cd", Some(9)),
    entry(BlockType::Select, "Sl", None),
    entry(BlockType::Checkbox, "Ck", None),
    entry(BlockType::Switch, "Sw", None),
    entry(BlockType::Radio, "Rd", None),
    entry(BlockType::Slider, "Sr", None),
    entry(BlockType::Modal, "Md", None),
    entry(BlockType::Drawer, "Dw", None),
    entry(BlockType::Sheet, "Sh", None),
    entry(BlockType::Sidebar, "Sb", None),
    entry(BlockType::Tabs, "Ts", None),
    entry(BlockType::Tab, "Ta", None),
    entry(BlockType::Badge, "Bg", None),
    entry(BlockType::Tag, "Tg", None),
    entry(BlockType::Progress, "Pr", None),
    entry(BlockType::Gauge, "Gg", None),
    entry(BlockType::Heatmap, "Hm", None),
    entry(BlockType::DateRange, "Dr", None),
    entry(BlockType::Preset, "Ps", None),
    entry(BlockType::LineChart, "Ln", None),
    entry(BlockType::BarChart, "Br", None),
    entry(BlockType::PieChart, "Pi", None),
    entry(BlockType::AreaChart, "Ar", None),
    entry(BlockType::ScatterChart, "Sc", None),
    entry(BlockType::Sparkline, "Sp", None),
    entry(BlockType::Image, "Im", None),
    entry(BlockType::Avatar, "Av", None),
    entry(BlockType::Divider, "Dv", None),
    entry(BlockType::Heading, "Hd", None),
    entry(BlockType::Stack, "St", None),
    entry(BlockType::Map, "Mp", None),
    entry(BlockType::Timeline, "Tl", None),
    entry(BlockType::Breadcrumb, "Bc", None),
];

/// Color shorthand → canonical palette name.
static COLOR_ALIASES_V1: &[(&str, &str)] = &[
    ("g", "green"),
    ("b", "blue"),
    ("r", "red"),
    ("y", "yellow"),
    ("p", "purple"),
    ("o", "orange"),
    ("ok", "success"),
    ("warn", "warning"),
    ("err", "danger"),
];

/// Size spelling → canonical token. Canonical tokens are xs/sm/md/lg/xl.
static SIZE_ALIASES_V1: &[(&str, &str)] = &[
    ("tiny", "xs"),
    ("small", "sm"),
    ("medium", "md"),
    ("large", "lg"),
    ("huge", "xl"),
];

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Defects in the registry tables themselves, or a request for a version the
/// tables do not cover. Any variant other than `UnknownVersion` indicates a
/// bug in the compiled-in tables.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The requested schema version has no tables.
    #[error("unsupported schema version {version:?} (supported: {SCHEMA_VERSION})")]
    UnknownVersion {
        /// The version string that was requested.
        version: String,
    },
    /// Two table rows share a two-letter code.
    #[error("duplicate type code {code:?} in registry tables")]
    DuplicateCode {
        /// The offending code.
        code: &'static str,
    },
    /// Two table rows share a numeric code.
    #[error("duplicate numeric code {index} in registry tables")]
    DuplicateIndex {
        /// The offending digit.
        index: u8,
    },
    /// A block type has no table row, or appears in two rows.
    #[error("registry tables do not cover block type {block_type} exactly once")]
    IncompleteCoverage {
        /// The type without a unique row.
        block_type: BlockType,
    },
}

// ─── TypeRegistry ───────────────────────────────────────────────────────────

/// Immutable lookup tables for one schema version.
///
/// Obtained via [`registry_for`]; all lookup maps are built once and cached.
#[derive(Debug)]
pub struct TypeRegistry {
    /// Schema version these tables describe.
    pub version: &'static str,
    entries: &'static [TypeEntry],
    color_aliases: &'static [(&'static str, &'static str)],
    size_aliases: &'static [(&'static str, &'static str)],

    by_code: OnceLock<HashMap<&'static str, &'static TypeEntry>>,
    by_index: OnceLock<HashMap<u8, &'static TypeEntry>>,
    by_type: OnceLock<HashMap<BlockType, &'static TypeEntry>>,
}

static REGISTRY_V1: TypeRegistry = TypeRegistry {
    version: SCHEMA_VERSION,
    entries: ENTRIES_V1,
    color_aliases: COLOR_ALIASES_V1,
    size_aliases: SIZE_ALIASES_V1,
    by_code: OnceLock::new(),
    by_index: OnceLock::new(),
    by_type: OnceLock::new(),
};

static VERIFY_V1: OnceLock<Result<(), RegistryError>> = OnceLock::new();

/// Returns the registry for the given schema version, or `UnknownVersion`.
///
/// The first call for a version also runs the bijection self-check over its
/// tables, so a defective table surfaces here rather than as a silent
/// mis-parse later.
pub fn registry_for(version: &str) -> Result<&'static TypeRegistry, RegistryError> {
    if version != SCHEMA_VERSION {
        return Err(RegistryError::UnknownVersion {
            version: version.to_string(),
        });
    }
    VERIFY_V1.get_or_init(|| REGISTRY_V1.verify()).clone()?;
    Ok(&REGISTRY_V1)
}

impl TypeRegistry {
    /// All table rows, in canonical order.
    pub fn entries(&self) -> &'static [TypeEntry] {
        self.entries
    }

    fn by_code(&self) -> &HashMap<&'static str, &'static TypeEntry> {
        self.by_code
            .get_or_init(|| self.entries.iter().map(|e| (e.code, e)).collect())
    }

    fn by_index(&self) -> &HashMap<u8, &'static TypeEntry> {
        self.by_index.get_or_init(|| {
            self.entries
                .iter()
                .filter_map(|e| e.index.map(|i| (i, e)))
                .collect()
        })
    }

    fn by_type(&self) -> &HashMap<BlockType, &'static TypeEntry> {
        self.by_type
            .get_or_init(|| self.entries.iter().map(|e| (e.block_type, e)).collect())
    }

    /// Resolve a two-letter code (e.g., `"Kp"`). Case-sensitive.
    pub fn type_by_code(&self, code: &str) -> Option<BlockType> {
        self.by_code().get(code).map(|e| e.block_type)
    }

    /// Resolve a single-digit numeric code.
    pub fn type_by_index(&self, index: u8) -> Option<BlockType> {
        self.by_index().get(&index).map(|e| e.block_type)
    }

    /// The two-letter code for a type. Total: every type has one.
    pub fn code_of(&self, block_type: BlockType) -> &'static str {
        // verify() guarantees every type has a row.
        self.by_type()
            .get(&block_type)
            .map_or("??", |e| e.code)
    }

    /// The numeric code for a type, if it has one.
    pub fn index_of(&self, block_type: BlockType) -> Option<u8> {
        self.by_type().get(&block_type).and_then(|e| e.index)
    }

    /// Whether `text` is a known two-letter type code.
    pub fn is_type_code(&self, text: &str) -> bool {
        self.by_code().contains_key(text)
    }

    /// Canonicalize a color name. Aliases map to the palette name; anything
    /// else passes through verbatim so custom theme colors keep working.
    pub fn canonical_color<'a>(&self, name: &'a str) -> &'a str {
        self.color_aliases
            .iter()
            .find(|(alias, _)| *alias == name)
            .map_or(name, |(_, canonical)| *canonical)
    }

    /// Canonicalize a size token. Long spellings collapse to the short
    /// canonical token; unknown tokens pass through verbatim.
    pub fn canonical_size<'a>(&self, name: &'a str) -> &'a str {
        self.size_aliases
            .iter()
            .find(|(alias, _)| *alias == name)
            .map_or(name, |(_, canonical)| *canonical)
    }

    /// Check that names, codes, and numeric codes form total bijections.
    fn verify(&self) -> Result<(), RegistryError> {
        let mut seen_codes = HashMap::new();
        let mut seen_indices = HashMap::new();
        let mut seen_types = HashMap::new();
        for e in self.entries {
            if seen_codes.insert(e.code, ()).is_some() {
                return Err(RegistryError::DuplicateCode { code: e.code });
            }
            if let Some(i) = e.index
                && seen_indices.insert(i, ()).is_some()
            {
                return Err(RegistryError::DuplicateIndex { index: i });
            }
            if seen_types.insert(e.block_type, ()).is_some() {
                return Err(RegistryError::IncompleteCoverage {
                    block_type: e.block_type,
                });
            }
        }
        for &bt in BlockType::ALL {
            if !seen_types.contains_key(&bt) {
                return Err(RegistryError::IncompleteCoverage { block_type: bt });
            }
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> &'static TypeRegistry {
        registry_for(SCHEMA_VERSION).expect("v1 tables verify")
    }

    #[test]
    fn verify_passes_for_v1() {
        assert!(registry_for("1.0").is_ok());
    }

    #[test]
    fn unknown_version_is_refused() {
        let err = registry_for("2.0").unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownVersion {
                version: "2.0".into()
            }
        );
    }

    #[test]
    fn codes_round_trip_through_lookup() {
        let reg = registry();
        for &bt in BlockType::ALL {
            let code = reg.code_of(bt);
            assert_eq!(code.len(), 2, "{bt} code {code:?} is not two letters");
            assert_eq!(reg.type_by_code(code), Some(bt));
        }
    }

    #[test]
    fn numeric_codes_cover_zero_through_nine() {
        let reg = registry();
        for i in 0..=9u8 {
            let bt = reg.type_by_index(i).expect("digit assigned");
            assert_eq!(reg.index_of(bt), Some(i));
        }
        assert_eq!(reg.type_by_index(0), Some(BlockType::Container));
        assert_eq!(reg.type_by_index(1), Some(BlockType::Kpi));
        assert_eq!(reg.type_by_index(9), Some(BlockType::Card));
    }

    #[test]
    fn rare_types_have_no_numeric_code() {
        let reg = registry();
        assert_eq!(reg.index_of(BlockType::Modal), None);
        assert_eq!(reg.index_of(BlockType::LineChart), None);
    }

    #[test]
    fn code_lookup_is_case_sensitive() {
        let reg = registry();
        assert_eq!(reg.type_by_code("Kp"), Some(BlockType::Kpi));
        assert_eq!(reg.type_by_code("kp"), None);
        assert_eq!(reg.type_by_code("KP"), None);
    }

    #[test]
    fn color_aliases_resolve() {
        let reg = registry();
        assert_eq!(reg.canonical_color("g"), "green");
        assert_eq!(reg.canonical_color("err"), "danger");
        assert_eq!(reg.canonical_color("green"), "green");
        assert_eq!(reg.canonical_color("chartreuse"), "chartreuse");
    }

    #[test]
    fn size_aliases_resolve() {
        let reg = registry();
        assert_eq!(reg.canonical_size("small"), "sm");
        assert_eq!(reg.canonical_size("huge"), "xl");
        assert_eq!(reg.canonical_size("md"), "md");
    }

    #[test]
    fn block_type_serde_names_match_table() {
        let json = serde_json::to_string(&BlockType::LineChart).unwrap();
        assert_eq!(json, "\"line-chart\"");
        let json = serde_json::to_string(&BlockType::DateRange).unwrap();
        assert_eq!(json, "\"daterange\"");
        let bt: BlockType = serde_json::from_str("\"kpi\"").unwrap();
        assert_eq!(bt, BlockType::Kpi);
        for &bt in BlockType::ALL {
            let json = serde_json::to_string(&bt).unwrap();
            assert_eq!(json, format!("{:?}", bt.name()));
        }
    }
}
