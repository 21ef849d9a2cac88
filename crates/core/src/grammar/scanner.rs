use liquidcode_diagnostics::{Diagnostic, LineIndex, Span, codes};
use std::borrow::Cow;
use thiserror::Error;

/// Classification of a LiquidCode scanner token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// Two-letter type code (`Kp`). Registry validation happens in the parser.
    TypeCode,
    /// Grid spec glued onto a type code (`Gd3`, `Gd3x2`, `Gd~fit`, `Gd~300c`).
    GridSpec,
    /// Digit run (`3`, `012`). Meaning depends on position.
    Number,
    /// Lowercase word (`tab`).
    Ident,
    /// Field or index binding (`:revenue`, `:user.name`, `:.name`).
    Binding,
    /// Expression or constant (`=price*qty`, `=42`, `="n/a"`).
    Expr,
    /// Quoted string literal, raw text including quotes.
    Str,
    /// Signal declaration (`@name`, `@count:number=0!`).
    SignalDecl,
    /// Signal emit reference (`>name`, `>tab=1`).
    SignalEmit,
    /// Signal receive reference (`<name`).
    SignalReceive,
    /// Two-way signal reference (`<>name`).
    SignalBoth,
    /// Sigil modifier (`!h`, `*f`, `^r`, `#g`, `%lg`, `!submit`).
    Modifier,
    /// Visibility condition (`?@active=1`, `?@count>=5`).
    Condition,
    /// Layer-open trigger (`>/1`).
    TriggerOpen,
    /// Layer-close trigger (`/<`).
    TriggerClose,
    /// Layer marker at block position (`/1`).
    LayerMarker,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// Line break. Acts as a soft separator inside child lists.
    Newline,
}

/// A token that borrows its text directly from the source input — zero allocation.
///
/// `text` is always exactly `&input[start..end]`. The `start`/`end` byte offsets
/// are stored alongside for consumers that need numeric positions (spans, slicing).
#[derive(Debug)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokKind,
    /// Borrowed slice of the source input for this token.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token<'_> {
    /// The token's source span.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// A malformed token aborted the scan. No partial token stream is produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("scan error at offset {offset}: {message} ({text:?})")]
pub struct ScanError {
    /// Byte offset into the preprocessed source where the bad token starts.
    pub offset: usize,
    /// The offending text, truncated to the bad token.
    pub text: String,
    /// What went wrong.
    pub message: String,
    /// Stable diagnostic id for this error.
    pub code: &'static str,
}

impl ScanError {
    fn new(offset: usize, text: &str, message: impl Into<String>) -> Self {
        ScanError {
            offset,
            text: text.to_string(),
            message: message.into(),
            code: codes::SCAN_MALFORMED_TOKEN,
        }
    }

    /// Render this error as a diagnostic with a source span.
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::error(
            self.code,
            &self.message,
            Some(Span::new(self.offset, self.offset + self.text.len())),
        )
    }

    /// 0-indexed line and column of the error within the preprocessed
    /// source the scan ran over.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        LineIndex::new(source).line_col(self.offset)
    }
}

// ─── Preprocessing ──────────────────────────────────────────────────────────

/// Normalize raw source before scanning: strip a UTF-8 BOM, normalize
/// CRLF/CR to LF, and drop ASCII control characters other than `\n`/`\t`.
///
/// Returns `Cow::Borrowed` when the input needs no changes, which is the
/// common case for machine-generated notation.
pub fn preprocess(input: &str) -> Cow<'_, str> {
    let stripped = input.strip_prefix('\u{feff}').unwrap_or(input);
    let needs_rewrite = stripped
        .bytes()
        .any(|b| b == b'\r' || (b.is_ascii_control() && b != b'\n' && b != b'\t'));
    if !needs_rewrite {
        return Cow::Borrowed(stripped);
    }
    let mut out = String::with_capacity(stripped.len());
    let mut chars = stripped.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            c if c.is_ascii_control() && c != '\n' && c != '\t' => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

// ─── String escapes ─────────────────────────────────────────────────────────

/// Decode a raw quoted literal (quotes included) into its text content.
/// Recognized escapes are `\"`, `\\`, `\n`, and `\t`; any other backslash
/// pair passes through verbatim.
pub fn unquote(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

// ─── Scanner ────────────────────────────────────────────────────────────────

/// Tokenize preprocessed LiquidCode input into a sequence of borrowed tokens.
///
/// Every token's `text` field borrows directly from `input`, so the returned
/// `Vec<Token<'_>>` is valid for as long as `input` is alive. The first
/// malformed token aborts the scan with a [`ScanError`]; no partial stream
/// is returned.
///
/// # Safety of `b[i] as char`
///
/// All structural characters tested here are ASCII (0x00–0x7F). UTF-8
/// continuation bytes are in the range 0x80–0xBF, so they never match any of
/// these tests; multibyte characters flow through value runs and string
/// literals untouched.
pub fn scan(input: &str) -> Result<Vec<Token<'_>>, ScanError> {
    let mut toks = Vec::new();
    let b = input.as_bytes();
    let mut i = 0usize;
    while i < b.len() {
        let start = i;
        let c = b[i] as char;
        match c {
            ' ' | '\t' => {
                i += 1;
            }
            '\n' => {
                i += 1;
                push(&mut toks, TokKind::Newline, input, start, i);
            }
            '/' => {
                if b.get(i + 1) == Some(&b'/') {
                    // Comment runs to end of line.
                    while i < b.len() && b[i] != b'\n' {
                        i += 1;
                    }
                } else if b.get(i + 1) == Some(&b'<') {
                    i += 2;
                    push(&mut toks, TokKind::TriggerClose, input, start, i);
                } else if b.get(i + 1).is_some_and(u8::is_ascii_digit) {
                    i += 1;
                    i = eat_digits(b, i);
                    push(&mut toks, TokKind::LayerMarker, input, start, i);
                } else {
                    return Err(ScanError::new(
                        start,
                        &input[start..(start + 1)],
                        "stray '/' (expected '//', '/<', or a layer marker '/N')",
                    ));
                }
            }
            '[' => {
                i += 1;
                push(&mut toks, TokKind::LBracket, input, start, i);
            }
            ']' => {
                i += 1;
                push(&mut toks, TokKind::RBracket, input, start, i);
            }
            ',' => {
                i += 1;
                push(&mut toks, TokKind::Comma, input, start, i);
            }
            '"' => {
                i = eat_string(input, i)?;
                push(&mut toks, TokKind::Str, input, start, i);
            }
            ':' => {
                i += 1;
                if b.get(i) == Some(&b'.') {
                    i += 1;
                }
                let path_start = i;
                i = eat_path(b, i);
                if i == path_start {
                    return Err(ScanError::new(
                        start,
                        &input[start..i.max(start + 1)],
                        "binding ':' must be followed by a field path",
                    ));
                }
                push(&mut toks, TokKind::Binding, input, start, i);
            }
            '=' => {
                i += 1;
                i = eat_value(input, i)?;
                if i == start + 1 {
                    return Err(ScanError::new(
                        start,
                        &input[start..i],
                        "expression '=' must be followed by a value",
                    ));
                }
                push(&mut toks, TokKind::Expr, input, start, i);
            }
            '@' => {
                i = eat_signal_decl(input, i)?;
                push(&mut toks, TokKind::SignalDecl, input, start, i);
            }
            '>' => {
                if b.get(i + 1) == Some(&b'/') && b.get(i + 2).is_some_and(u8::is_ascii_digit) {
                    i += 2;
                    i = eat_digits(b, i);
                    push(&mut toks, TokKind::TriggerOpen, input, start, i);
                } else {
                    i += 1;
                    let name_start = i;
                    i = eat_ident(b, i);
                    if i == name_start {
                        return Err(ScanError::new(
                            start,
                            &input[start..(start + 1)],
                            "emit '>' must be followed by a signal name",
                        ));
                    }
                    if b.get(i) == Some(&b'=') {
                        i = eat_value(input, i + 1)?;
                    }
                    push(&mut toks, TokKind::SignalEmit, input, start, i);
                }
            }
            '<' => {
                let (kind, name_at) = if b.get(i + 1) == Some(&b'>') {
                    (TokKind::SignalBoth, i + 2)
                } else {
                    (TokKind::SignalReceive, i + 1)
                };
                i = eat_ident(b, name_at);
                if i == name_at {
                    return Err(ScanError::new(
                        start,
                        &input[start..name_at],
                        "receive '<' must be followed by a signal name",
                    ));
                }
                push(&mut toks, kind, input, start, i);
            }
            '?' => {
                i = eat_condition(input, i)?;
                push(&mut toks, TokKind::Condition, input, start, i);
            }
            '!' | '*' | '^' | '#' | '%' => {
                i += 1;
                let body_start = i;
                i = eat_ident(b, i);
                if i == body_start {
                    return Err(ScanError::new(
                        start,
                        &input[start..(start + 1)],
                        format!("modifier '{c}' must be followed by a value"),
                    ));
                }
                push(&mut toks, TokKind::Modifier, input, start, i);
            }
            '0'..='9' => {
                i = eat_digits(b, i);
                push(&mut toks, TokKind::Number, input, start, i);
            }
            'A'..='Z' => {
                i += 1;
                while i < b.len()
                    && (b[i].is_ascii_alphanumeric() || b[i] == b'~' || b[i] == b'_')
                {
                    i += 1;
                }
                // Two letters (or a stray single letter) is a type code;
                // anything longer is a code with a glued grid spec.
                let kind = if i - start <= 2 {
                    TokKind::TypeCode
                } else {
                    TokKind::GridSpec
                };
                push(&mut toks, kind, input, start, i);
            }
            'a'..='z' | '_' => {
                i = eat_ident(b, i);
                push(&mut toks, TokKind::Ident, input, start, i);
            }
            other => {
                let end = start + other.len_utf8();
                return Err(ScanError::new(
                    start,
                    &input[start..end],
                    format!("unexpected character {other:?}"),
                ));
            }
        }
    }
    Ok(toks)
}

fn push<'a>(toks: &mut Vec<Token<'a>>, kind: TokKind, input: &'a str, start: usize, end: usize) {
    toks.push(Token {
        kind,
        text: &input[start..end],
        start,
        end,
    });
}

fn eat_digits(b: &[u8], mut i: usize) -> usize {
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    i
}

fn eat_ident(b: &[u8], mut i: usize) -> usize {
    while i < b.len() && (b[i].is_ascii_alphanumeric() || b[i] == b'_') {
        i += 1;
    }
    i
}

/// Dotted field path: `ident(.ident)*`.
fn eat_path(b: &[u8], mut i: usize) -> usize {
    let first = eat_ident(b, i);
    if first == i {
        return i;
    }
    i = first;
    while b.get(i) == Some(&b'.')
        && b.get(i + 1)
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == b'_')
    {
        i = eat_ident(b, i + 1);
    }
    i
}

/// Consume a quoted string starting at the opening quote; returns the offset
/// one past the closing quote.
fn eat_string(input: &str, start: usize) -> Result<usize, ScanError> {
    let b = input.as_bytes();
    let mut i = start + 1;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            b'"' => return Ok(i + 1),
            b'\n' => break,
            _ => i += 1,
        }
    }
    Err(ScanError {
        offset: start,
        text: input[start..i.min(input.len())].to_string(),
        message: "unterminated string literal".to_string(),
        code: codes::SCAN_UNTERMINATED_STRING,
    })
}

/// A modifier or signal value: either a quoted string or a bare run ending at
/// whitespace, a bracket, or a comma.
fn eat_value(input: &str, i: usize) -> Result<usize, ScanError> {
    let b = input.as_bytes();
    if b.get(i) == Some(&b'"') {
        return eat_string(input, i);
    }
    let mut j = i;
    while j < b.len() && !matches!(b[j], b' ' | b'\t' | b'\n' | b',' | b'[' | b']') {
        j += 1;
    }
    Ok(j)
}

/// Signal declaration: `@name`, optionally `:type`, `=default`, and a
/// trailing `!` persist marker, all glued.
fn eat_signal_decl(input: &str, start: usize) -> Result<usize, ScanError> {
    let b = input.as_bytes();
    let mut i = start + 1;
    let name_start = i;
    i = eat_ident(b, i);
    if i == name_start {
        return Err(ScanError::new(
            start,
            &input[start..(start + 1)],
            "signal declaration '@' must be followed by a name",
        ));
    }
    if b.get(i) == Some(&b':') {
        i += 1;
        let ty_start = i;
        i = eat_ident(b, i);
        if i == ty_start {
            return Err(ScanError::new(
                start,
                &input[start..i],
                "signal type ':' must be followed by a type name",
            ));
        }
    }
    if b.get(i) == Some(&b'=') {
        i += 1;
        if b.get(i) == Some(&b'"') {
            i = eat_string(input, i)?;
        } else {
            // Bare defaults stop at '!' so the persist marker stays a marker;
            // quote a default that needs a literal '!'.
            while i < b.len() && !matches!(b[i], b' ' | b'\t' | b'\n' | b',' | b'[' | b']' | b'!') {
                i += 1;
            }
        }
    }
    if b.get(i) == Some(&b'!') {
        i += 1;
    }
    Ok(i)
}

/// Condition: `?@name`, an operator (`= != > < >= <=`), and a value, glued.
fn eat_condition(input: &str, start: usize) -> Result<usize, ScanError> {
    let b = input.as_bytes();
    let mut i = start + 1;
    if b.get(i) != Some(&b'@') {
        return Err(ScanError::new(
            start,
            &input[start..(start + 1)],
            "condition '?' must be followed by '@signal'",
        ));
    }
    i += 1;
    let name_start = i;
    i = eat_ident(b, i);
    if i == name_start {
        return Err(ScanError::new(
            start,
            &input[start..i],
            "condition signal reference is missing a name",
        ));
    }
    let op_len = match (b.get(i), b.get(i + 1)) {
        (Some(b'>'), Some(b'=')) | (Some(b'<'), Some(b'=')) | (Some(b'!'), Some(b'=')) => 2,
        (Some(b'='), _) | (Some(b'>'), _) | (Some(b'<'), _) => 1,
        _ => {
            return Err(ScanError::new(
                start,
                &input[start..i],
                "condition is missing a comparison operator",
            ));
        }
    };
    i += op_len;
    let val_end = eat_value(input, i)?;
    if val_end == i {
        return Err(ScanError::new(
            start,
            &input[start..i],
            "condition is missing a comparison value",
        ));
    }
    Ok(val_end)
}
