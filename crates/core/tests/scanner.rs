//! Scanner tests: preprocessing, token classification, and error aborts.

use liquidcode_core::grammar::scanner::{TokKind, preprocess, scan, unquote};
use liquidcode_core::codes;

fn kinds(input: &str) -> Vec<TokKind> {
    scan(input)
        .unwrap_or_else(|e| panic!("scan of {input:?} failed: {e}"))
        .iter()
        .map(|t| t.kind)
        .collect()
}

fn texts(input: &str) -> Vec<String> {
    scan(input)
        .unwrap_or_else(|e| panic!("scan of {input:?} failed: {e}"))
        .iter()
        .map(|t| t.text.to_string())
        .collect()
}

// ── Preprocessing ───────────────────────────────────────────────────────

#[test]
fn preprocess_strips_bom() {
    assert_eq!(preprocess("\u{feff}Kp"), "Kp");
}

#[test]
fn preprocess_normalizes_line_endings() {
    assert_eq!(preprocess("a\r\nb\rc"), "a\nb\nc");
}

#[test]
fn preprocess_drops_control_chars_keeps_tabs() {
    assert_eq!(preprocess("a\u{0}b\tc"), "ab\tc");
}

#[test]
fn preprocess_borrows_clean_input() {
    let input = "Kp :revenue";
    assert!(matches!(
        preprocess(input),
        std::borrow::Cow::Borrowed(_)
    ));
}

// ── Token classification ────────────────────────────────────────────────

#[test]
fn scans_type_code_and_binding() {
    assert_eq!(kinds("Kp :revenue"), vec![TokKind::TypeCode, TokKind::Binding]);
    assert_eq!(texts("Kp :revenue"), vec!["Kp", ":revenue"]);
}

#[test]
fn scans_relative_binding() {
    assert_eq!(kinds("Tx :.name"), vec![TokKind::TypeCode, TokKind::Binding]);
    assert_eq!(texts("Tx :.name")[1], ":.name");
}

#[test]
fn scans_dotted_path() {
    assert_eq!(texts("Tx :user.address.city")[1], ":user.address.city");
}

#[test]
fn scans_digit_code_and_number() {
    // Single tokens; whether a digit run is a type or a binding is the
    // parser's call.
    assert_eq!(kinds("1 :revenue"), vec![TokKind::Number, TokKind::Binding]);
    assert_eq!(kinds("Tb 012"), vec![TokKind::TypeCode, TokKind::Number]);
}

#[test]
fn scans_grid_specs() {
    for spec in ["Gd3", "Gd3x2", "Gd~fit", "Gd~300", "Gd3x2c", "Gd~300c"] {
        let toks = scan(spec).expect("grid spec scans");
        assert_eq!(toks.len(), 1, "{spec} should be one token");
        assert_eq!(toks[0].kind, TokKind::GridSpec, "{spec}");
        assert_eq!(toks[0].text, spec);
    }
}

#[test]
fn scans_string_literals_with_escapes() {
    let toks = scan(r#"Tx "He said \"hi\"\n""#).expect("scan");
    assert_eq!(toks[1].kind, TokKind::Str);
    assert_eq!(unquote(toks[1].text), "He said \"hi\"\n");
}

#[test]
fn unquote_passes_unknown_escapes_through() {
    assert_eq!(unquote(r#""a\qb""#), "a\\qb");
}

#[test]
fn scans_signal_declarations() {
    assert_eq!(kinds("@tab"), vec![TokKind::SignalDecl]);
    assert_eq!(texts("@count:number=0!"), vec!["@count:number=0!"]);
    assert_eq!(kinds("@count:number=0!"), vec![TokKind::SignalDecl]);
}

#[test]
fn scans_signal_references() {
    assert_eq!(
        kinds(">tab=1 <status <>query"),
        vec![
            TokKind::SignalEmit,
            TokKind::SignalReceive,
            TokKind::SignalBoth
        ]
    );
}

#[test]
fn scans_triggers_and_layer_markers() {
    assert_eq!(
        kinds(">/1 /< /2"),
        vec![TokKind::TriggerOpen, TokKind::TriggerClose, TokKind::LayerMarker]
    );
}

#[test]
fn scans_modifiers() {
    assert_eq!(
        kinds("!h *f ^r #g %lg !submit"),
        vec![TokKind::Modifier; 6]
    );
}

#[test]
fn scans_conditions_glued() {
    assert_eq!(kinds("?@active=1"), vec![TokKind::Condition]);
    assert_eq!(kinds("?@count>=5"), vec![TokKind::Condition]);
    assert_eq!(kinds(r#"?@status="open""#), vec![TokKind::Condition]);
}

#[test]
fn scans_expressions() {
    assert_eq!(kinds("=price*qty"), vec![TokKind::Expr]);
    assert_eq!(kinds("=42"), vec![TokKind::Expr]);
    assert_eq!(kinds(r#"="n/a""#), vec![TokKind::Expr]);
}

#[test]
fn skips_comments_and_whitespace() {
    assert_eq!(
        kinds("Kp // the revenue stat\nTx"),
        vec![TokKind::TypeCode, TokKind::Newline, TokKind::TypeCode]
    );
}

#[test]
fn token_text_matches_offsets() {
    let input = r#"Gd3 [Kp :a, Tx "b"]"#;
    for tok in scan(input).expect("scan") {
        assert_eq!(&input[tok.start..tok.end], tok.text);
    }
}

// ── Error aborts ────────────────────────────────────────────────────────

#[test]
fn unterminated_string_aborts() {
    let err = scan(r#"Cd [Tx "Unclosed"#).unwrap_err();
    assert_eq!(err.code, codes::SCAN_UNTERMINATED_STRING);
    assert_eq!(err.offset, 7);
}

#[test]
fn unexpected_character_aborts() {
    let err = scan("Kp & Tx").unwrap_err();
    assert_eq!(err.code, codes::SCAN_MALFORMED_TOKEN);
    assert_eq!(err.offset, 3);
    assert_eq!(err.text, "&");
}

#[test]
fn bare_sigils_abort() {
    for bad in [": x", "= x", "@ x", "> x", "< x", "# x", "? x"] {
        assert!(scan(bad).is_err(), "{bad:?} should not scan");
    }
}

#[test]
fn condition_without_operator_aborts() {
    let err = scan("?@active").unwrap_err();
    assert!(err.message.contains("operator"), "{}", err.message);
}

#[test]
fn stray_slash_aborts() {
    assert!(scan("Kp / Tx").is_err());
}

#[test]
fn scan_error_renders_as_diagnostic() {
    let err = scan("Kp &").unwrap_err();
    let diag = err.diagnostic();
    assert_eq!(diag.id, codes::SCAN_MALFORMED_TOKEN);
    assert_eq!(diag.span.map(|s| s.start), Some(3));
}

#[test]
fn scan_error_maps_to_line_and_column() {
    let src = "Tx :a\nTx \"oops";
    let err = scan(src).unwrap_err();
    assert_eq!(err.code, codes::SCAN_UNTERMINATED_STRING);
    assert_eq!(err.line_col(src), (1, 3));
}
