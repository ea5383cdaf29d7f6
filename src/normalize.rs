use regex::Regex;
use std::sync::OnceLock;

/// Rewrites a serde type-mismatch diagnostic into a client-facing message.
///
/// `raw` is the `"<path>: <message>"` form produced by `serde_path_to_error`.
/// An `invalid type` message becomes
/// `cannot parse '<received>' into <path>, expected '<expected>'.`, with
/// Rust type names and serde's data-model vocabulary replaced by JSON kinds.
/// Anything else is returned as-is.
pub fn normalize(raw: &str) -> String {
    let captures = match pattern().captures(raw) {
        Some(captures) => captures,
        None => return raw.to_owned(),
    };

    format!(
        "cannot parse '{}' into <{}>, expected '{}'.",
        received_kind(&captures["received"]),
        lower_first(&captures["path"]),
        expected_kind(&captures["expected"]),
    )
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Received values follow serde's `Unexpected` display. Strings are
        // matched as escaped literals so their content can't end the group.
        Regex::new(concat!(
            r"^(?P<path>.+?): invalid type: ",
            r#"(?P<received>string "(?:[^"\\]|\\.)*"|character `.`|[a-z ]+(?: `[^`]*`)?), "#,
            r"expected (?P<expected>.+?)(?: at line \d+ column \d+)?$",
        ))
        .expect("type mismatch pattern")
    })
}

// Prefixes of serde's `Unexpected` descriptions, mapped to JSON kinds.
const RECEIVED: &[(&str, &str)] = &[
    ("null", "null"),
    ("unit value", "null"),
    ("boolean", "bool"),
    ("integer", "number"),
    ("floating point", "number"),
    ("string", "string"),
    ("character", "string"),
    ("sequence", "array"),
    ("map", "object"),
];

fn received_kind(unexpected: &str) -> &str {
    RECEIVED
        .iter()
        .find(|(prefix, _)| unexpected.starts_with(prefix))
        .map(|(_, kind)| *kind)
        .unwrap_or(unexpected)
}

fn expected_kind(expected: &str) -> &str {
    let expected = expected
        .strip_prefix("a ")
        .or_else(|| expected.strip_prefix("an "))
        .unwrap_or(expected);

    match expected {
        "map" => "object",
        "sequence" => "array",
        "boolean" => "bool",
        "character" => "string",
        _ if expected.starts_with("struct ") || expected.contains("::") || expected.contains('.') => {
            "object"
        }
        _ => expected,
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
