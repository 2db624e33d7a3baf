//! Identifier rules shared by the model and the emitter
//!
//! - snake_case → camelCase conversion (with the reversible fallback for
//!   identifiers that are already camel-cased)
//! - Java reserved-word escaping
//! - source identifier validity

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use unicode_xid::UnicodeXID;

/// Java keywords and literals that cannot be used as identifiers.
static RESERVED_WORDS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char",
        "class", "const", "continue", "default", "do", "double", "else", "enum",
        "extends", "final", "finally", "float", "for", "goto", "if", "implements",
        "import", "instanceof", "int", "interface", "long", "native", "new",
        "package", "private", "protected", "public", "return", "short", "static",
        "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
        "transient", "try", "void", "volatile", "while", "true", "false", "null",
        "var", "record", "yield", "_",
    ]
    .into_iter()
    .collect()
});

/// Check whether `word` is reserved in the target language.
pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(word)
}

/// Make an identifier legal in the target language.
///
/// `-` becomes `_`, and a reserved word gets a trailing `_`.
pub fn escape_identifier(identifier: &str) -> String {
    let identifier = identifier.replace('-', "_");
    if is_reserved(&identifier) {
        identifier + "_"
    } else {
        identifier
    }
}

/// Escape every segment of a dotted module path.
pub fn escape_module_path(path: &str) -> String {
    path.split('.')
        .map(escape_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

/// Uppercase the first character after any leading underscores.
pub fn capitalize_first(s: &str) -> String {
    let prefix_len = s.len() - s.trim_start_matches('_').len();
    let (prefix, rest) = s.split_at(prefix_len);
    let mut chars = rest.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(s.len());
            out.push_str(prefix);
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => s.to_string(),
    }
}

/// Convert a source (snake_case) identifier to the target camelCase form.
///
/// Segments between underscores are joined, every segment after the first
/// capitalized. A segment that already starts uppercase keeps its separating
/// underscore so the mapping stays reversible. When an identifier has no
/// underscores but is already camel-cased, an underscore is inserted before
/// each inner uppercase letter instead (`getBalance` → `get_Balance`).
/// An identifier made only of underscores becomes `_`.
pub fn to_camel_case(identifier: &str) -> String {
    let mut segments = identifier.split('_').filter(|s| !s.is_empty());
    let Some(first) = segments.next() else {
        return "_".to_string();
    };

    let mut converted = first.to_string();
    for segment in segments {
        if segment.starts_with(|c: char| c.is_uppercase()) {
            converted.push('_');
            converted.push_str(segment);
        } else {
            converted.push_str(&capitalize_first(segment));
        }
    }

    if converted == identifier && !identifier.contains('_') {
        return split_camel_humps(identifier);
    }
    converted
}

fn split_camel_humps(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    for (i, c) in identifier.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push('_');
        }
        out.push(c);
    }
    out
}

/// Render a source identifier as a target identifier.
///
/// A result starting with a digit (`_1` → `1`) gets a leading `_`.
pub fn bind_identifier(name: &str, use_conventions: bool) -> String {
    let bound = if use_conventions {
        escape_identifier(&to_camel_case(name))
    } else {
        escape_identifier(name)
    };
    if bound.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{bound}")
    } else {
        bound
    }
}

/// Check whether `name` is a legal source-runtime identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_xid_start() => chars.all(|c| c.is_xid_continue()),
        _ => false,
    }
}

/// Check whether `name` is usable verbatim as a target identifier.
pub fn is_target_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let legal = match chars.next() {
        Some(c) if c == '_' || c == '$' || c.is_xid_start() => {
            chars.all(|c| c == '$' || c.is_xid_continue())
        }
        _ => false,
    };
    legal && !is_reserved(name)
}
