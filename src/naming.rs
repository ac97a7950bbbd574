//! Identifier synthesis for generated types, fields and enum members.

use convert_case::{Case, Casing};

/// Names that would shadow prelude or commonly imported types in generated code.
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Box", "Err", "HashMap", "None", "Ok", "Option", "Result", "Self", "Some", "String", "Value",
    "Vec",
];

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be used as raw identifiers.
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "super", "Self", "_"];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "fish",
    "information",
    "jeans",
    "money",
    "news",
    "police",
    "rice",
    "series",
    "sheep",
    "species",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("people", "person"),
    ("women", "woman"),
    ("men", "man"),
    ("mice", "mouse"),
    ("oxen", "ox"),
];

/// Plural suffix to singular suffix, first match wins.
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("databases", "database"),
    ("quizzes", "quiz"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("indices", "index"),
    ("statuses", "status"),
    ("aliases", "alias"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
    ("buses", "bus"),
    ("shoes", "shoe"),
    ("movies", "movie"),
    ("status", "status"),
    ("alias", "alias"),
    ("bus", "bus"),
    ("sis", "sis"),
    ("sses", "ss"),
    ("ss", "ss"),
    ("xes", "x"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("oes", "o"),
];

/// Replaces every run of characters that cannot appear in an identifier with `_`.
fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(c);
        } else {
            pending_separator = true;
        }
    }
    out
}

pub fn pascal_case(name: &str) -> String {
    sanitize(name).to_case(Case::Pascal)
}

pub fn snake_case(name: &str) -> String {
    sanitize(name).to_case(Case::Snake)
}

/// Name of the record synthesized for an object-typed field.
pub fn type_name(field: &str) -> String {
    let name = pascal_case(field);
    if name.is_empty() {
        return "Anonymous".to_string();
    }
    let name = if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("T{name}")
    } else {
        name
    };
    if RESERVED_TYPE_NAMES.contains(&name.as_str()) {
        format!("{name}Type")
    } else {
        name
    }
}

/// Name of the enum synthesized for a string field carrying `enum`.
pub fn enum_name(field: &str) -> String {
    let name = pascal_case(field);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("T{name}Enum")
    } else {
        format!("{name}Enum")
    }
}

/// Variant name for one enum literal.
pub fn enum_member_name(value: &str) -> String {
    let name = pascal_case(value);
    if name.is_empty() {
        "Empty".to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("V{name}")
    } else if NON_RAW_KEYWORDS.contains(&name.as_str()) {
        format!("{name}Value")
    } else {
        name
    }
}

/// Rust identifier for a JSON property name.
pub fn field_ident(name: &str) -> String {
    let snake = snake_case(name);
    let snake = if snake.is_empty() {
        "field".to_string()
    } else if snake.starts_with(|c: char| c.is_ascii_digit()) {
        format!("field_{snake}")
    } else {
        snake
    };

    if NON_RAW_KEYWORDS.contains(&snake.as_str()) {
        format!("{snake}_")
    } else if KEYWORDS.contains(&snake.as_str()) {
        format!("r#{snake}")
    } else {
        snake
    }
}

/// True when `suffix` ends `lower` at a word boundary of `word`.
///
/// Boundaries are the start of the word, a separator, or a camelCase hump.
fn ends_with_word(word: &str, lower: &str, suffix: &str) -> bool {
    if !lower.ends_with(suffix) {
        return false;
    }
    let start = lower.len() - suffix.len();
    start == 0
        || !lower.as_bytes()[start - 1].is_ascii_alphanumeric()
        || word.as_bytes()[start].is_ascii_uppercase()
}

/// Splices `replacement` over the last `suffix_len` bytes, keeping the case of
/// the first replaced character.
fn splice(word: &str, suffix_len: usize, replacement: &str) -> String {
    let start = word.len() - suffix_len;
    let mut out = word[..start].to_string();
    let capitalize = word.as_bytes()[start].is_ascii_uppercase();
    let mut chars = replacement.chars();
    if let Some(first) = chars.next() {
        if capitalize {
            out.push(first.to_ascii_uppercase());
        } else {
            out.push(first);
        }
        out.push_str(chars.as_str());
    }
    out
}

/// English singular of a (possibly camelCase or snake_case) field name.
///
/// Only the final word is inflected. Covers the regular plural forms plus the
/// common irregular and uncountable nouns.
pub fn singularize(word: &str) -> String {
    if !word.is_ascii() || word.is_empty() {
        return word.to_string();
    }
    let lower = word.to_ascii_lowercase();

    if UNCOUNTABLE
        .iter()
        .any(|noun| ends_with_word(word, &lower, noun))
    {
        return word.to_string();
    }

    for (plural, singular) in IRREGULAR {
        if ends_with_word(word, &lower, plural) {
            return splice(word, plural.len(), singular);
        }
    }

    for (plural, singular) in SUFFIX_RULES {
        if lower.ends_with(plural) {
            return splice(word, plural.len(), singular);
        }
    }

    if let Some(stem) = lower.strip_suffix("ies") {
        let consonant = stem
            .chars()
            .last()
            .is_some_and(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y'));
        if consonant {
            return splice(word, 3, "y");
        }
    }

    match lower.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => word[..stem.len()].to_string(),
        _ => word.to_string(),
    }
}
