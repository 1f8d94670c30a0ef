//! String helpers for splitting and unquoting qualified object names.

/// Splits a dotted name into its parts, keeping quoted parts intact.
///
/// Dots inside `"..."`, `` `...` ``, `'...'` and `[...]` do not split.
/// Doubled quote characters inside a quoted part are kept as an escape.
pub fn split_qualified_identifiers(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = name.chars().peekable();
    let mut active_quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(q) = active_quote {
            current.push(ch);
            if ch == q {
                if matches!(q, '"' | '\'' | '`') && chars.peek() == Some(&q) {
                    current.extend(chars.next());
                    continue;
                }
                active_quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' | '`' => {
                active_quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                active_quote = Some(']');
                current.push(ch);
            }
            '.' => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    parts.push(current.trim().to_string());
    parts
}

/// Returns true if `part` is wrapped in a matching pair of quote characters.
pub fn is_quoted_identifier(part: &str) -> bool {
    let trimmed = part.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => matches!(
            (first, last),
            ('"', '"') | ('`', '`') | ('[', ']') | ('\'', '\'')
        ),
        _ => false,
    }
}

/// Removes the surrounding quotes from `part`, if any, and collapses doubled
/// quote characters.
pub fn unquote_identifier(part: &str) -> String {
    let trimmed = part.trim();
    if !is_quoted_identifier(trimmed) {
        return trimmed.to_string();
    }

    let quote = trimmed.chars().next().unwrap_or('"');
    let inner = &trimmed[quote.len_utf8()..trimmed.len() - 1];
    match quote {
        '"' => inner.replace("\"\"", "\""),
        '`' => inner.replace("``", "`"),
        '\'' => inner.replace("''", "'"),
        _ => inner.to_string(),
    }
}

/// Splits a possibly qualified name into unquoted parts.
///
/// Returns an empty vector when the input has no non-empty part at all.
pub fn unquoted_parts(name: &str) -> Vec<String> {
    let parts: Vec<String> = split_qualified_identifiers(name)
        .iter()
        .map(|part| unquote_identifier(part))
        .collect();
    if parts.iter().all(String::is_empty) {
        Vec::new()
    } else {
        parts
    }
}

/// Returns the unqualified (last) part of a dotted name.
pub fn extract_simple_name(name: &str) -> String {
    unquoted_parts(name).pop().unwrap_or_default()
}
