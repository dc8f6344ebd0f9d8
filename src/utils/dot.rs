//! Graphviz DOT helpers.

/// Escapes `s` for use inside a double-quoted DOT string.
///
/// Quotes, backslashes and angle brackets are escaped, line feeds become the
/// DOT `\n` escape and carriage returns are dropped. Callable signatures such as
/// `function C.f(mapping(address => uint256))` render unchanged apart from the
/// escaping.
///
/// # Arguments
///
/// * `s` - The label text to escape
///
/// # Returns
///
/// The escaped label text.
#[must_use]
pub fn escape_dot(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '<' => escaped.push_str("\\<"),
            '>' => escaped.push_str("\\>"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}
