//! SQL text helpers.
//! Identifiers are allow-listed before they get here; quoting is still applied
//! so a value can never terminate its literal or identifier.

/// Quote `s` as a single-quoted string literal, escaping `'` and `\`.
pub fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Quote `s` as a backtick identifier, doubling embedded backticks.
pub fn quote_identifier(s: &str) -> String {
    format!("`{}`", s.replace('`', "``"))
}
