//! PostgREST filter values.
//!
//! Each helper renders the `<op>.<value>` half of a `column=<op>.<value>`
//! query parameter; the HTTP layer takes care of URL encoding.

/// Equality: `eq.<value>`.
pub fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Case-insensitive whole-value match: `ilike.<value>`.
///
/// LIKE wildcards in `value` are escaped so only the exact name matches,
/// and surrounding whitespace is trimmed.
pub fn ilike_exact(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if matches!(c, '\\' | '%' | '_' | '*') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("ilike.{}", escaped)
}

/// Membership: `in.("a","b")`.
pub fn in_list<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = values
        .into_iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Ascending order on a column: `<column>.asc`, the value of `order=`.
pub fn asc(column: &str) -> String {
    format!("{}.asc", column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq() {
        assert_eq!(eq("spec-1"), "eq.spec-1");
    }

    #[test]
    fn test_ilike_exact_escapes_wildcards() {
        assert_eq!(ilike_exact(" Foot and Ankle "), "ilike.Foot and Ankle");
        assert_eq!(ilike_exact("hand_wrist"), "ilike.hand\\_wrist");
        assert_eq!(ilike_exact("100%"), "ilike.100\\%");
    }

    #[test]
    fn test_asc() {
        assert_eq!(asc("id"), "id.asc");
    }

    #[test]
    fn test_in_list() {
        assert_eq!(in_list(["a", "b"]), "in.(\"a\",\"b\")");
        assert_eq!(in_list(["say \"hi\""]), "in.(\"say \\\"hi\\\"\")");
    }
}
