//! Identifier and literal rendering for emitted SQL.

use std::fmt;

/// Words that can't appear bare as a table, column or sequence name: the
/// fully reserved keywords plus those reserved except as function or type
/// names.
const RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both", "case",
    "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
    "current_date", "current_role", "current_time", "current_timestamp", "current_user",
    "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false", "fetch",
    "for", "foreign", "from", "grant", "group", "having", "in", "initially", "intersect", "into",
    "lateral", "leading", "limit", "localtime", "localtimestamp", "not", "null", "offset", "on",
    "only", "or", "order", "placing", "primary", "references", "returning", "select",
    "session_user", "some", "symmetric", "table", "then", "to", "trailing", "true", "union",
    "unique", "user", "using", "variadic", "when", "where", "window", "with",
    // reserved, but allowed as function or type names
    "authorization", "binary", "collation", "concurrently", "cross", "current_schema", "freeze",
    "full", "ilike", "inner", "is", "isnull", "join", "left", "like", "natural", "notnull",
    "outer", "overlaps", "right", "similar", "tablesample", "verbose",
];

/// A PostgreSQL string literal wrapper.
///
/// Display writes the value escaped and quoted with single quotes.
///
/// # Example
/// ```
/// use seqaudit::sql::Lit;
/// assert_eq!(format!("{}", Lit("foo")), "'foo'");
/// assert_eq!(format!("{}", Lit("it's")), "'it''s'");
/// ```
pub struct Lit<T: AsRef<str>>(pub T);

impl<T: AsRef<str>> fmt::Display for Lit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'")?;
        for c in self.0.as_ref().chars() {
            if c == '\'' {
                write!(f, "''")?;
            } else {
                write!(f, "{}", c)?;
            }
        }
        write!(f, "'")
    }
}

/// A PostgreSQL identifier wrapper.
///
/// Plain lowercase names are written as-is so the generated scripts stay
/// readable. Anything else (mixed case, spaces, reserved words) is quoted
/// with double quotes, doubling embedded quotes.
///
/// # Example
/// ```
/// use seqaudit::sql::Ident;
/// assert_eq!(format!("{}", Ident("orders")), "orders");
/// assert_eq!(format!("{}", Ident("order")), "\"order\"");
/// assert_eq!(format!("{}", Ident("Bla\"h")), "\"Bla\"\"h\"");
/// ```
pub struct Ident<T: AsRef<str>>(pub T);

impl<T: AsRef<str>> fmt::Display for Ident<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.0.as_ref();
        if is_plain(name) {
            return write!(f, "{}", name);
        }
        write!(f, "\"")?;
        for c in name.chars() {
            if c == '"' {
                write!(f, "\"\"")?;
            } else {
                write!(f, "{}", c)?;
            }
        }
        write!(f, "\"")
    }
}

fn is_plain(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$')
        && !RESERVED.contains(&name)
}

/// Render a sequence name the way `nextval`/`setval` expect it: the
/// identifier form wrapped in a string literal.
pub fn regclass_lit(name: &str) -> String {
    Lit(Ident(name).to_string()).to_string()
}

/// Split a possibly schema-qualified, possibly quoted relation name as
/// Postgres prints it (`public.orders_id_seq`, `"Weird"."Seq"`) into its
/// schema and relation parts, with quoting removed.
pub fn split_qualified(name: &str) -> (Option<String>, String) {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = name.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => quoted = !quoted,
            '.' if !quoted => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    parts.push(current);

    let relation = parts.pop().unwrap_or_default();
    (parts.pop(), relation)
}

/// Escape `%`, `_` and `\` so `s` matches literally inside a LIKE pattern.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_plain_names_stay_bare() {
        assert_eq!(Ident("orders").to_string(), "orders");
        assert_eq!(Ident("orders_id_seq1").to_string(), "orders_id_seq1");
        assert_eq!(Ident("_private").to_string(), "_private");
    }

    #[test]
    fn test_ident_quotes_when_needed() {
        assert_eq!(Ident("user").to_string(), "\"user\"");
        assert_eq!(Ident("Orders").to_string(), "\"Orders\"");
        assert_eq!(Ident("line item").to_string(), "\"line item\"");
        assert_eq!(Ident("1st").to_string(), "\"1st\"");
        assert_eq!(Ident("").to_string(), "\"\"");
    }

    #[test]
    fn test_ident_quotes_function_or_type_keywords() {
        assert_eq!(Ident("left").to_string(), "\"left\"");
        assert_eq!(Ident("join").to_string(), "\"join\"");
        for word in ["is", "like", "inner", "outer", "verbose", "current_schema"] {
            assert_eq!(Ident(word).to_string(), format!("\"{}\"", word));
        }
        // non-reserved keywords stay bare
        assert_eq!(Ident("name").to_string(), "name");
        assert_eq!(Ident("left_id_seq").to_string(), "left_id_seq");
    }

    #[test]
    fn test_regclass_lit() {
        assert_eq!(regclass_lit("orders_id_seq"), "'orders_id_seq'");
        assert_eq!(regclass_lit("Orders_id_seq"), "'\"Orders_id_seq\"'");
        assert_eq!(regclass_lit("it's_seq"), "'\"it''s_seq\"'");
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("orders_id_seq"), (None, "orders_id_seq".to_string()));
        assert_eq!(
            split_qualified("public.orders_id_seq"),
            (Some("public".to_string()), "orders_id_seq".to_string())
        );
        assert_eq!(
            split_qualified("\"My Schema\".\"Seq.Name\""),
            (Some("My Schema".to_string()), "Seq.Name".to_string())
        );
        assert_eq!(
            split_qualified("\"say \"\"hi\"\"\""),
            (None, "say \"hi\"".to_string())
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("orders_id_seq"), "orders\\_id\\_seq");
        assert_eq!(escape_like("100%"), "100\\%");
    }
}
