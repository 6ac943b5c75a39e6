use std::borrow::Cow;

/// Rewrite canonical `$n` placeholders to SQLite's anonymous `?`, recording
/// the zero-based parameter index of each occurrence in left-to-right order.
///
/// A repeated `$n` therefore shows up repeatedly in the bind order, and the
/// caller binds the same value again at that slot. Placeholders inside string
/// literals, quoted identifiers, comments, and dollar-quoted blocks are left
/// untouched.
///
/// Returns a borrowed `Cow` when no changes are needed. Errors (as a bare
/// detail string; the caller attaches the original template) when a
/// placeholder index is `$0` or exceeds `param_count`.
pub(crate) fn rewrite_placeholders(
    sql: &str,
    param_count: usize,
) -> Result<(Cow<'_, str>, Vec<usize>), String> {
    let bytes = sql.as_bytes();
    let mut out = String::new();
    let mut copied = 0; // everything before this offset is already in `out`
    let mut changed = false;
    let mut bind_order = Vec::new();
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'-' if bytes.get(idx + 1) == Some(&b'-') => {
                    state = State::LineComment;
                    idx += 1;
                }
                b'/' if bytes.get(idx + 1) == Some(&b'*') => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' => {
                    if let Some((tag, close_idx)) = try_start_dollar_quote(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = close_idx;
                    } else if let Some((end, n)) = scan_placeholder(bytes, idx + 1) {
                        if n == 0 || n > param_count {
                            return Err(format!(
                                "placeholder ${n} out of range for {param_count} parameter(s)"
                            ));
                        }
                        out.push_str(&sql[copied..idx]);
                        out.push('?');
                        bind_order.push(n - 1);
                        copied = end;
                        changed = true;
                        idx = end;
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if b == b'/' && bytes.get(idx + 1) == Some(&b'*') {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if b == b'*' && bytes.get(idx + 1) == Some(&b'/') {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && closes_dollar_quote(bytes, idx, tag) {
                    let skip = tag.len() + 1;
                    idx += skip;
                    state = State::Normal;
                }
            }
        }

        idx += 1;
    }

    if changed {
        out.push_str(&sql[copied..]);
        Ok((Cow::Owned(out), bind_order))
    } else {
        Ok((Cow::Borrowed(sql), bind_order))
    }
}

enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

/// Scan the digits of a `$n` placeholder; returns the end offset and `n`.
fn scan_placeholder(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let mut idx = start;
    let mut n: usize = 0;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        n = n.saturating_mul(10).saturating_add(usize::from(bytes[idx] - b'0'));
        idx += 1;
    }
    if idx == start { None } else { Some((idx, n)) }
}

/// At an opening `$`, detect a `$tag$` dollar-quote start. Returns the tag and
/// the index of the closing `$` of the opening delimiter.
fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    // Tags cannot start with a digit; `$1` is a placeholder, never a quote.
    if bytes.get(start + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }

    if idx < bytes.len() && bytes[idx] == b'$' {
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

fn closes_dollar_quote(bytes: &[u8], idx: usize, tag: &str) -> bool {
    let end = idx + 1 + tag.len();
    bytes.get(idx + 1..end).is_some_and(|s| s == tag.as_bytes())
        && bytes.get(end) == Some(&b'$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_in_order() {
        let (sql, order) =
            rewrite_placeholders("INSERT INTO t (a, b) VALUES ($1, $2)", 2).unwrap();
        assert_eq!(sql, "INSERT INTO t (a, b) VALUES (?, ?)");
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn repeated_placeholder_repeats_bind_slot() {
        let (sql, order) =
            rewrite_placeholders("UPDATE t SET a = $1, b = $2 WHERE a = $1", 2).unwrap();
        assert_eq!(sql, "UPDATE t SET a = ?, b = ? WHERE a = ?");
        assert_eq!(order, vec![0, 1, 0]);
    }

    #[test]
    fn skips_literals_and_comments() {
        let sql = "SELECT '$1', a -- $2\n/* $3 */ FROM t WHERE a = $1";
        let (out, order) = rewrite_placeholders(sql, 1).unwrap();
        assert_eq!(out, "SELECT '$1', a -- $2\n/* $3 */ FROM t WHERE a = ?");
        assert_eq!(order, vec![0]);
    }

    #[test]
    fn skips_quoted_identifiers_and_escaped_quotes() {
        let sql = r#"SELECT "a$1", 'it''s $1' FROM t WHERE b = $1"#;
        let (out, order) = rewrite_placeholders(sql, 1).unwrap();
        assert_eq!(out, r#"SELECT "a$1", 'it''s $1' FROM t WHERE b = ?"#);
        assert_eq!(order, vec![0]);
    }

    #[test]
    fn skips_dollar_quoted_blocks() {
        let sql = "SELECT $tag$literal $1$tag$ FROM t WHERE a = $1";
        let (out, order) = rewrite_placeholders(sql, 1).unwrap();
        assert_eq!(out, "SELECT $tag$literal $1$tag$ FROM t WHERE a = ?");
        assert_eq!(order, vec![0]);
    }

    #[test]
    fn untouched_sql_stays_borrowed() {
        let sql = "SELECT * FROM t";
        let (out, order) = rewrite_placeholders(sql, 3).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
        assert!(order.is_empty());
    }

    #[test]
    fn out_of_range_placeholder_is_rejected() {
        assert!(rewrite_placeholders("SELECT $3", 2).is_err());
        assert!(rewrite_placeholders("SELECT $0", 2).is_err());
    }

    #[test]
    fn multibyte_text_survives_rewriting() {
        let sql = "INSERT INTO stores (name) VALUES ($1) -- 店舗";
        let (out, order) = rewrite_placeholders(sql, 1).unwrap();
        assert_eq!(out, "INSERT INTO stores (name) VALUES (?) -- 店舗");
        assert_eq!(order, vec![0]);
    }
}
