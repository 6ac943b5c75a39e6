// Canonical-dialect (PostgreSQL-flavored) statement classification and
// SQLite rewriting.
//
// Call sites emit a closed, enumerable set of statement shapes; the rewriter
// deliberately handles exactly those, not general SQL translation. The
// classifier produces a tagged shape so dispatch is an exhaustive match
// rather than a cascade of string checks.

pub(crate) mod placeholders;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SqlGatewayError;

/// The closed set of statement shapes the gateway understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementShape {
    /// `SELECT` or `WITH`: a read returning all matching rows.
    Select,
    /// `INSERT INTO <table> ... RETURNING *`: on SQLite, emulated via a
    /// follow-up read of `last_insert_rowid()` from the captured table.
    InsertReturning { table: String },
    /// `UPDATE`/`DELETE ... RETURNING *`: SQLite cannot return the modified
    /// rows, so the gateway reports an empty row set with the affected count.
    UpdateOrDeleteReturning,
    /// Any other write (plain `INSERT`/`UPDATE`/`DELETE`, DDL).
    PlainWrite,
}

impl StatementShape {
    /// Whether this shape produces rows on a backend that supports the
    /// canonical dialect natively.
    #[must_use]
    pub fn returns_rows(&self) -> bool {
        !matches!(self, StatementShape::PlainWrite)
    }
}

/// A statement rewritten for the embedded backend.
#[derive(Debug, Clone)]
pub struct RewrittenQuery {
    /// The SQLite-dialect SQL, with `RETURNING *` stripped and placeholders
    /// rewritten to `?`.
    pub sql: String,
    pub shape: StatementShape,
    /// Zero-based indices into the caller's parameter slice, one per `?`
    /// placeholder, in occurrence order.
    pub bind_order: Vec<usize>,
}

static NOW_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bNOW\s*\(\s*\)").unwrap());
static CURRENT_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bCURRENT_TIMESTAMP\b").unwrap());
static DATE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bDATE\s*\(([^)]+)\)").unwrap());
static TRAILING_RETURNING_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+RETURNING\s+\*\s*;?\s*$").unwrap());
static INSERT_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^\s*INSERT\s+INTO\s+"?([A-Za-z_][A-Za-z0-9_]*)"#).unwrap());
static CONFLICT_DO_NOTHING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bON\s+CONFLICT\s*\(([^)]+)\)\s*DO\s+NOTHING").unwrap());

fn leading_keyword(sql: &str) -> String {
    sql.trim_start()
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Classify a canonical-dialect template into its statement shape.
///
/// Statements that are neither reads nor `RETURNING *` writes fall through to
/// [`StatementShape::PlainWrite`]; only an empty template or a `RETURNING *`
/// on an unsupported statement kind is a translation error.
///
/// # Errors
///
/// Returns [`SqlGatewayError::TranslationError`] naming the offending
/// template.
pub fn classify(sql: &str) -> Result<StatementShape, SqlGatewayError> {
    if sql.trim().is_empty() {
        return Err(SqlGatewayError::translation(sql, "empty SQL template"));
    }

    let keyword = leading_keyword(sql);
    if keyword == "SELECT" || keyword == "WITH" {
        return Ok(StatementShape::Select);
    }

    if TRAILING_RETURNING_STAR.is_match(sql) {
        if let Some(caps) = INSERT_TABLE.captures(sql) {
            return Ok(StatementShape::InsertReturning {
                table: caps[1].to_string(),
            });
        }
        if keyword == "UPDATE" || keyword == "DELETE" {
            return Ok(StatementShape::UpdateOrDeleteReturning);
        }
        return Err(SqlGatewayError::translation(
            sql,
            "RETURNING * is only recognized on INSERT, UPDATE, and DELETE",
        ));
    }

    Ok(StatementShape::PlainWrite)
}

/// Rewrite a canonical-dialect template for the embedded SQLite backend.
///
/// Applies, in order: time-function rewriting (`NOW()` and
/// `CURRENT_TIMESTAMP` become `datetime('now')`, `DATE(expr)` becomes
/// `date(expr)` with the inner expression verbatim), trailing `RETURNING *`
/// stripping, `ON CONFLICT (cols) DO NOTHING` spacing normalization, and
/// `$n` placeholder rewriting (only when `param_count > 0`).
///
/// # Errors
///
/// Returns [`SqlGatewayError::TranslationError`] for an empty template, an
/// unsupported `RETURNING *` shape, or an out-of-range placeholder index.
pub fn rewrite_for_sqlite(
    sql: &str,
    param_count: usize,
) -> Result<RewrittenQuery, SqlGatewayError> {
    let shape = classify(sql)?;

    let mut rewritten = NOW_CALL.replace_all(sql, "datetime('now')").into_owned();
    rewritten = CURRENT_TIMESTAMP
        .replace_all(&rewritten, "datetime('now')")
        .into_owned();
    rewritten = DATE_CALL.replace_all(&rewritten, "date($1)").into_owned();

    if matches!(
        shape,
        StatementShape::InsertReturning { .. } | StatementShape::UpdateOrDeleteReturning
    ) {
        rewritten = TRAILING_RETURNING_STAR.replace(&rewritten, "").into_owned();
    }

    rewritten = CONFLICT_DO_NOTHING
        .replace_all(&rewritten, |caps: &regex::Captures<'_>| {
            let cols = caps[1]
                .split(',')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(", ");
            format!("ON CONFLICT({cols}) DO NOTHING")
        })
        .into_owned();

    let (sql_out, bind_order) = if param_count > 0 {
        let (rewritten_sql, bind_order) = placeholders::rewrite_placeholders(
            &rewritten,
            param_count,
        )
        .map_err(|detail| SqlGatewayError::translation(sql, detail))?;
        (rewritten_sql.into_owned(), bind_order)
    } else {
        (rewritten, Vec::new())
    };

    Ok(RewrittenQuery {
        sql: sql_out,
        shape,
        bind_order,
    })
}
