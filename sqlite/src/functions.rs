//! SQL functions the engine does not provide on its own.
//!
//! SQLite parses `X REGEXP Y` but ships no implementation; the operator is
//! rewritten to `regexp(Y, X)` and fails unless a function of that name is
//! registered on the connection.

use std::sync::Arc;

use regex::Regex;
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Registers `regexp(pattern, text)` on the connection.
pub(crate) fn register_regexp(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        regexp,
    )
}

/// Returns whether `text` contains a match of `pattern`, or NULL for NULL text.
///
/// The compiled pattern is cached as auxiliary data, so a bound pattern is
/// compiled once per statement execution rather than once per row.
fn regexp(ctx: &Context<'_>) -> rusqlite::Result<Option<bool>> {
    let pattern: Arc<Regex> = ctx.get_or_create_aux(0, |value| -> Result<Regex, BoxError> {
        Ok(Regex::new(value.as_str()?)?)
    })?;

    let matched = match ctx.get_raw(1) {
        ValueRef::Null => return Ok(None),
        ValueRef::Integer(v) => pattern.is_match(&v.to_string()),
        ValueRef::Real(v) => pattern.is_match(&v.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|err| rusqlite::Error::UserFunctionError(err.into()))?;
            pattern.is_match(text)
        }
    };
    Ok(Some(matched))
}
