//! Deterministic index naming.
//!
//! An index name is a pure function of the indexed relation, the rendered
//! row-filter predicate and the rendered index expression:
//!
//! ```text
//! {table}_{short_hash(predicate)}_{short_hash(expression)}
//! ```
//!
//! Recompiling the same inputs yields the same name, so a guarded create is
//! idempotent and a refresh can drop exactly the index it is about to
//! rebuild.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Digest bytes kept per component.
const DIGEST_BYTES: usize = 10;

/// Length of one encoded component.
pub const HASH_LEN: usize = 14;

/// PostgreSQL's identifier limit (NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// SHA-256 truncated to 10 bytes, URL-safe base64 without padding.
pub fn short_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    URL_SAFE_NO_PAD.encode(&digest[..DIGEST_BYTES])
}

/// Build the index name for `expression` on `table` under `predicate`.
///
/// `predicate` is the rendered filter, or "" when the relation is unfiltered.
/// A table name too long for the identifier limit is shortened and suffixed
/// with its own hash, so relations sharing a long prefix stay distinct.
pub fn index_name(table: &str, predicate: &str, expression: &str) -> String {
    format!(
        "{}_{}_{}",
        table_component(table),
        short_hash(predicate),
        short_hash(expression)
    )
}

fn table_component(table: &str) -> String {
    let budget = MAX_IDENTIFIER_LEN - 2 * (HASH_LEN + 1);
    if table.len() <= budget {
        return table.to_string();
    }
    format!(
        "{}_{}",
        truncate_to_boundary(table, budget - (HASH_LEN + 1)),
        short_hash(table)
    )
}

fn truncate_to_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
