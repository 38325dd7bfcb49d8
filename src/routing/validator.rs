//! Path variable validators.
//!
//! A validator receives the raw segment text and either rejects it (`None`)
//! or returns the typed value stored in the request's [`Params`].
//!
//! [`Params`]: crate::routing::Params

use std::sync::Arc;

use crate::routing::PathValue;
use crate::store::ObjectId;

/// Shared validator function. Must be pure; it runs on concurrent dispatches.
pub type Validator = Arc<dyn Fn(&str) -> Option<PathValue> + Send + Sync>;

/// Accepts a 24 character lowercase hex object id.
pub fn object_id(raw: &str) -> Option<PathValue> {
    ObjectId::parse_hex(raw).map(PathValue::Id)
}

/// Accepts a non-empty string of ASCII digits that fits in an `i64`.
pub fn integer(raw: &str) -> Option<PathValue> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok().map(PathValue::Int)
}

/// Accepts exactly one of the given strings.
pub fn one_of(allowed: &'static [&'static str]) -> impl Fn(&str) -> Option<PathValue> + Send + Sync {
    move |raw| {
        allowed
            .iter()
            .find(|candidate| **candidate == raw)
            .map(|candidate| PathValue::from(*candidate))
    }
}
