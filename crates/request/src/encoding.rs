//! Percent-encoders for path segments and pre-encoded query values.
//!
//! Path segments keep the characters the service accepts literally in channel
//! and group names (`-_~!$'()@[]` plus backtick and `|`). The URL delimiters
//! `? # & + ; =` and the service-reserved `. , : *` are always
//! percent-encoded, as is everything non-ASCII.
//!
//! Query values are *not* encoded here; the executor form-encodes them. The
//! exceptions are name lists, pre-encoded with [`join_query_list`] so a comma
//! inside a name stays distinct from the separators, and the subscribe filter
//! expression, pre-encoded with [`encode_filter_expression`].

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::form_urlencoded;

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'@')
    .remove(b'[')
    .remove(b']')
    .remove(b'`')
    .remove(b'|');

// RFC 3986 unreserved characters only; spaces become %20.
const STRICT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Encodes one channel or group name for use as (part of) a path segment.
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Joins names into a comma-separated list, encoding each name individually.
///
/// Commas inside a name are encoded; the separators are not. An empty slice
/// yields an empty string.
pub fn join_channels<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| encode_path_segment(n.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Form-encodes each name and joins them with literal commas, for query
/// values that carry a list of channels or groups.
pub fn join_query_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| form_urlencoded::byte_serialize(n.as_ref().as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
}

/// Pre-encodes a filter expression so the executor can pass it through as is.
pub fn encode_filter_expression(expression: &str) -> String {
    utf8_percent_encode(expression, STRICT).to_string()
}
