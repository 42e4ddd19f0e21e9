//! Serde helpers for the engine's query-string conventions.

use std::fmt::Display;

use serde::Serializer;

/// Serializes a list-valued query parameter as a single comma-joined value.
///
/// The engine expects `uids=1,2,3` rather than repeated keys, which is what
/// form serializers emit for sequences by default.
pub(crate) fn comma_separated<S: Serializer, T: Display>(
    values: &Option<Vec<T>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match values {
        Some(values) => {
            let joined = values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            serializer.serialize_str(&joined)
        }
        None => serializer.serialize_none(),
    }
}
