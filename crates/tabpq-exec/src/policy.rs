//! Encoding policy: sampler verdicts → output schema.

use tabpq_core::schema::{EncodingChoice, Field, Schema};

/// Pair each header name with its encoding, preserving column order.
///
/// `verdicts[i]` is the sampler's should-dictionary flag for `header[i]`.
pub fn decide(header: &[String], verdicts: &[bool]) -> Schema {
    debug_assert_eq!(header.len(), verdicts.len());
    Schema::new(
        header
            .iter()
            .zip(verdicts)
            .map(|(name, &dict)| Field::new(name.as_str(), EncodingChoice::from_verdict(dict)))
            .collect(),
    )
}
