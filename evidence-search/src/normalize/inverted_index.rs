//! Abstract reconstruction from an inverted index.
//!
//! OpenAlex ships abstracts as `{ word: [positions...] }`. Rebuilding the
//! text means placing each word at every listed position and reading the
//! sequence back in order.

use serde_json::Value;

use super::truncate_chars;

/// Maximum characters kept from a reconstructed abstract.
pub const MAX_ABSTRACT_CHARS: usize = 500;

/// Positions beyond this are ignored so a hostile index cannot force a
/// huge allocation.
const MAX_POSITION: u64 = 50_000;

/// Rebuild abstract text from an inverted index.
///
/// Words are placed at each of their positions in a sequence sized to the
/// largest position + 1; unfilled slots are skipped, the rest joined with
/// single spaces and truncated to [`MAX_ABSTRACT_CHARS`] characters.
///
/// Anything other than a JSON object (including `null`) yields an empty
/// string, as does an object with no usable positions.
pub fn reconstruct_abstract(index: &Value) -> String {
    let Some(map) = index.as_object() else {
        return String::new();
    };

    let positions = |value: &Value| -> Vec<usize> {
        value
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_u64)
                    .filter(|p| *p <= MAX_POSITION)
                    .filter_map(|p| usize::try_from(p).ok())
                    .collect()
            })
            .unwrap_or_default()
    };

    let Some(max) = map.values().flat_map(positions).max() else {
        return String::new();
    };

    let mut slots: Vec<Option<&str>> = vec![None; max + 1];
    for (word, value) in map {
        for position in positions(value) {
            slots[position] = Some(word.as_str());
        }
    }

    let text = slots.into_iter().flatten().collect::<Vec<_>>().join(" ");
    truncate_chars(&text, MAX_ABSTRACT_CHARS)
}
