//! Query parameter encoding strategies.
//!
//! A request carries an ordered, multi-valued parameter map. How a key with
//! several values ends up in the query string differs between APIs, so the
//! encoding is selectable per request via [`ParameterEncoding`].

use indexmap::IndexMap;

/// How multi-valued query parameters are written into the query string.
///
/// # Examples
///
/// ```
/// use restcall::ParameterEncoding;
///
/// // `k=v1` - later values for the same key are dropped
/// let overwrite = ParameterEncoding::Overwrite;
///
/// // `k=v1&k=v2` - the key is repeated per value
/// let duplicate = ParameterEncoding::Duplicate;
///
/// // `k[0]=v1&k[1]=v2` - but a single value stays `k=v1`
/// let indexed = ParameterEncoding::IndexedArray;
/// # let _ = (overwrite, duplicate, indexed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterEncoding {
    /// Emit only the first value for each key.
    #[default]
    Overwrite,

    /// Emit one `key=value` pair per value, preserving value order.
    Duplicate,

    /// Emit `key=value` when a key has exactly one value, and
    /// `key[i]=value_i` (zero-based) when it has two or more.
    ///
    /// The asymmetry is deliberate: single-valued keys never get an index.
    IndexedArray,
}

/// Flattens the ordered parameter map into `(key, value)` pairs for query
/// string serialization.
///
/// Pairs come out in the map's insertion order. A key whose value list is
/// empty is skipped silently in every mode. Values are emitted raw;
/// percent-encoding happens when the URL is assembled.
pub(crate) fn encode_pairs(
    parameters: &IndexMap<String, Vec<String>>,
    encoding: ParameterEncoding,
) -> Vec<(String, String)> {
    match encoding {
        ParameterEncoding::Overwrite => parameters
            .iter()
            .filter_map(|(key, values)| values.first().map(|value| (key.clone(), value.clone())))
            .collect(),
        ParameterEncoding::Duplicate => parameters
            .iter()
            .flat_map(|(key, values)| {
                values.iter().map(move |value| (key.clone(), value.clone()))
            })
            .collect(),
        ParameterEncoding::IndexedArray => {
            let mut pairs = Vec::new();
            for (key, values) in parameters {
                if values.len() == 1 {
                    if let Some(value) = values.first() {
                        pairs.push((key.clone(), value.clone()));
                    }
                } else {
                    for (index, value) in values.iter().enumerate() {
                        pairs.push((format!("{key}[{index}]"), value.clone()));
                    }
                }
            }
            pairs
        }
    }
}
