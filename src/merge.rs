//! Deep merge over JSON trees.

use serde_json::Value;

/// Merge `overlay` into `base`.
///
/// Where both sides hold an object the two are merged key by key; in every
/// other case (scalars, arrays, mismatched kinds) the overlay replaces the
/// base value outright. Keys present on only one side are kept as they are.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => {
                        let previous = existing.take();
                        *existing = deep_merge(previous, value);
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}
