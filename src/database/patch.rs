use serde::{Deserialize, Deserializer};

/// A partial update merged over a stored row. Absent fields leave the row untouched.
pub trait Patch<T> {
    fn apply(self, target: &mut T);
}

/// Overwrite `slot` when the patch carries a value.
pub fn merge<V>(slot: &mut V, value: Option<V>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Deserializer for clearable fields: a missing key stays `None` (via `#[serde(default)]`),
/// an explicit `null` becomes `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
