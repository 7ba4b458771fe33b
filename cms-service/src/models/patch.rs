//! Tri-state field for partial updates of nullable columns

use serde::{Deserialize, Deserializer};

/// A field in a partial-update body
///
/// Distinguishes a key that was absent (leave the column alone) from an
/// explicit `null` (clear the column). Must be paired with
/// `#[serde(default)]` on the containing field.
///
/// ```rust
/// use cms_service::models::Patch;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Body {
///     #[serde(default)]
///     excerpt: Patch<String>,
/// }
///
/// let absent: Body = serde_json::from_str("{}").unwrap();
/// let cleared: Body = serde_json::from_str(r#"{"excerpt":null}"#).unwrap();
/// assert_eq!(absent.excerpt, Patch::Missing);
/// assert_eq!(cleared.excerpt, Patch::Null);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Key not present; keep the stored value
    Missing,
    /// Explicit `null`; clear the stored value
    Null,
    /// New value
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<T> Patch<T> {
    /// Whether the field was present in the request
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Missing)
    }

    /// `None` when missing, otherwise the nullable value to store
    pub fn into_update(self) -> Option<Option<T>> {
        match self {
            Self::Missing => None,
            Self::Null => Some(None),
            Self::Value(value) => Some(Some(value)),
        }
    }

    /// Borrow the contained value, if any
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Value(value),
            None => Self::Null,
        })
    }
}
