//! Tri-state field used by partial updates.

use serde::{Deserialize, Deserializer};

/// A single field of a partial update.
///
/// JSON bodies distinguish a field that was left out from a field that was
/// sent as `null`. Declare patch fields as `#[serde(default)] Patch<T>`:
/// an absent key stays [`Patch::Missing`], `null` becomes [`Patch::Null`]
/// and anything else is parsed into [`Patch::Value`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// The field was not present in the request.
    #[default]
    Missing,
    /// The field was explicitly set to `null`.
    Null,
    /// The field was set to a value.
    Value(T),
}

impl<T> Patch<T> {
    /// Returns true if the field was not present in the request.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Returns true if the field was explicitly set to `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value by reference, if one was provided.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Writes the value into a non-nullable field.
    ///
    /// `Null` is rejected during validation, so only `Value` is applied here.
    /// Returns true if the field was written.
    pub fn apply_to(self, field: &mut T) -> bool {
        match self {
            Self::Value(value) => {
                *field = value;
                true
            }
            Self::Missing | Self::Null => false,
        }
    }

    /// Writes the value into a nullable field; `Null` clears it.
    ///
    /// Returns true if the field was written.
    pub fn apply_to_option(self, field: &mut Option<T>) -> bool {
        match self {
            Self::Missing => false,
            Self::Null => {
                *field = None;
                true
            }
            Self::Value(value) => {
                *field = Some(value);
                true
            }
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Null,
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
        // Only reached when the key is present; absence falls back to Default.
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}
