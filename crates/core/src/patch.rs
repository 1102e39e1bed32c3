//! Tri-state patch fields for partial updates.
//!
//! A bare `Option` cannot express the difference between "this field was not
//! mentioned" and "this field was explicitly set to null". [`PatchField`]
//! carries that extra bit: `Unspecified` leaves the target untouched, while
//! `Specified(None)` (for `T = Option<_>`) explicitly clears it.
//!
//! In JSON, an absent key deserializes to `Unspecified` (via
//! `#[serde(default)]` on the containing struct field) and a present key —
//! including an explicit `null` — deserializes to `Specified`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value that is either unspecified (leave the target alone) or specified
/// with a value of `T` (overwrite the target, where `T` may itself be an
/// `Option` to allow explicit clearing).
///
/// There is no way to read a value out of an `Unspecified` field: extraction
/// only happens through `Option`-returning accessors, so consumers are forced
/// to branch before touching the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchField<T> {
    /// The field was not mentioned; the target keeps its current value.
    Unspecified,
    /// The field was mentioned with this value (possibly an explicit null).
    Specified(T),
}

impl<T> PatchField<T> {
    /// An unspecified field.
    pub fn unspecified() -> Self {
        Self::Unspecified
    }

    /// Whether this field carries a value.
    pub fn is_specified(&self) -> bool {
        matches!(self, Self::Specified(_))
    }

    /// Borrow the value if specified.
    pub fn as_specified(&self) -> Option<&T> {
        match self {
            Self::Specified(value) => Some(value),
            Self::Unspecified => None,
        }
    }

    /// Consume the field, yielding the value if specified.
    pub fn into_specified(self) -> Option<T> {
        match self {
            Self::Specified(value) => Some(value),
            Self::Unspecified => None,
        }
    }

    /// Overwrite `target` if this field is specified; otherwise leave it.
    pub fn apply_to(self, target: &mut T) {
        if let Self::Specified(value) = self {
            *target = value;
        }
    }
}

impl<T> Default for PatchField<T> {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl<T> From<T> for PatchField<T> {
    fn from(value: T) -> Self {
        Self::Specified(value)
    }
}

// A present JSON value (including `null` for `T = Option<_>`) is Specified.
// Absence is handled by `#[serde(default)]` on the containing struct.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for PatchField<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Self::Specified)
    }
}

impl<T: Serialize> Serialize for PatchField<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Specified(value) => value.serialize(serializer),
            // Callers must pair this with `skip_serializing_if`; an
            // unspecified field has no JSON representation of its own.
            Self::Unspecified => serializer.serialize_none(),
        }
    }
}
