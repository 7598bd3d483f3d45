//! Typed Uuids

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// A [`Uuid`] tagged with the kind of entity it identifies.
pub struct TypedUuid<T>(Uuid, PhantomData<T>);

impl<T> TypedUuid<T> {
    /// Generate a new time-ordered identifier.
    #[must_use]
    #[expect(
        clippy::new_without_default,
        reason = "a default id would silently mint a random value"
    )]
    pub fn new() -> Self {
        Self::from_uuid(Uuid::now_v7())
    }

    /// Wrap an existing [`Uuid`].
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, PhantomData)
    }

    /// Unwrap into the underlying [`Uuid`].
    #[must_use]
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl<T> Clone for TypedUuid<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedUuid<T> {}

impl<T> Debug for TypedUuid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<T> Display for TypedUuid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for TypedUuid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypedUuid<T> {}

impl<T> Hash for TypedUuid<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> PartialOrd for TypedUuid<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TypedUuid<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> From<Uuid> for TypedUuid<T> {
    fn from(value: Uuid) -> Self {
        Self::from_uuid(value)
    }
}

impl<T> From<TypedUuid<T>> for Uuid {
    fn from(value: TypedUuid<T>) -> Self {
        value.into_uuid()
    }
}

impl<T> FromStr for TypedUuid<T> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self::from_uuid)
    }
}

impl<T> Serialize for TypedUuid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for TypedUuid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}

/// Marker for product identifiers.
#[derive(Debug)]
pub enum ProductKind {}

/// Marker for category identifiers.
#[derive(Debug)]
pub enum CategoryKind {}

/// Marker for coupon identifiers.
#[derive(Debug)]
pub enum CouponKind {}

/// Marker for variety identifiers.
#[derive(Debug)]
pub enum VarietyKind {}

/// Product UUID
pub type ProductUuid = TypedUuid<ProductKind>;

/// Category UUID
pub type CategoryUuid = TypedUuid<CategoryKind>;

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponKind>;

/// Variety UUID
pub type VarietyUuid = TypedUuid<VarietyKind>;

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn typed_uuids_round_trip_through_strings() -> TestResult {
        let uuid = ProductUuid::new();
        let parsed: ProductUuid = uuid.to_string().parse()?;

        assert_eq!(parsed, uuid);

        Ok(())
    }

    #[test]
    fn new_uuids_are_version_seven() {
        let uuid = CouponUuid::new().into_uuid();

        assert_eq!(uuid.get_version_num(), 7, "expected a UUIDv7");
    }
}
