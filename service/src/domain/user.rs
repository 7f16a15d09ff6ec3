//! [`User`] definitions.

use std::collections::HashMap;

use common::{unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform user.
///
/// The core never stores denormalized [`User`] data inside other entities,
/// only [`Id`]s resolved through a [`Directory`].
#[derive(Clone, Debug, From)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// Average [`Rating`] of this [`User`] as a fixer.
    pub rating: Option<Rating>,

    /// Number of jobs this [`User`] completed as a fixer.
    pub completed_jobs: Option<u32>,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl std::str::FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Average rating of a [`User`], from `0` to `5`.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub struct Rating(Decimal);

impl Rating {
    /// Creates a new [`Rating`] if the given `value` is in range.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (value >= Decimal::ZERO && value <= Decimal::from(5))
            .then_some(Self(value))
    }
}

/// Read-only directory of known [`User`]s.
///
/// Constructed once per process and injected into the service.
#[derive(Clone, Debug, Default)]
pub struct Directory(HashMap<Id, User>);

impl Directory {
    /// Creates a new [`Directory`] from the provided [`User`]s.
    #[must_use]
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self(users.into_iter().map(|u| (u.id, u)).collect())
    }

    /// Looks up a [`User`] by its [`Id`].
    #[must_use]
    pub fn get(&self, id: Id) -> Option<&User> {
        self.0.get(&id)
    }

    /// Indicates whether a [`User`] with the provided [`Id`] is known.
    #[must_use]
    pub fn contains(&self, id: Id) -> bool {
        self.0.contains_key(&id)
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;
