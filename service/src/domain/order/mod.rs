//! [`Order`] definitions.

pub mod negotiation;
pub mod payment;
mod status;

use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{user, SafeZone};

pub use self::{
    negotiation::Negotiation, payment::Payment, status::Status,
};

#[cfg(doc)]
use common::DateTime;

/// Repair order placed by a customer.
///
/// The single authoritative record of the whole lifecycle: who the parties
/// are, what is being repaired, the negotiated terms, the escrowed payment
/// and the final outcome.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Order {
    /// ID of this [`Order`].
    pub id: Id,

    /// [`user::Id`] of the customer who placed this [`Order`].
    pub customer_id: user::Id,

    /// [`user::Id`] of the fixer who accepted this [`Order`], if any.
    pub fixer_id: Option<user::Id>,

    /// [`Category`] of the repair.
    pub category: Category,

    /// Free-form subcategory of the repair.
    pub subcategory: Subcategory,

    /// Short summary of the [`Issue`].
    pub issue: Issue,

    /// Detailed [`Description`] of the issue.
    pub description: Description,

    /// Reference to an uploaded photo of the item, if any.
    pub photo: Option<PhotoRef>,

    /// How the item changes hands.
    pub delivery: Delivery,

    /// Customer's preferred appointment [`DateTime`], if any.
    pub appointment_at: Option<AppointmentDateTime>,

    /// Initial [`PriceEstimate`] given by the customer.
    pub price_estimate: PriceEstimate,

    /// Price agreed via negotiation or synthesized on auto-completion.
    pub final_price: Option<Money>,

    /// Total amount the customer was charged, fees included.
    pub total_price: Option<Money>,

    /// Current [`Status`] of this [`Order`].
    pub status: Status,

    /// Terms [`Negotiation`], once a fixer has proposed any.
    pub negotiation: Option<Negotiation>,

    /// Escrowed [`Payment`], once the customer has paid.
    pub payment: Option<Payment>,

    /// [`Rating`] left by the customer, if any.
    pub rating: Option<Rating>,

    /// [`Review`] text left by the customer, if any.
    pub review: Option<Review>,

    /// [`DateTime`] when this [`Order`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Order`] was updated last time.
    pub updated_at: UpdateDateTime,

    /// [`DateTime`] when this [`Order`] reached a completed [`Status`].
    pub completed_at: Option<CompletionDateTime>,
}

impl Order {
    /// Indicates whether the [`User`] with the provided [`user::Id`] is
    /// the customer of this [`Order`].
    ///
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn is_customer(&self, user: user::Id) -> bool {
        self.customer_id == user
    }

    /// Indicates whether the [`User`] with the provided [`user::Id`] is
    /// the assigned fixer of this [`Order`].
    ///
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn is_fixer(&self, user: user::Id) -> bool {
        self.fixer_id == Some(user)
    }

    /// Indicates whether the [`User`] with the provided [`user::Id`] is a
    /// party of this [`Order`].
    ///
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn is_party(&self, user: user::Id) -> bool {
        self.is_customer(user) || self.is_fixer(user)
    }

    /// Returns the [`user::Id`] of the counter-party of the [`User`] with
    /// the provided [`user::Id`], if there is one.
    ///
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn counterparty_of(&self, user: user::Id) -> Option<user::Id> {
        if self.is_customer(user) {
            self.fixer_id
        } else if self.is_fixer(user) {
            Some(self.customer_id)
        } else {
            None
        }
    }

    /// Returns the price payments are based on: the negotiated final
    /// price, or the upper bound of the [`PriceEstimate`] if no price was
    /// ever agreed.
    #[must_use]
    pub fn base_price(&self) -> Money {
        self.final_price.unwrap_or(self.price_estimate.max)
    }

    /// Indicates whether this [`Order`] has proposed terms its parties
    /// have not agreed on yet.
    #[must_use]
    pub fn has_pending_terms(&self) -> bool {
        self.negotiation.as_ref().is_some_and(|n| !n.all_confirmed)
    }
}

/// ID of an [`Order`].
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

define_kind! {
    #[doc = "Category of a repair."]
    enum Category {
        #[doc = "Phones, laptops and other electronics."]
        Tech = 1,

        #[doc = "Bikes, scooters and other mobility gear."]
        Mobility = 2,

        #[doc = "Furniture and dorm equipment."]
        Dorm = 3,
    }
}

/// Free-form subcategory of a repair.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, From, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct Subcategory(String);

/// Short summary of what is broken.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Issue(String);

impl Issue {
    /// Creates a new [`Issue`] if the given `issue` is valid.
    #[must_use]
    pub fn new(issue: impl Into<String>) -> Option<Self> {
        let issue = issue.into();
        let trimmed = issue.trim();
        (!trimmed.is_empty() && trimmed.len() <= 256)
            .then(|| Self(trimmed.to_owned()))
    }
}

/// Detailed description of an issue.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        let trimmed = description.trim();
        (!trimmed.is_empty() && trimmed.len() <= 4096)
            .then(|| Self(trimmed.to_owned()))
    }
}

/// Reference to an uploaded photo.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, From, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct PhotoRef(String);

/// How the item being repaired changes hands.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "type")]
pub enum Delivery {
    /// In-person handoff at a [`SafeZone`].
    Meetup {
        /// [`SafeZone`] chosen at creation time.
        zone: SafeZone,
    },

    /// Item is shipped to the fixer.
    Shipping {
        /// Address the item travels between.
        address: ShippingAddress,
    },
}

/// Postal address used for [`Delivery::Shipping`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct ShippingAddress(String);

impl ShippingAddress {
    /// Creates a new [`ShippingAddress`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        let trimmed = address.trim();
        (trimmed.len() >= 10 && trimmed.len() <= 512)
            .then(|| Self(trimmed.to_owned()))
    }
}

/// Price range a customer expects the repair to cost.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PriceEstimate {
    /// Lower bound of the estimate.
    pub min: Money,

    /// Upper bound of the estimate.
    pub max: Money,
}

impl PriceEstimate {
    /// Creates a new [`PriceEstimate`] if the given bounds form a valid
    /// range.
    #[must_use]
    pub fn new(min: Money, max: Money) -> Option<Self> {
        (min.currency == max.currency
            && min.is_positive()
            && min.amount <= max.amount)
            .then_some(Self { min, max })
    }

    /// Returns the midpoint of this [`PriceEstimate`], rounded to whole
    /// units with midpoints rounded away from zero.
    #[must_use]
    pub fn midpoint(&self) -> Money {
        Money::new(
            (self.min.amount + self.max.amount) / rust_decimal::Decimal::TWO,
            self.min.currency,
        )
        .rounded(0)
    }
}

/// Rating left on an [`Order`] by its customer, from `1` to `5` stars.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Into, PartialEq, Serialize,
)]
pub struct Rating(u8);

impl Rating {
    /// Creates a new [`Rating`] if the given `stars` are in range.
    #[must_use]
    pub fn new(stars: u8) -> Option<Self> {
        (1..=5).contains(&stars).then_some(Self(stars))
    }
}

/// Review text left on an [`Order`] by its customer.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Review(String);

impl Review {
    /// Creates a new [`Review`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        (!trimmed.is_empty() && trimmed.len() <= 2048)
            .then(|| Self(trimmed.to_owned()))
    }
}

/// [`DateTime`] of an appointment preferred by an [`Order`]'s customer.
pub type AppointmentDateTime = DateTimeOf<(Order, unit::Appointment)>;

/// [`DateTime`] when an [`Order`] was created.
pub type CreationDateTime = DateTimeOf<(Order, unit::Creation)>;

/// [`DateTime`] when an [`Order`] was updated last time.
pub type UpdateDateTime = DateTimeOf<(Order, unit::Update)>;

/// [`DateTime`] when an [`Order`] was completed.
pub type CompletionDateTime = DateTimeOf<(Order, unit::Completion)>;
