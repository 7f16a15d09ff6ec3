//! [`Notification`] definitions.

use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{order, user};

#[cfg(doc)]
use common::DateTime;
#[cfg(doc)]
use crate::domain::Order;

/// In-app notification delivered to one of an [`Order`]'s parties.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Notification {
    /// ID of this [`Notification`].
    pub id: Id,

    /// [`user::Id`] of the party this [`Notification`] is addressed to.
    pub recipient: user::Id,

    /// [`Kind`] of this [`Notification`].
    pub kind: Kind,

    /// Short [`Title`] of this [`Notification`].
    pub title: Title,

    /// Human-readable body of this [`Notification`].
    pub message: Text,

    /// [`order::Id`] of the [`Order`] this [`Notification`] is about.
    pub order_id: Option<order::Id>,

    /// Whether the recipient has read this [`Notification`].
    pub read: bool,

    /// [`DateTime`] when this [`Notification`] was created.
    pub created_at: CreationDateTime,
}

impl Notification {
    /// Creates a new unread [`Notification`] addressed to the provided
    /// recipient.
    #[must_use]
    pub fn new(
        recipient: user::Id,
        kind: Kind,
        title: impl Into<Title>,
        message: impl Into<Text>,
        order_id: Option<order::Id>,
    ) -> Self {
        Self {
            id: Id::new(),
            recipient,
            kind,
            title: title.into(),
            message: message.into(),
            order_id,
            read: false,
            created_at: CreationDateTime::now(),
        }
    }
}

/// ID of a [`Notification`].
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
    #[doc = "Kind of a [`Notification`]."]
    enum Kind {
        #[doc = "A fixer accepted the order."]
        OrderAccepted = 1,

        #[doc = "Terms agreed, payment is due."]
        PaymentRequired = 2,

        #[doc = "The customer paid into escrow."]
        PaymentReceived = 3,

        #[doc = "The fixer is on the way."]
        FixerEnRoute = 4,

        #[doc = "The fixer has arrived."]
        FixerArrived = 5,

        #[doc = "The order moved to another status."]
        OrderStatusChanged = 6,

        #[doc = "The escrow was released to the fixer."]
        PaymentReleased = 7,

        #[doc = "The order was completed."]
        OrderCompleted = 8,

        #[doc = "The order was cancelled."]
        OrderCancelled = 9,

        #[doc = "A new chat message arrived."]
        NewMessage = 10,
    }
}

/// Short title of a [`Notification`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, From, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct Title(String);

/// Human-readable body of a [`Notification`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, From, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct Text(String);

/// [`DateTime`] when a [`Notification`] was created.
pub type CreationDateTime = DateTimeOf<(Notification, unit::Creation)>;

/// Party of an [`Order`] a [`Template`] is addressed to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Recipient {
    /// Customer who placed the [`Order`].
    Customer,

    /// Fixer assigned to the [`Order`].
    Fixer,
}

impl Recipient {
    /// Resolves this [`Recipient`] to a concrete [`user::Id`] on the
    /// provided [`Order`].
    ///
    /// [`None`] is returned if the [`Order`] has no such party yet.
    #[must_use]
    pub fn resolve(self, order: &order::Order) -> Option<user::Id> {
        match self {
            Self::Customer => Some(order.customer_id),
            Self::Fixer => order.fixer_id,
        }
    }
}

/// Canned [`Notification`] fired when an [`Order`] enters a [`Status`].
///
/// [`Status`]: order::Status
#[derive(Clone, Copy, Debug)]
pub struct Template {
    /// [`Kind`] of the fired [`Notification`].
    pub kind: Kind,

    /// Title of the fired [`Notification`].
    pub title: &'static str,

    /// Body of the fired [`Notification`].
    pub message: &'static str,

    /// Party the fired [`Notification`] is addressed to.
    pub recipient: Recipient,
}

/// Returns the [`Template`] fired when an [`Order`] enters the provided
/// [`Status`], if any.
///
/// Entering [`Status::Pending`] or [`Status::Negotiating`] fires nothing:
/// creation is silent, and proposals carry their own wording.
///
/// [`Status`]: order::Status
/// [`Status::Negotiating`]: order::Status::Negotiating
/// [`Status::Pending`]: order::Status::Pending
#[must_use]
pub fn on_status(status: order::Status) -> Option<Template> {
    use order::Status as S;
    use Recipient::{Customer, Fixer};

    let template = |kind, title, message, recipient| {
        Some(Template {
            kind,
            title,
            message,
            recipient,
        })
    };

    match status {
        S::Accepted => template(
            Kind::OrderAccepted,
            "Order accepted",
            "A fixer accepted your order and will propose terms shortly.",
            Customer,
        ),
        S::AwaitingPayment => template(
            Kind::PaymentRequired,
            "Payment required",
            "Terms are agreed. Pay into escrow to get the repair going.",
            Customer,
        ),
        S::Ready => template(
            Kind::OrderStatusChanged,
            "Order ready",
            "Your order is scheduled and ready to be carried out.",
            Customer,
        ),
        S::ReadyPaid => template(
            Kind::PaymentReceived,
            "Payment received",
            "The customer paid into escrow. You can head out.",
            Fixer,
        ),
        S::EnRoute => template(
            Kind::FixerEnRoute,
            "Fixer on the way",
            "Your fixer is on the way to the meetup location.",
            Customer,
        ),
        S::Arrived => template(
            Kind::FixerArrived,
            "Fixer arrived",
            "Your fixer has arrived at the meetup location.",
            Customer,
        ),
        S::InProgress => template(
            Kind::OrderStatusChanged,
            "Repair in progress",
            "Your fixer started working on the repair.",
            Customer,
        ),
        S::AwaitingRelease => template(
            Kind::OrderStatusChanged,
            "Work finished",
            "The repair is done. Release the escrow once you are happy.",
            Customer,
        ),
        S::PaidCompleted => template(
            Kind::PaymentReleased,
            "Payment released",
            "The customer released the escrow. The money is yours.",
            Fixer,
        ),
        S::Completed => template(
            Kind::OrderCompleted,
            "Order completed",
            "Your order was completed.",
            Customer,
        ),
        S::Cancelled => template(
            Kind::OrderCancelled,
            "Order cancelled",
            "The customer cancelled the order.",
            Fixer,
        ),
        S::Escalated => template(
            Kind::OrderStatusChanged,
            "Order escalated",
            "The customer opened a dispute. Support will reach out.",
            Fixer,
        ),
        S::Pending | S::Negotiating => None,
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::order::Status;

    use super::{on_status, Kind, Recipient};

    #[test]
    fn silent_statuses_fire_nothing() {
        assert!(on_status(Status::Pending).is_none());
        assert!(on_status(Status::Negotiating).is_none());
    }

    #[test]
    fn payment_milestones_notify_the_right_party() {
        let paid = on_status(Status::ReadyPaid).unwrap();
        assert_eq!(paid.kind, Kind::PaymentReceived);
        assert_eq!(paid.recipient, Recipient::Fixer);

        let due = on_status(Status::AwaitingPayment).unwrap();
        assert_eq!(due.kind, Kind::PaymentRequired);
        assert_eq!(due.recipient, Recipient::Customer);

        let released = on_status(Status::PaidCompleted).unwrap();
        assert_eq!(released.kind, Kind::PaymentReleased);
        assert_eq!(released.recipient, Recipient::Fixer);
    }
}
