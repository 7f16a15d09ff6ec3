//! [`Status`] of an [`Order`] and its progression rules.

use std::time::Duration;

use common::define_kind;

#[cfg(doc)]
use super::Order;

define_kind! {
    #[doc = "Lifecycle status of an [`Order`]."]
    enum Status {
        #[doc = "Created by a customer, visible to fixers, unassigned."]
        Pending = 1,

        #[doc = "Claimed by a fixer, terms not negotiated yet."]
        Accepted = 2,

        #[doc = "Terms proposal on the table, awaiting agreement."]
        Negotiating = 3,

        #[doc = "Terms agreed, waiting for the customer to pay."]
        AwaitingPayment = 4,

        #[doc = "Scheduled and ready to be carried out."]
        Ready = 5,

        #[doc = "Paid into escrow, the fixer may start moving."]
        ReadyPaid = 6,

        #[doc = "Fixer is on the way to the meetup location."]
        EnRoute = 7,

        #[doc = "Fixer has arrived at the meetup location."]
        Arrived = 8,

        #[doc = "Repair work is being performed."]
        InProgress = 9,

        #[doc = "Work done, waiting for the customer to release escrow."]
        AwaitingRelease = 10,

        #[doc = "Escrow released to the fixer. Terminal."]
        PaidCompleted = 11,

        #[doc = "Finished outside the escrow flow. Terminal."]
        Completed = 12,

        #[doc = "Cancelled by the customer. Terminal."]
        Cancelled = 13,

        #[doc = "Disputed and handed over to support. Terminal."]
        Escalated = 14,
    }
}

impl Status {
    /// Indicates whether this [`Status`] is terminal.
    ///
    /// No transition, manual or automatic, ever leaves a terminal
    /// [`Status`].
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::PaidCompleted
                | Self::Completed
                | Self::Cancelled
                | Self::Escalated,
        )
    }

    /// Indicates whether an [`Order`] in this [`Status`] may still be
    /// cancelled by its customer.
    #[must_use]
    pub fn is_cancellable(self) -> bool {
        !self.is_terminal()
    }

    /// Returns the next [`Status`] a fixer may manually advance to from
    /// this one, if any.
    #[must_use]
    pub fn manual_next(self) -> Option<Self> {
        match self {
            Self::ReadyPaid => Some(Self::EnRoute),
            Self::EnRoute => Some(Self::Arrived),
            Self::Arrived => Some(Self::InProgress),
            Self::InProgress => Some(Self::AwaitingRelease),
            Self::Pending
            | Self::Accepted
            | Self::Negotiating
            | Self::AwaitingPayment
            | Self::Ready
            | Self::AwaitingRelease
            | Self::PaidCompleted
            | Self::Completed
            | Self::Cancelled
            | Self::Escalated => None,
        }
    }

    /// Returns the [`Status`] this one advances to on its own, along with
    /// the delay after which the transition fires, if any.
    ///
    /// The delay counts from the moment an [`Order`] entered this
    /// [`Status`].
    #[must_use]
    pub fn auto_advance(self) -> Option<(Self, Duration)> {
        match self {
            Self::Accepted => Some((Self::EnRoute, Duration::from_secs(15))),
            Self::Ready => Some((Self::EnRoute, Duration::from_secs(5))),
            Self::EnRoute => Some((Self::Arrived, Duration::from_secs(20))),
            Self::Arrived => {
                Some((Self::InProgress, Duration::from_secs(10)))
            }
            Self::InProgress => {
                Some((Self::Completed, Duration::from_secs(30)))
            }
            Self::Pending
            | Self::Negotiating
            | Self::AwaitingPayment
            | Self::ReadyPaid
            | Self::AwaitingRelease
            | Self::PaidCompleted
            | Self::Completed
            | Self::Cancelled
            | Self::Escalated => None,
        }
    }
}
