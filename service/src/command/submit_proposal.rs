//! [`Command`] for proposing or countering [`Order`] terms.

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        notification,
        order::{self, negotiation},
        user, Notification, Order,
    },
    infra::{database, Database},
    Service,
};

use super::{
    update_order::{self, Notify, UpdateOrder},
    Command,
};

/// [`Command`] for proposing or countering [`Order`] terms.
///
/// The first proposal moves the [`Order`] into [`Negotiating`]; each
/// counter-proposal replaces the terms on the table and keeps it there.
///
/// [`Negotiating`]: order::Status::Negotiating
#[derive(Clone, Debug)]
pub struct SubmitProposal {
    /// [`order::Id`] of the [`Order`] being negotiated.
    pub order_id: order::Id,

    /// [`user::Id`] of the proposing party.
    pub proposer: user::Id,

    /// Proposed terms.
    pub draft: negotiation::Draft,
}

impl<Db> Command<SubmitProposal> for Service<Db>
where
    Db: Database<
            Select<By<Option<Order>, order::Id>>,
            Ok = Option<Order>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<Notification>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
    Self: Command<
        UpdateOrder,
        Ok = Order,
        Err = Traced<update_order::ExecutionError>,
    >,
{
    type Ok = Order;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitProposal,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitProposal {
            order_id,
            proposer,
            draft,
        } = cmd;

        let mut order = self
            .database()
            .execute(Select(By::<Option<Order>, _>::new(order_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(order_id))
            .map_err(tracerr::wrap!())?;

        if !matches!(
            order.status,
            order::Status::Accepted | order::Status::Negotiating,
        ) {
            return Err(tracerr::new!(E::NotNegotiable(order.status)));
        }
        if !order.is_party(proposer) {
            return Err(tracerr::new!(E::NotParty(proposer)));
        }

        let previous = order.negotiation.take();
        let terms = draft
            .propose(proposer, previous.as_ref())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let counter_party = order.counterparty_of(proposer);
        let (title, message) = if previous.is_some() {
            (
                "Counter-proposal received",
                "The other party countered the proposed terms.",
            )
        } else {
            (
                "Terms proposed",
                "The other party proposed terms for your order.",
            )
        };

        order.negotiation = Some(terms);
        order.status = order::Status::Negotiating;

        // The canned status notification is suppressed: proposals carry
        // their own wording distinguishing first offers from counters.
        let order = self
            .execute(UpdateOrder {
                order,
                notify: Notify::Suppress,
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if let Some(to) = counter_party {
            self.database()
                .execute(Insert(Notification::new(
                    to,
                    notification::Kind::OrderStatusChanged,
                    title,
                    message,
                    Some(order.id),
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        Ok(order)
    }
}

/// Error of [`SubmitProposal`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Persisting the negotiated [`Order`] failed.
    #[display("persisting the `Order` failed: {_0}")]
    Update(update_order::ExecutionError),

    /// Proposed terms are incomplete or invalid.
    #[display("invalid terms: {_0}")]
    InvalidDraft(negotiation::InvalidDraft),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),

    /// [`Order`] is past negotiation.
    #[display("`Order` terms cannot be proposed in status `{_0}`")]
    #[from(ignore)]
    NotNegotiable(#[error(not(source))] order::Status),

    /// Proposer is not a party of the [`Order`].
    #[display("`User(id: {_0})` is not a party of the `Order`")]
    #[from(ignore)]
    NotParty(#[error(not(source))] user::Id),
}
