//! [`Command`] for agreeing to the terms on the table.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{order, user, Order},
    infra::{database, Database},
    Service,
};

use super::{
    update_order::{self, Notify, UpdateOrder},
    Command,
};

/// [`Command`] for agreeing to the terms on the table.
///
/// Only the counter-party may agree: the party who put the current terms
/// on the table cannot accept its own offer. Agreement locks the terms
/// in, copies the agreed price, meetup zone and date onto the [`Order`],
/// and moves it into [`AwaitingPayment`].
///
/// [`AwaitingPayment`]: order::Status::AwaitingPayment
#[derive(Clone, Copy, Debug)]
pub struct AcceptProposal {
    /// [`order::Id`] of the [`Order`] being negotiated.
    pub order_id: order::Id,

    /// [`user::Id`] of the agreeing party.
    pub accepter: user::Id,
}

impl<Db> Command<AcceptProposal> for Service<Db>
where
    Db: Database<
        Select<By<Option<Order>, order::Id>>,
        Ok = Option<Order>,
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
        cmd: AcceptProposal,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AcceptProposal { order_id, accepter } = cmd;

        let mut order = self
            .database()
            .execute(Select(By::<Option<Order>, _>::new(order_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(order_id))
            .map_err(tracerr::wrap!())?;

        if !order.is_party(accepter) {
            return Err(tracerr::new!(E::NotParty(accepter)));
        }

        let Some(negotiation) = order.negotiation.as_mut() else {
            return Err(tracerr::new!(E::NothingProposed));
        };
        if negotiation.all_confirmed {
            return Err(tracerr::new!(E::AlreadyAgreed));
        }
        if negotiation.proposed_by == accepter {
            return Err(tracerr::new!(E::OwnProposal));
        }

        negotiation.all_confirmed = true;
        order.final_price = Some(negotiation.price.proposed);
        order.delivery = order::Delivery::Meetup {
            zone: negotiation.meetup.zone.clone(),
        };
        order.appointment_at = Some(negotiation.meetup.at.coerce());
        order.status = order::Status::AwaitingPayment;

        self.execute(UpdateOrder {
            order,
            notify: Notify::Auto,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`AcceptProposal`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Persisting the agreed [`Order`] failed.
    #[display("persisting the `Order` failed: {_0}")]
    Update(update_order::ExecutionError),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),

    /// Accepter is not a party of the [`Order`].
    #[display("`User(id: {_0})` is not a party of the `Order`")]
    #[from(ignore)]
    NotParty(#[error(not(source))] user::Id),

    /// [`Order`] has no terms on the table.
    #[display("`Order` has no proposed terms")]
    NothingProposed,

    /// Terms are already agreed on.
    #[display("`Order` terms are already agreed on")]
    AlreadyAgreed,

    /// Parties cannot accept terms they proposed themselves.
    #[display("cannot accept own proposal")]
    OwnProposal,
}
