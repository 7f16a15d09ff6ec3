//! [`Command`] for paying an [`Order`] into escrow.

use std::time;

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        order::{self, payment},
        user, Order,
    },
    infra::{database, Database},
    Service,
};

use super::{
    update_order::{self, Notify, UpdateOrder},
    Command,
};

/// Configuration of the [`SubmitPayment`] [`Command`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Simulated processing delay of the payment provider.
    pub processing_delay: time::Duration,
}

/// [`Command`] for paying an [`Order`] into escrow.
///
/// Validates the payment method, simulates provider processing, and holds
/// the base price in escrow. The total charged on top includes the
/// platform fees.
#[derive(Clone, Debug)]
pub struct SubmitPayment {
    /// [`order::Id`] of the [`Order`] being paid.
    pub order_id: order::Id,

    /// [`user::Id`] of the paying customer.
    pub payer: user::Id,

    /// Payment method to charge.
    pub method: payment::Method,
}

impl<Db> Command<SubmitPayment> for Service<Db>
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
        cmd: SubmitPayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitPayment {
            order_id,
            payer,
            method,
        } = cmd;

        let order = self
            .database()
            .execute(Select(By::<Option<Order>, _>::new(order_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(order_id))
            .map_err(tracerr::wrap!())?;

        if !order.is_customer(payer) {
            return Err(tracerr::new!(E::NotCustomer(payer)));
        }
        if order.status != order::Status::AwaitingPayment {
            return Err(tracerr::new!(E::NotPayable(order.status)));
        }
        method.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        tokio::time::sleep(self.config().submit_payment.processing_delay)
            .await;

        // The order may have moved on while the provider was processing.
        let mut order = self
            .database()
            .execute(Select(By::<Option<Order>, _>::new(order_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(order_id))
            .map_err(tracerr::wrap!())?;
        if order.status != order::Status::AwaitingPayment {
            return Err(tracerr::new!(E::NotPayable(order.status)));
        }

        let fees = payment::Fees::on(order.base_price());
        order.payment = Some(payment::Payment {
            status: payment::Status::Escrowed,
            escrowed: fees.base,
            paid_at: payment::PaymentDateTime::now(),
            released_at: None,
        });
        order.total_price = Some(fees.total);
        order.status = order::Status::ReadyPaid;

        self.execute(UpdateOrder {
            order,
            notify: Notify::Auto,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`SubmitPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Persisting the paid [`Order`] failed.
    #[display("persisting the `Order` failed: {_0}")]
    Update(update_order::ExecutionError),

    /// Payment method is malformed.
    #[display("invalid payment method: {_0}")]
    InvalidMethod(payment::InvalidMethod),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),

    /// Payer is not the customer of the [`Order`].
    #[display("`User(id: {_0})` is not the customer of the `Order`")]
    #[from(ignore)]
    NotCustomer(#[error(not(source))] user::Id),

    /// [`Order`] is not awaiting payment.
    #[display("`Order` cannot be paid in status `{_0}`")]
    #[from(ignore)]
    NotPayable(#[error(not(source))] order::Status),
}
