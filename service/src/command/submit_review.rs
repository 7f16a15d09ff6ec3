//! [`Command`] for reviewing a completed [`Order`].

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

/// [`Command`] for reviewing a completed [`Order`].
///
/// One review per [`Order`], by its customer only.
#[derive(Clone, Debug)]
pub struct SubmitReview {
    /// [`order::Id`] of the [`Order`] being reviewed.
    pub order_id: order::Id,

    /// [`user::Id`] of the reviewing customer.
    pub reviewer: user::Id,

    /// Star rating.
    pub rating: order::Rating,

    /// Optional review text.
    pub review: Option<order::Review>,
}

impl<Db> Command<SubmitReview> for Service<Db>
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
        cmd: SubmitReview,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitReview {
            order_id,
            reviewer,
            rating,
            review,
        } = cmd;

        let mut order = self
            .database()
            .execute(Select(By::<Option<Order>, _>::new(order_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OrderNotExists(order_id))
            .map_err(tracerr::wrap!())?;

        if !order.is_customer(reviewer) {
            return Err(tracerr::new!(E::NotCustomer(reviewer)));
        }
        if !matches!(
            order.status,
            order::Status::Completed | order::Status::PaidCompleted,
        ) {
            return Err(tracerr::new!(E::NotCompleted(order.status)));
        }
        if order.rating.is_some() {
            return Err(tracerr::new!(E::AlreadyReviewed));
        }

        order.rating = Some(rating);
        order.review = review;

        self.execute(UpdateOrder {
            order,
            notify: Notify::Auto,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`SubmitReview`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Persisting the reviewed [`Order`] failed.
    #[display("persisting the `Order` failed: {_0}")]
    Update(update_order::ExecutionError),

    /// [`Order`] doesn't exist.
    #[display("`Order(id: {_0})` does not exist")]
    #[from(ignore)]
    OrderNotExists(#[error(not(source))] order::Id),

    /// Reviewer is not the customer of the [`Order`].
    #[display("`User(id: {_0})` is not the customer of the `Order`")]
    #[from(ignore)]
    NotCustomer(#[error(not(source))] user::Id),

    /// [`Order`] is not completed yet.
    #[display("`Order` cannot be reviewed in status `{_0}`")]
    #[from(ignore)]
    NotCompleted(#[error(not(source))] order::Status),

    /// [`Order`] was already reviewed.
    #[display("`Order` is already reviewed")]
    AlreadyReviewed,
}
