//! [`Command`] for placing a new [`Order`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{order, user, Order},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for placing a new [`Order`].
///
/// The [`Order`] starts out [`Pending`] and unassigned.
///
/// [`Pending`]: order::Status::Pending
#[derive(Clone, Debug)]
pub struct CreateOrder {
    /// [`user::Id`] of the customer placing the [`Order`].
    pub customer_id: user::Id,

    /// Category of the repair.
    pub category: order::Category,

    /// Free-form subcategory of the repair.
    pub subcategory: order::Subcategory,

    /// Short summary of what is broken.
    pub issue: order::Issue,

    /// Detailed description of the issue.
    pub description: order::Description,

    /// Reference to an uploaded photo of the item, if any.
    pub photo: Option<order::PhotoRef>,

    /// How the item changes hands.
    pub delivery: order::Delivery,

    /// Preferred appointment date, if any.
    pub appointment_at: Option<order::AppointmentDateTime>,

    /// Price range the customer expects.
    pub price_estimate: order::PriceEstimate,
}

impl<Db> Command<CreateOrder> for Service<Db>
where
    Db: Database<Insert<Order>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Order;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateOrder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateOrder {
            customer_id,
            category,
            subcategory,
            issue,
            description,
            photo,
            delivery,
            appointment_at,
            price_estimate,
        } = cmd;

        if !self.users().contains(customer_id) {
            return Err(tracerr::new!(E::CustomerNotExists(customer_id)));
        }

        let now = order::CreationDateTime::now();
        let order = Order {
            id: order::Id::new(),
            customer_id,
            fixer_id: None,
            category,
            subcategory,
            issue,
            description,
            photo,
            delivery,
            appointment_at,
            price_estimate,
            final_price: None,
            total_price: None,
            status: order::Status::Pending,
            negotiation: None,
            payment: None,
            rating: None,
            review: None,
            created_at: now,
            updated_at: now.coerce(),
            completed_at: None,
        };

        self.database()
            .execute(Insert(order.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(order)
    }
}

/// Error of [`CreateOrder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Customer doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    CustomerNotExists(#[error(not(source))] user::Id),
}
