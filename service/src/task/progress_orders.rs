//! [`ProgressOrders`] [`Task`].

use std::{collections::HashMap, convert::Infallible, error::Error, time};

use common::{
    operations::{By, Perform, Select, Start},
    DateTime,
};
use derive_more::{Display, Error as StdError, From};
use tokio::{sync::Mutex, time::interval};
use tracerr::Traced;
use tracing as log;

use crate::{
    command::{
        update_order::{self, Notify, UpdateOrder},
        Command,
    },
    domain::{order, Order},
    infra::{database, Database},
    read, Service,
};

use super::Task;

/// Configuration for [`ProgressOrders`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`Order`] progression checks.
    pub tick: time::Duration,
}

/// [`Task`] for advancing [`Order`]s whose [`order::Status`] moves on its own
/// once a dwell time elapses.
#[derive(Debug)]
pub struct ProgressOrders<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// Transitions planned on previous runs.
    schedule: Mutex<Schedule>,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<ProgressOrders<Self>, Config>>> for Service<Db>
where
    ProgressOrders<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ProgressOrders<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = ProgressOrders {
            config,
            schedule: Mutex::new(Schedule::default()),
            service: self.clone(),
        };

        let mut interval = interval(task.config.tick);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::ProgressOrders` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for ProgressOrders<Service<Db>>
where
    Db: Database<
            Select<By<Vec<Order>, read::order::All>>,
            Ok = Vec<Order>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Order>, order::Id>>,
            Ok = Option<Order>,
            Err = Traced<database::Error>,
        >,
    Service<Db>: Command<
        UpdateOrder,
        Ok = Order,
        Err = Traced<update_order::ExecutionError>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let now = DateTime::now();
        let orders = self
            .service
            .database()
            .execute(Select(By::new(read::order::All)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let due = self.schedule.lock().await.plan(&orders, now);

        for Transition { order_id, from, to } in due {
            let Some(mut order) = self
                .service
                .database()
                .execute(Select(By::<Option<Order>, _>::new(order_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
            else {
                continue;
            };
            // A command may have moved the `Order` since it was planned.
            if order.status != from {
                continue;
            }

            order.status = to;
            if to == order::Status::Completed {
                if order.final_price.is_none() {
                    order.final_price =
                        Some(order.price_estimate.midpoint());
                }
                order.completed_at = Some(now.coerce());
            }
            log::debug!("`Order(id: {order_id})` advances to `{to}`");
            let _ = self
                .service
                .execute(UpdateOrder {
                    order,
                    notify: Notify::Auto,
                })
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        Ok(())
    }
}

/// Error of [`ProgressOrders`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Persisting an advanced [`Order`] failed.
    #[display("persisting the `Order` failed: {_0}")]
    Update(update_order::ExecutionError),
}

/// Planner of dwell-timed [`order::Status`] transitions.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
    /// Pending transitions, keyed by the [`Order`] they were planned for.
    pending: HashMap<order::Id, Entry>,
}

/// Pending [`Schedule`] entry.
#[derive(Clone, Copy, Debug)]
struct Entry {
    /// [`order::Status`] the transition was planned from.
    from: order::Status,

    /// [`order::Status`] to transition into.
    to: order::Status,

    /// Moment the transition becomes due.
    due: DateTime,
}

/// Due transition planned by a [`Schedule`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Transition {
    /// [`order::Id`] of the [`Order`] to advance.
    pub order_id: order::Id,

    /// Expected current [`order::Status`] of the [`Order`].
    pub from: order::Status,

    /// [`order::Status`] to advance the [`Order`] into.
    pub to: order::Status,
}

impl Schedule {
    /// Plans transitions for the provided [`Order`]s, returning the ones due
    /// at the `now` moment.
    ///
    /// An [`Order`] whose [`order::Status`] changed since its transition was
    /// planned has the dwell timer restarted, or the plan dropped entirely
    /// once no automatic transition applies anymore.
    pub fn plan(
        &mut self,
        orders: &[Order],
        now: DateTime,
    ) -> Vec<Transition> {
        self.pending.retain(|id, entry| {
            orders.iter().any(|o| o.id == *id && o.status == entry.from)
        });

        let mut due = Vec::new();
        for order in orders {
            let Some((to, dwell)) = order.status.auto_advance() else {
                continue;
            };
            let entry =
                self.pending.entry(order.id).or_insert_with(|| Entry {
                    from: order.status,
                    to,
                    due: now + dwell,
                });
            if entry.due <= now {
                due.push(Transition {
                    order_id: order.id,
                    from: entry.from,
                    to: entry.to,
                });
            }
        }
        for transition in &due {
            let _ = self.pending.remove(&transition.order_id);
        }
        due
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{money::Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{order, user, Order};

    use super::{Schedule, Transition};

    fn order(status: order::Status) -> Order {
        let eur =
            |amount: i64| Money::new(Decimal::from(amount), Currency::Eur);
        Order {
            id: order::Id::new(),
            customer_id: user::Id::new(),
            fixer_id: Some(user::Id::new()),
            category: order::Category::Tech,
            subcategory: "Laptop".into(),
            issue: order::Issue::new("Stuck keys").unwrap(),
            description: order::Description::new(
                "Half the keyboard stopped responding.",
            )
            .unwrap(),
            photo: None,
            delivery: order::Delivery::Shipping {
                address: order::ShippingAddress::new(
                    "Residence Hall 3, Room 12, 64289 Darmstadt",
                )
                .unwrap(),
            },
            appointment_at: None,
            price_estimate: order::PriceEstimate::new(eur(40), eur(60))
                .unwrap(),
            final_price: None,
            total_price: None,
            status,
            negotiation: None,
            payment: None,
            rating: None,
            review: None,
            created_at: order::CreationDateTime::now(),
            updated_at: order::UpdateDateTime::now(),
            completed_at: None,
        }
    }

    #[test]
    fn waits_out_the_dwell_time() {
        let mut schedule = Schedule::default();
        let order = order(order::Status::EnRoute);
        let now = DateTime::now();

        assert_eq!(schedule.plan(&[order.clone()], now), vec![]);
        assert_eq!(
            schedule.plan(&[order.clone()], now + Duration::from_secs(19)),
            vec![],
        );
        assert_eq!(
            schedule.plan(&[order.clone()], now + Duration::from_secs(20)),
            vec![Transition {
                order_id: order.id,
                from: order::Status::EnRoute,
                to: order::Status::Arrived,
            }],
        );
        // A fired plan is not repeated: the timer starts over.
        assert_eq!(
            schedule.plan(&[order], now + Duration::from_secs(21)),
            vec![],
        );
    }

    #[test]
    fn cancelling_blocks_a_planned_advance() {
        let mut schedule = Schedule::default();
        let mut order = order(order::Status::Accepted);
        let now = DateTime::now();

        assert_eq!(schedule.plan(&[order.clone()], now), vec![]);

        order.status = order::Status::Cancelled;
        assert_eq!(
            schedule.plan(&[order.clone()], now + Duration::from_secs(15)),
            vec![],
        );
        assert_eq!(
            schedule.plan(&[order], now + Duration::from_secs(60)),
            vec![],
        );
    }

    #[test]
    fn restarts_the_timer_when_the_status_moves() {
        let mut schedule = Schedule::default();
        let mut order = order(order::Status::EnRoute);
        let now = DateTime::now();

        assert_eq!(schedule.plan(&[order.clone()], now), vec![]);

        order.status = order::Status::Arrived;
        assert_eq!(
            schedule.plan(&[order.clone()], now + Duration::from_secs(25)),
            vec![],
        );
        assert_eq!(
            schedule.plan(&[order.clone()], now + Duration::from_secs(35)),
            vec![Transition {
                order_id: order.id,
                from: order::Status::Arrived,
                to: order::Status::InProgress,
            }],
        );
    }

    #[test]
    fn forgets_orders_that_disappear() {
        let mut schedule = Schedule::default();
        let order = order(order::Status::InProgress);
        let now = DateTime::now();

        assert_eq!(schedule.plan(&[order], now), vec![]);
        assert_eq!(
            schedule.plan(&[], now + Duration::from_secs(30)),
            vec![],
        );
    }
}
