//! [`Command`] definition.

pub mod accept_order;
pub mod accept_proposal;
pub mod advance_order;
pub mod cancel_order;
pub mod create_order;
pub mod dispute_escrow;
pub mod mark_all_notifications_read;
pub mod mark_messages_read;
pub mod mark_notification_read;
pub mod release_escrow;
pub mod send_message;
pub mod submit_payment;
pub mod submit_proposal;
pub mod submit_review;
pub mod update_order;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    accept_order::AcceptOrder, accept_proposal::AcceptProposal,
    advance_order::AdvanceOrder, cancel_order::CancelOrder,
    create_order::CreateOrder, dispute_escrow::DisputeEscrow,
    mark_all_notifications_read::MarkAllNotificationsRead,
    mark_messages_read::MarkMessagesRead,
    mark_notification_read::MarkNotificationRead,
    release_escrow::ReleaseEscrow, send_message::SendMessage,
    submit_payment::SubmitPayment, submit_proposal::SubmitProposal,
    submit_review::SubmitReview, update_order::UpdateOrder,
};

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        money::Currency,
        operations::{By, Select},
        Money,
    };
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            notification,
            order::{self, negotiation, payment},
            user, Notification, Order,
        },
        infra::database::Json,
        query, read, task, Config, Service,
    };

    use super::*;

    fn eur(s: &str) -> Money {
        Money::new(s.parse().unwrap(), Currency::Eur)
    }

    fn service() -> (Service<Json>, user::Id, user::Id) {
        let customer = user::Id::new();
        let fixer = user::Id::new();
        let users = user::Directory::new([
            user::User {
                id: customer,
                name: user::Name::new("Alice Carter").unwrap(),
                rating: None,
                completed_jobs: None,
                created_at: user::CreationDateTime::now(),
            },
            user::User {
                id: fixer,
                name: user::Name::new("Bob Keller").unwrap(),
                rating: user::Rating::new(Decimal::from(5)),
                completed_jobs: Some(12),
                created_at: user::CreationDateTime::now(),
            },
        ]);
        let service = Service {
            config: Config {
                submit_payment: submit_payment::Config {
                    processing_delay: Duration::ZERO,
                },
                progress_orders: task::progress_orders::Config {
                    tick: Duration::from_millis(50),
                },
                sync_collections: task::sync_collections::Config {
                    interval: Duration::from_secs(2),
                },
            },
            database: Json::in_memory(),
            users,
        };
        (service, customer, fixer)
    }

    async fn place(service: &Service<Json>, customer: user::Id) -> Order {
        service
            .execute(CreateOrder {
                customer_id: customer,
                category: order::Category::Tech,
                subcategory: "Phone".into(),
                issue: order::Issue::new("Cracked screen").unwrap(),
                description: order::Description::new(
                    "Display shattered after a fall.",
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
                price_estimate: order::PriceEstimate::new(
                    eur("40"),
                    eur("60"),
                )
                .unwrap(),
            })
            .await
            .unwrap()
    }

    fn draft(price: &str) -> negotiation::Draft {
        negotiation::Draft {
            price: Some(eur(price)),
            parts: Some(negotiation::PartsResponsibility::Fixer),
            notes: None,
            zone: Some("sz-1".into()),
            at: Some(negotiation::MeetupDateTime::now()),
        }
    }

    fn card() -> payment::Method {
        payment::Method::Card {
            number: "1234 5678 9012 3456".into(),
            holder: "Alice Carter".into(),
            expiry: "12/27".into(),
            cvv: "123".into(),
        }
    }

    async fn agreed(
        service: &Service<Json>,
        customer: user::Id,
        fixer: user::Id,
    ) -> Order {
        let order = place(service, customer).await;
        let _ = service
            .execute(AcceptOrder {
                order_id: order.id,
                fixer_id: fixer,
            })
            .await
            .unwrap();
        let _ = service
            .execute(SubmitProposal {
                order_id: order.id,
                proposer: fixer,
                draft: draft("45"),
            })
            .await
            .unwrap();
        service
            .execute(AcceptProposal {
                order_id: order.id,
                accepter: customer,
            })
            .await
            .unwrap()
    }

    async fn paid(
        service: &Service<Json>,
        customer: user::Id,
        fixer: user::Id,
    ) -> Order {
        let order = agreed(service, customer, fixer).await;
        service
            .execute(SubmitPayment {
                order_id: order.id,
                payer: customer,
                method: card(),
            })
            .await
            .unwrap()
    }

    async fn released(
        service: &Service<Json>,
        customer: user::Id,
        fixer: user::Id,
    ) -> Order {
        let mut order = paid(service, customer, fixer).await;
        for to in [
            order::Status::EnRoute,
            order::Status::Arrived,
            order::Status::InProgress,
            order::Status::AwaitingRelease,
        ] {
            order = service
                .execute(AdvanceOrder {
                    order_id: order.id,
                    fixer,
                    to,
                })
                .await
                .unwrap();
        }
        service
            .execute(ReleaseEscrow {
                order_id: order.id,
                customer,
                confirmed: true,
            })
            .await
            .unwrap()
    }

    async fn inbox(
        service: &Service<Json>,
        recipient: user::Id,
    ) -> Vec<Notification> {
        service
            .execute(query::notifications::OfRecipient::by(
                read::notification::OfRecipient(recipient),
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn accepting_assigns_fixer_and_notifies_customer() {
        let (service, customer, fixer) = service();
        let order = place(&service, customer).await;

        let order = service
            .execute(AcceptOrder {
                order_id: order.id,
                fixer_id: fixer,
            })
            .await
            .unwrap();

        assert_eq!(order.status, order::Status::Accepted);
        assert_eq!(order.fixer_id, Some(fixer));

        let received = inbox(&service, customer).await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].kind, notification::Kind::OrderAccepted);
        assert_eq!(received[0].order_id, Some(order.id));
    }

    #[tokio::test]
    async fn customers_cannot_claim_their_own_orders() {
        let (service, customer, _) = service();
        let order = place(&service, customer).await;

        let err = service
            .execute(AcceptOrder {
                order_id: order.id,
                fixer_id: customer,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            accept_order::ExecutionError::OwnOrder,
        ));
    }

    #[tokio::test]
    async fn accepting_is_single_shot() {
        let (service, customer, fixer) = service();
        let order = place(&service, customer).await;

        let _ = service
            .execute(AcceptOrder {
                order_id: order.id,
                fixer_id: fixer,
            })
            .await
            .unwrap();
        let err = service
            .execute(AcceptOrder {
                order_id: order.id,
                fixer_id: fixer,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            accept_order::ExecutionError::NotPending(
                order::Status::Accepted,
            ),
        ));
    }

    #[tokio::test]
    async fn unknown_customers_cannot_place_orders() {
        let (service, _, _) = service();
        let stranger = user::Id::new();

        let err = service
            .execute(CreateOrder {
                customer_id: stranger,
                category: order::Category::Dorm,
                subcategory: "Desk".into(),
                issue: order::Issue::new("Wobbly leg").unwrap(),
                description: order::Description::new(
                    "The rear left leg is loose.",
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
                price_estimate: order::PriceEstimate::new(
                    eur("10"),
                    eur("20"),
                )
                .unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            create_order::ExecutionError::CustomerNotExists(id)
                if *id == stranger,
        ));
    }

    #[tokio::test]
    async fn negotiation_agrees_through_counter_offers() {
        let (service, customer, fixer) = service();
        let order = place(&service, customer).await;
        let order_id = order.id;
        let _ = service
            .execute(AcceptOrder { order_id, fixer_id: fixer })
            .await
            .unwrap();

        let order = service
            .execute(SubmitProposal {
                order_id,
                proposer: fixer,
                draft: draft("45"),
            })
            .await
            .unwrap();
        assert_eq!(order.status, order::Status::Negotiating);
        assert!(inbox(&service, customer)
            .await
            .iter()
            .any(|n| n.title == "Terms proposed".into()));

        // The proposer cannot accept its own offer.
        let err = service
            .execute(AcceptProposal { order_id, accepter: fixer })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            accept_proposal::ExecutionError::OwnProposal,
        ));

        let _ = service
            .execute(SubmitProposal {
                order_id,
                proposer: customer,
                draft: draft("46"),
            })
            .await
            .unwrap();
        assert!(inbox(&service, fixer)
            .await
            .iter()
            .any(|n| n.title == "Counter-proposal received".into()));

        let order = service
            .execute(AcceptProposal { order_id, accepter: fixer })
            .await
            .unwrap();
        assert_eq!(order.status, order::Status::AwaitingPayment);
        assert_eq!(order.final_price, Some(eur("46")));
        assert!(order.negotiation.as_ref().unwrap().all_confirmed);
        assert!(inbox(&service, customer)
            .await
            .iter()
            .any(|n| n.kind == notification::Kind::PaymentRequired));
    }

    #[tokio::test]
    async fn proposals_require_a_negotiable_order() {
        let (service, customer, fixer) = service();
        let order = place(&service, customer).await;

        let err = service
            .execute(SubmitProposal {
                order_id: order.id,
                proposer: fixer,
                draft: draft("45"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            submit_proposal::ExecutionError::NotNegotiable(
                order::Status::Pending,
            ),
        ));
    }

    #[tokio::test]
    async fn payment_escrows_base_price_and_charges_fees() {
        let (service, customer, fixer) = service();
        let order = agreed(&service, customer, fixer).await;
        let order_id = order.id;

        let err = service
            .execute(SubmitPayment {
                order_id,
                payer: fixer,
                method: card(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            submit_payment::ExecutionError::NotCustomer(id) if *id == fixer,
        ));

        let err = service
            .execute(SubmitPayment {
                order_id,
                payer: customer,
                method: payment::Method::PayPal {
                    email: "alice@invalid".into(),
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            submit_payment::ExecutionError::InvalidMethod(
                payment::InvalidMethod::PaypalEmail,
            ),
        ));

        let order = service
            .execute(SubmitPayment {
                order_id,
                payer: customer,
                method: card(),
            })
            .await
            .unwrap();
        assert_eq!(order.status, order::Status::ReadyPaid);
        let pay = order.payment.as_ref().unwrap();
        assert_eq!(pay.status, payment::Status::Escrowed);
        assert_eq!(pay.escrowed, eur("45"));
        // 45 base + 4.50 commission + 0.90 transaction fee.
        assert_eq!(order.total_price, Some(eur("50.40")));
        assert!(inbox(&service, fixer)
            .await
            .iter()
            .any(|n| n.kind == notification::Kind::PaymentReceived));

        let err = service
            .execute(SubmitPayment {
                order_id,
                payer: customer,
                method: card(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            submit_payment::ExecutionError::NotPayable(
                order::Status::ReadyPaid,
            ),
        ));
    }

    #[tokio::test]
    async fn fixer_walks_the_escrow_flow_step_by_step() {
        let (service, customer, fixer) = service();
        let order = paid(&service, customer, fixer).await;
        let order_id = order.id;

        let err = service
            .execute(AdvanceOrder {
                order_id,
                fixer: customer,
                to: order::Status::EnRoute,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            advance_order::ExecutionError::NotFixer(id) if *id == customer,
        ));

        // Skipping a step is not allowed.
        let err = service
            .execute(AdvanceOrder {
                order_id,
                fixer,
                to: order::Status::Arrived,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            advance_order::ExecutionError::InvalidTransition {
                from: order::Status::ReadyPaid,
                to: order::Status::Arrived,
            },
        ));

        let order = service
            .execute(AdvanceOrder {
                order_id,
                fixer,
                to: order::Status::EnRoute,
            })
            .await
            .unwrap();
        assert_eq!(order.status, order::Status::EnRoute);
        assert!(inbox(&service, customer)
            .await
            .iter()
            .any(|n| n.kind == notification::Kind::FixerEnRoute));
    }

    #[tokio::test]
    async fn releasing_escrow_completes_the_order() {
        let (service, customer, fixer) = service();
        let order = released(&service, customer, fixer).await;

        assert_eq!(order.status, order::Status::PaidCompleted);
        let pay = order.payment.as_ref().unwrap();
        assert_eq!(pay.status, payment::Status::Released);
        assert!(pay.released_at.is_some());
        assert!(order.completed_at.is_some());
        assert!(inbox(&service, fixer)
            .await
            .iter()
            .any(|n| n.kind == notification::Kind::PaymentReleased));

        // Releasing twice is impossible: the order is terminal.
        let err = service
            .execute(ReleaseEscrow {
                order_id: order.id,
                customer,
                confirmed: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            release_escrow::ExecutionError::NotReleasable(
                order::Status::PaidCompleted,
            ),
        ));
    }

    #[tokio::test]
    async fn releasing_requires_explicit_confirmation() {
        let (service, customer, fixer) = service();
        let order = paid(&service, customer, fixer).await;

        let err = service
            .execute(ReleaseEscrow {
                order_id: order.id,
                customer,
                confirmed: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            release_escrow::ExecutionError::NotConfirmed,
        ));
    }

    #[tokio::test]
    async fn disputing_escalates_and_keeps_escrow_held() {
        let (service, customer, fixer) = service();
        let mut order = paid(&service, customer, fixer).await;
        for to in [
            order::Status::EnRoute,
            order::Status::Arrived,
            order::Status::InProgress,
            order::Status::AwaitingRelease,
        ] {
            order = service
                .execute(AdvanceOrder {
                    order_id: order.id,
                    fixer,
                    to,
                })
                .await
                .unwrap();
        }

        // Disputing is the customer's counterpart of releasing.
        let err = service
            .execute(DisputeEscrow {
                order_id: order.id,
                customer: fixer,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            dispute_escrow::ExecutionError::NotCustomer(id) if *id == fixer,
        ));

        let order = service
            .execute(DisputeEscrow {
                order_id: order.id,
                customer,
            })
            .await
            .unwrap();

        assert_eq!(order.status, order::Status::Escalated);
        assert_eq!(
            order.payment.as_ref().unwrap().status,
            payment::Status::Escrowed,
        );
    }

    #[tokio::test]
    async fn cancelling_is_customer_only_and_single_shot() {
        let (service, customer, fixer) = service();
        let order = place(&service, customer).await;

        let err = service
            .execute(CancelOrder {
                order_id: order.id,
                customer: fixer,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            cancel_order::ExecutionError::NotCustomer(id) if *id == fixer,
        ));

        let order = service
            .execute(CancelOrder {
                order_id: order.id,
                customer,
            })
            .await
            .unwrap();
        assert_eq!(order.status, order::Status::Cancelled);
        // Nobody to notify: the order was never claimed.
        assert!(inbox(&service, customer).await.is_empty());

        let err = service
            .execute(CancelOrder {
                order_id: order.id,
                customer,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            cancel_order::ExecutionError::NotCancellable(
                order::Status::Cancelled,
            ),
        ));
    }

    #[tokio::test]
    async fn reviews_require_completion_and_are_single_shot() {
        let (service, customer, fixer) = service();
        let order = paid(&service, customer, fixer).await;

        let err = service
            .execute(SubmitReview {
                order_id: order.id,
                reviewer: customer,
                rating: order::Rating::new(5).unwrap(),
                review: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            submit_review::ExecutionError::NotCompleted(
                order::Status::ReadyPaid,
            ),
        ));

        let (service, customer, fixer) = self::service();
        let order = released(&service, customer, fixer).await;
        let order = service
            .execute(SubmitReview {
                order_id: order.id,
                reviewer: customer,
                rating: order::Rating::new(5).unwrap(),
                review: order::Review::new("Quick and friendly."),
            })
            .await
            .unwrap();
        assert_eq!(order.rating, Some(order::Rating::new(5).unwrap()));

        let err = service
            .execute(SubmitReview {
                order_id: order.id,
                reviewer: customer,
                rating: order::Rating::new(4).unwrap(),
                review: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            submit_review::ExecutionError::AlreadyReviewed,
        ));
    }

    #[tokio::test]
    async fn messaging_notifies_the_counter_party() {
        let (service, customer, fixer) = service();
        let order = place(&service, customer).await;
        let _ = service
            .execute(AcceptOrder {
                order_id: order.id,
                fixer_id: fixer,
            })
            .await
            .unwrap();

        let stranger = user::Id::new();
        let err = service
            .execute(SendMessage {
                order_id: order.id,
                sender: stranger,
                content: crate::domain::message::Content::new("Hello?")
                    .unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            send_message::ExecutionError::NotParty(id) if *id == stranger,
        ));

        let message = service
            .execute(SendMessage {
                order_id: order.id,
                sender: customer,
                content: crate::domain::message::Content::new(
                    "When can you come by?",
                )
                .unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(message.sender, customer);
        assert!(inbox(&service, fixer)
            .await
            .iter()
            .any(|n| n.kind == notification::Kind::NewMessage));
    }

    #[tokio::test]
    async fn chat_is_marked_read_for_the_reader_only() {
        let (service, customer, fixer) = service();
        let order = place(&service, customer).await;
        let _ = service
            .execute(AcceptOrder {
                order_id: order.id,
                fixer_id: fixer,
            })
            .await
            .unwrap();

        for content in ["When can you come by?", "Any time after 6pm?"] {
            let _ = service
                .execute(SendMessage {
                    order_id: order.id,
                    sender: customer,
                    content: crate::domain::message::Content::new(content)
                        .unwrap(),
                })
                .await
                .unwrap();
        }

        let unread = |reader| {
            service.execute(query::messages::UnreadCount {
                order_id: order.id,
                reader,
            })
        };
        assert_eq!(unread(fixer).await.unwrap(), 2);
        // Senders never count their own messages.
        assert_eq!(unread(customer).await.unwrap(), 0);

        let stranger = user::Id::new();
        let err = service
            .execute(MarkMessagesRead {
                order_id: order.id,
                reader: stranger,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            mark_messages_read::ExecutionError::NotParty(id)
                if *id == stranger,
        ));

        let marked = service
            .execute(MarkMessagesRead {
                order_id: order.id,
                reader: fixer,
            })
            .await
            .unwrap();
        assert_eq!(marked, 2);
        assert_eq!(unread(fixer).await.unwrap(), 0);

        // Re-reading is a no-op.
        let marked = service
            .execute(MarkMessagesRead {
                order_id: order.id,
                reader: fixer,
            })
            .await
            .unwrap();
        assert_eq!(marked, 0);
    }

    #[tokio::test]
    async fn notifications_are_marked_read() {
        let (service, customer, fixer) = service();
        let order = place(&service, customer).await;
        let _ = service
            .execute(AcceptOrder {
                order_id: order.id,
                fixer_id: fixer,
            })
            .await
            .unwrap();

        let received = inbox(&service, customer).await;
        assert_eq!(received.len(), 1);
        let id = received[0].id;

        let err = service
            .execute(MarkNotificationRead {
                notification_id: id,
                recipient: fixer,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            mark_notification_read::ExecutionError::NotRecipient(u)
                if *u == fixer,
        ));

        service
            .execute(MarkNotificationRead {
                notification_id: id,
                recipient: customer,
            })
            .await
            .unwrap();
        assert_eq!(
            service
                .execute(query::notifications::UnreadCount(customer))
                .await
                .unwrap(),
            0,
        );

        // Re-reading is a no-op.
        service
            .execute(MarkNotificationRead {
                notification_id: id,
                recipient: customer,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn all_notifications_are_marked_read_at_once() {
        let (service, customer, fixer) = service();
        let _ = agreed(&service, customer, fixer).await;

        let unread = service
            .execute(query::notifications::UnreadCount(customer))
            .await
            .unwrap();
        assert!(unread > 0);

        let marked = service
            .execute(MarkAllNotificationsRead {
                recipient: customer,
            })
            .await
            .unwrap();
        assert_eq!(marked, unread);

        assert_eq!(
            service
                .execute(query::notifications::UnreadCount(customer))
                .await
                .unwrap(),
            0,
        );
    }

    #[tokio::test]
    async fn every_write_stamps_the_update_time() {
        let (service, customer, fixer) = service();
        let order = place(&service, customer).await;
        let placed_at = order.updated_at;

        let order = service
            .execute(AcceptOrder {
                order_id: order.id,
                fixer_id: fixer,
            })
            .await
            .unwrap();

        assert!(order.updated_at >= placed_at);
        assert!(order.updated_at >= order.created_at.coerce());

        let stored: Option<Order> = service
            .database()
            .execute(Select(By::new(order.id)))
            .await
            .unwrap();
        assert_eq!(stored.unwrap().updated_at, order.updated_at);
    }
}
