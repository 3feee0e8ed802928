//! Staff-side flow: approve, reject, payment, edit, and customer booking.

mod common;

use common::{engine, form};
use marquee_core::{
    ApprovalPolicy, CoreError, CustomerStatus, Money, PaymentStatus, QuoteEvent, QuotePatch,
    QuoteRequest, QuoteStatus, Selection,
};
use marquee_db::{CustomerListQuery, QuoteListQuery};
use marquee_quotes::{ChannelDispatcher, QuoteEngine, QuotesConfig};

async fn submit(engine: &QuoteEngine<ChannelDispatcher>, email: &str, item_id: &str) -> QuoteRequest {
    let mut selection = Selection::new();
    selection.toggle(&engine.catalog.select(item_id).await.unwrap());
    engine
        .submissions
        .submit_form(form(email), &selection)
        .await
        .unwrap()
}

fn idempotent() -> QuotesConfig {
    let mut config = QuotesConfig::default();
    config.quotes.approval_policy = ApprovalPolicy::Idempotent;
    config
}

#[tokio::test]
async fn first_approval_creates_customer() {
    let (engine, mut rx) = engine(QuotesConfig::default()).await;
    let quote = submit(&engine, "sipho@example.com", "tent").await;

    let approved = engine.lifecycle.approve(&quote.id).await.unwrap();
    assert_eq!(approved.status, QuoteStatus::Approved);
    assert_eq!(approved.reference, quote.reference);
    assert_eq!(approved.created_at, quote.created_at);

    let customer = engine
        .lifecycle
        .customer_by_email("SIPHO@example.com")
        .await
        .unwrap();
    assert_eq!(customer.total_bookings, 1);
    assert_eq!(customer.total_spent(), quote.total_amount());
    assert_eq!(customer.status, CustomerStatus::Active);
    assert_eq!(customer.last_event_date, Some(quote.event.date));

    let signal = rx.try_recv().unwrap();
    assert_eq!(signal.event, QuoteEvent::QuoteApproved);
    assert_eq!(signal.quote_reference, quote.reference);
    assert_eq!(signal.customer_email, "sipho@example.com");
}

#[tokio::test]
async fn second_quote_from_same_email_adds_to_totals() {
    let (engine, _rx) = engine(QuotesConfig::default()).await;
    let first = submit(&engine, "sipho@example.com", "tent").await;
    let second = submit(&engine, "Sipho@Example.com", "vip-toilet").await;

    engine.lifecycle.approve(&first.id).await.unwrap();
    engine.lifecycle.approve(&second.id).await.unwrap();

    let customer = engine
        .lifecycle
        .customer_by_email("sipho@example.com")
        .await
        .unwrap();
    assert_eq!(customer.total_bookings, 2);
    assert_eq!(customer.total_spent(), Money::from_cents(120_000 + 50_000));

    let (count, _) = engine
        .lifecycle
        .list_customers(&CustomerListQuery::new())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn reject_never_touches_customers() {
    let (engine, mut rx) = engine(QuotesConfig::default()).await;
    let quote = submit(&engine, "lerato@example.com", "tent").await;

    let rejected = engine.lifecycle.reject(&quote.id).await.unwrap();
    assert_eq!(rejected.status, QuoteStatus::Rejected);

    let err = engine
        .lifecycle
        .customer_by_email("lerato@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    let signal = rx.try_recv().unwrap();
    assert_eq!(signal.event, QuoteEvent::QuoteRejected);
}

#[tokio::test]
async fn rejecting_an_approved_quote_keeps_the_booking() {
    let (engine, _rx) = engine(QuotesConfig::default()).await;
    let quote = submit(&engine, "lerato@example.com", "tent").await;

    engine.lifecycle.approve(&quote.id).await.unwrap();
    engine.lifecycle.reject(&quote.id).await.unwrap();

    let customer = engine
        .lifecycle
        .customer_by_email("lerato@example.com")
        .await
        .unwrap();
    assert_eq!(customer.total_bookings, 1);
}

#[tokio::test]
async fn repeat_approval_books_twice_when_permissive() {
    let (engine, mut rx) = engine(QuotesConfig::default()).await;
    let quote = submit(&engine, "anele@example.com", "tent").await;

    engine.lifecycle.approve(&quote.id).await.unwrap();
    engine.lifecycle.approve(&quote.id).await.unwrap();

    let customer = engine
        .lifecycle
        .customer_by_email("anele@example.com")
        .await
        .unwrap();
    assert_eq!(customer.total_bookings, 2);
    assert_eq!(customer.total_spent_cents, 2 * quote.total_amount_cents);

    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_ok());
}

#[tokio::test]
async fn repeat_approval_is_a_no_op_when_idempotent() {
    let (engine, mut rx) = engine(idempotent()).await;
    let quote = submit(&engine, "anele@example.com", "tent").await;

    engine.lifecycle.approve(&quote.id).await.unwrap();
    let again = engine.lifecycle.approve(&quote.id).await.unwrap();
    assert_eq!(again.status, QuoteStatus::Approved);

    let customer = engine
        .lifecycle
        .customer_by_email("anele@example.com")
        .await
        .unwrap();
    assert_eq!(customer.total_bookings, 1);

    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn rejected_quote_can_be_approved_later() {
    let (engine, _rx) = engine(idempotent()).await;
    let quote = submit(&engine, "kagiso@example.com", "tent").await;

    engine.lifecycle.reject(&quote.id).await.unwrap();
    let approved = engine.lifecycle.approve(&quote.id).await.unwrap();
    assert_eq!(approved.status, QuoteStatus::Approved);

    let customer = engine
        .lifecycle
        .customer_by_email("kagiso@example.com")
        .await
        .unwrap();
    assert_eq!(customer.total_bookings, 1);
}

#[tokio::test]
async fn unknown_quote_is_not_found_and_nothing_is_booked() {
    let (engine, mut rx) = engine(QuotesConfig::default()).await;

    let err = engine.lifecycle.approve("no-such-quote").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    let (count, _) = engine
        .lifecycle
        .list_customers(&CustomerListQuery::new())
        .await
        .unwrap();
    assert_eq!(count, 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn payment_status_changes_in_any_state() {
    let (engine, _rx) = engine(QuotesConfig::default()).await;
    let quote = submit(&engine, "bongani@example.com", "tent").await;

    let paid = engine
        .lifecycle
        .update_payment_status(&quote.id, PaymentStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.status, QuoteStatus::Pending);
    assert_eq!(paid.payment_status, PaymentStatus::Paid);

    engine.lifecycle.reject(&quote.id).await.unwrap();
    let refunded = engine
        .lifecycle
        .update_payment_status(&quote.id, PaymentStatus::Refunded)
        .await
        .unwrap();
    assert_eq!(refunded.status, QuoteStatus::Rejected);
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
}

#[tokio::test]
async fn edit_overwrites_without_recomputing() {
    let (engine, _rx) = engine(QuotesConfig::default()).await;
    let quote = submit(&engine, "naledi@example.com", "tent").await;
    engine.lifecycle.approve(&quote.id).await.unwrap();

    let mut items = quote.items.clone();
    items[0].quantity = 2;
    let patch = QuotePatch {
        items: Some(items),
        notes: Some(None),
        ..QuotePatch::default()
    };

    let edited = engine.lifecycle.edit(&quote.id, patch).await.unwrap();
    assert_eq!(edited.items[0].quantity, 2);
    assert_eq!(edited.total_amount_cents, quote.total_amount_cents);
    assert!(!edited.is_total_consistent());
    assert_eq!(edited.notes, None);
    assert_eq!(edited.reference, quote.reference);
    assert_eq!(edited.status, QuoteStatus::Approved);

    let override_total = QuotePatch {
        total_amount_cents: Some(200_000),
        ..QuotePatch::default()
    };
    let edited = engine.lifecycle.edit(&quote.id, override_total).await.unwrap();

    let stored = engine.lifecycle.get(&quote.id).await.unwrap();
    assert_eq!(stored.total_amount_cents, 200_000);
    assert_eq!(stored.items[0].quantity, 2);
    assert_eq!(stored.created_at, quote.created_at);
    assert_eq!(stored.updated_at, edited.updated_at);
}

#[tokio::test]
async fn admin_listing_and_counts() {
    let (engine, _rx) = engine(QuotesConfig::default()).await;
    let a = submit(&engine, "a@example.com", "tent").await;
    let b = submit(&engine, "b@example.com", "tent").await;
    let c = submit(&engine, "c@example.com", "vip-toilet").await;

    engine.lifecycle.approve(&a.id).await.unwrap();
    engine.lifecycle.reject(&b.id).await.unwrap();

    let counts = engine.lifecycle.count_by_status().await.unwrap();
    assert_eq!((counts.pending, counts.approved, counts.rejected), (1, 1, 1));
    assert_eq!(counts.total(), 3);

    let (total, page) = engine
        .lifecycle
        .list(&QuoteListQuery::new().paginate(1, 2))
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, c.id);

    let (total, pending) = engine
        .lifecycle
        .list(&QuoteListQuery::new().status(QuoteStatus::Pending))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(pending[0].id, c.id);

    engine.lifecycle.delete(&b.id).await.unwrap();
    let counts = engine.lifecycle.count_by_status().await.unwrap();
    assert_eq!(counts.rejected, 0);
}
