//! # Quote Lifecycle Manager
//!
//! Staff-side transitions of stored quote requests.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   submit ──► ┌─────────┐   approve   ┌──────────┐                       │
//! │              │ pending │ ──────────► │ approved │ ◄─┐ approve            │
//! │              └────┬────┘             └────┬─────┘ ──┘ (books again      │
//! │                   │ reject                │ reject     under Permissive)│
//! │                   ▼                       ▼                             │
//! │              ┌──────────┐   approve                                     │
//! │              │ rejected │ ──────────► approved                          │
//! │              └──────────┘                                               │
//! │                                                                         │
//! │   update_payment_status and edit are accepted in every state.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition on an unknown id fails with `NotFound`; there is no
//! "invalid transition" error. Notifications are dispatched only after the
//! transition has committed.

use tracing::{debug, info};

use marquee_core::{
    ApprovalPolicy, CoreError, CoreResult, CustomerBooking, CustomerRecord, NotificationSignal,
    PaymentStatus, QuoteEvent, QuotePatch, QuoteRequest,
};
use marquee_db::{CustomerListQuery, Database, QuoteListQuery, StatusCounts};

use crate::notify::NotificationDispatcher;

/// Drives quote requests through approval, rejection, payment and edits.
#[derive(Debug, Clone)]
pub struct QuoteLifecycleManager<D: NotificationDispatcher> {
    db: Database,
    dispatcher: D,
    policy: ApprovalPolicy,
}

impl<D: NotificationDispatcher> QuoteLifecycleManager<D> {
    pub fn new(db: Database, dispatcher: D, policy: ApprovalPolicy) -> Self {
        QuoteLifecycleManager {
            db,
            dispatcher,
            policy,
        }
    }

    pub fn policy(&self) -> ApprovalPolicy {
        self.policy
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Approves a quote and books its customer.
    ///
    /// ## Side Effects (in order)
    /// 1. Customer upserted by email: created with one booking, or one
    ///    booking and the quote total added to the existing record
    /// 2. Quote status set to `approved` (same transaction as 1)
    /// 3. `quote_approved` signal dispatched
    ///
    /// Under [`ApprovalPolicy::Idempotent`] approving an already-approved
    /// quote returns it unchanged and skips all three.
    pub async fn approve(&self, quote_id: &str) -> CoreResult<QuoteRequest> {
        let quote = self.get(quote_id).await?;

        if !self.policy.should_book(quote.status) {
            debug!(
                quote_id = %quote_id,
                reference = %quote.reference,
                policy = %self.policy,
                "Quote already approved, nothing to do"
            );
            return Ok(quote);
        }

        let booking = CustomerBooking::from_quote(&quote);
        let customer = self.db.quotes().mark_approved(quote_id, &booking).await?;

        info!(
            quote_id = %quote_id,
            reference = %quote.reference,
            previous = %quote.status,
            customer_id = %customer.id,
            total_bookings = customer.total_bookings,
            "Quote approved"
        );

        let quote = self.get(quote_id).await?;
        self.notify(QuoteEvent::QuoteApproved, &quote);

        Ok(quote)
    }

    /// Rejects a quote. Customer records are never touched.
    pub async fn reject(&self, quote_id: &str) -> CoreResult<QuoteRequest> {
        self.db.quotes().mark_rejected(quote_id).await?;

        let quote = self.get(quote_id).await?;
        info!(quote_id = %quote_id, reference = %quote.reference, "Quote rejected");

        self.notify(QuoteEvent::QuoteRejected, &quote);

        Ok(quote)
    }

    /// Sets the payment status, whatever the quote status is.
    pub async fn update_payment_status(
        &self,
        quote_id: &str,
        payment_status: PaymentStatus,
    ) -> CoreResult<QuoteRequest> {
        self.db
            .quotes()
            .set_payment_status(quote_id, payment_status)
            .await?;

        let quote = self.get(quote_id).await?;
        info!(
            quote_id = %quote_id,
            reference = %quote.reference,
            payment_status = %payment_status,
            "Payment status updated"
        );

        Ok(quote)
    }

    /// Overwrites the fields present in `patch`.
    ///
    /// Nothing is recomputed: replacing the items keeps the stored total
    /// unless the patch supplies one.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown id
    /// - `Validation` when a supplied field is malformed; nothing is written
    pub async fn edit(&self, quote_id: &str, patch: QuotePatch) -> CoreResult<QuoteRequest> {
        let mut quote = self.get(quote_id).await?;

        if patch.is_empty() {
            return Ok(quote);
        }

        let patch = patch.validate()?;
        patch.apply(&mut quote);

        self.db.quotes().update(&quote).await?;

        info!(
            quote_id = %quote_id,
            reference = %quote.reference,
            consistent_total = quote.is_total_consistent(),
            "Quote edited"
        );

        Ok(quote)
    }

    /// Deletes a quote outright. Administrative override outside the
    /// lifecycle; customer totals already booked are left as they are.
    pub async fn delete(&self, quote_id: &str) -> CoreResult<()> {
        self.db.quotes().delete(quote_id).await?;
        info!(quote_id = %quote_id, "Quote deleted");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get(&self, quote_id: &str) -> CoreResult<QuoteRequest> {
        self.db
            .quotes()
            .get_by_id(quote_id)
            .await?
            .ok_or_else(|| CoreError::not_found("QuoteRequest", quote_id))
    }

    /// Looks a quote up by the reference the customer quotes when paying.
    pub async fn get_by_reference(&self, reference: &str) -> CoreResult<QuoteRequest> {
        self.db
            .quotes()
            .get_by_reference(reference)
            .await?
            .ok_or_else(|| CoreError::not_found("QuoteRequest", reference))
    }

    /// Lists quotes newest first. Returns `(total_matching, page)`.
    pub async fn list(&self, query: &QuoteListQuery) -> CoreResult<(usize, Vec<QuoteRequest>)> {
        Ok(self.db.quotes().list(query).await?)
    }

    pub async fn count_by_status(&self) -> CoreResult<StatusCounts> {
        Ok(self.db.quotes().count_by_status().await?)
    }

    pub async fn customer_by_email(&self, email: &str) -> CoreResult<CustomerRecord> {
        self.db
            .customers()
            .get_by_email(email)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", email))
    }

    pub async fn customer_by_id(&self, customer_id: &str) -> CoreResult<CustomerRecord> {
        self.db
            .customers()
            .get_by_id(customer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", customer_id))
    }

    pub async fn list_customers(
        &self,
        query: &CustomerListQuery,
    ) -> CoreResult<(usize, Vec<CustomerRecord>)> {
        Ok(self.db.customers().list(query).await?)
    }

    fn notify(&self, event: QuoteEvent, quote: &QuoteRequest) {
        self.dispatcher
            .dispatch(NotificationSignal::for_quote(event, quote));
    }
}
