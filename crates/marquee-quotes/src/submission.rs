//! # Quote Submission
//!
//! The customer-facing write path: validate a quote form against the
//! customer's selection, then persist the resulting pending request.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit(contact, event, &selection, payment_method, notes)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  QuoteBuilder::build  ──► Err(ValidationErrors) ──► CoreError::Validation│
//! │       │ Ok(quote)                                                       │
//! │       ▼                                                                 │
//! │  QuoteRepository::insert (quote row + snapshot items, one tx)          │
//! │       │                                                                 │
//! │       ├── reference collision ──► new reference, retry                 │
//! │       └── Ok ──► QuoteRequest { status: pending, payment: pending }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use marquee_core::{
    ContactForm, CoreError, CoreResult, EventForm, QuoteBuilder, QuoteForm, QuoteRequest,
    ReferenceGenerator, Selection,
};
use marquee_db::{Database, DbError};

/// Attempts before a reference collision is reported as a store failure.
const MAX_INSERT_ATTEMPTS: usize = 3;

/// Builds and stores customer quote requests.
#[derive(Debug, Clone)]
pub struct QuoteSubmissionService {
    db: Database,
    references: Arc<ReferenceGenerator>,
}

impl QuoteSubmissionService {
    /// Uses an existing (possibly shared) reference generator.
    pub fn new(db: Database, references: Arc<ReferenceGenerator>) -> Self {
        QuoteSubmissionService { db, references }
    }

    /// Creates a service whose reference sequence continues after the quotes
    /// already stored.
    pub async fn with_prefix(db: Database, prefix: &str) -> CoreResult<Self> {
        let existing = db.quotes().count().await?;
        let references = ReferenceGenerator::starting_at(prefix, existing.max(0) as u64);

        debug!(prefix = %references.prefix(), existing_quotes = existing, "Reference sequence seeded");

        Ok(QuoteSubmissionService::new(db, Arc::new(references)))
    }

    pub fn references(&self) -> &Arc<ReferenceGenerator> {
        &self.references
    }

    /// Validates the inputs and stores a pending quote request.
    ///
    /// ## Errors
    /// - `Validation` with one entry per failed field; nothing is stored
    /// - `Unavailable` when the store fails
    pub async fn submit(
        &self,
        contact: ContactForm,
        event: EventForm,
        selection: &Selection,
        payment_method: &str,
        notes: Option<String>,
    ) -> CoreResult<QuoteRequest> {
        let builder = QuoteBuilder::new(&self.references);
        let quote = builder.build(contact, event, selection, payment_method, notes)?;

        self.persist(quote).await
    }

    /// Validates a bundled form and stores a pending quote request.
    pub async fn submit_form(&self, form: QuoteForm, selection: &Selection) -> CoreResult<QuoteRequest> {
        let builder = QuoteBuilder::new(&self.references);
        let quote = builder.build_form(form, selection)?;

        self.persist(quote).await
    }

    async fn persist(&self, quote: QuoteRequest) -> CoreResult<QuoteRequest> {
        self.persist_with(quote, || self.references.generate()).await
    }

    /// Inserts `quote`, drawing a fresh reference from `next_reference`
    /// after each reference collision.
    async fn persist_with<F>(&self, mut quote: QuoteRequest, mut next_reference: F) -> CoreResult<QuoteRequest>
    where
        F: FnMut() -> String,
    {
        let repo = self.db.quotes();

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            match repo.insert(&quote).await {
                Ok(()) => {
                    info!(
                        quote_id = %quote.id,
                        reference = %quote.reference,
                        items = quote.items.len(),
                        total = %quote.total_amount(),
                        "Quote request submitted"
                    );
                    return Ok(quote);
                }
                Err(DbError::UniqueViolation { ref field, .. }) if field.ends_with("reference") => {
                    if attempt == MAX_INSERT_ATTEMPTS {
                        break;
                    }
                    warn!(reference = %quote.reference, attempt, "Reference collision, regenerating");
                    quote.reference = next_reference();
                }
                Err(e) => return Err(CoreError::from(e)),
            }
        }

        Err(CoreError::Unavailable(
            "could not allocate a unique quote reference".to_string(),
        ))
    }
}
