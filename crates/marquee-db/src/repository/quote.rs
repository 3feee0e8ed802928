//! # Quote Repository
//!
//! Database operations for quote requests and their snapshot items.
//!
//! ## Quote Lifecycle (storage view)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Quote Lifecycle                                   │
//! │                                                                         │
//! │  1. SUBMIT                                                             │
//! │     └── insert() → quote_requests row + quote_items rows (one tx)      │
//! │                                                                         │
//! │  2. TRIAGE (any order, any number of times)                            │
//! │     ├── mark_approved() → customers upsert + status (one tx)           │
//! │     ├── mark_rejected() → status only                                  │
//! │     ├── set_payment_status() → payment_status only                     │
//! │     └── update() → row + replaced items (one tx), reference untouched  │
//! │                                                                         │
//! │  3. (ADMIN OVERRIDE) DELETE                                            │
//! │     └── delete() → row, items cascade                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use marquee_core::{
    normalize_email, CatalogKind, ContactDetails, CustomerBooking, CustomerRecord, CustomerStatus,
    EventDetails, EventType, PaymentMethod, PaymentStatus, QuoteItem, QuoteRequest, QuoteStatus,
};

use super::customer::{CustomerRow, CUSTOMER_COLUMNS};
use super::{decode_list, encode_list, like_pattern, QuoteListQuery};
use crate::error::{DbError, DbResult};

const QUOTE_COLUMNS: &str = "id, reference, customer_name, customer_email, customer_phone, \
     customer_company, event_type, event_type_other, event_date, guest_count, location, \
     services, total_amount_cents, payment_method, status, payment_status, notes, \
     created_at, updated_at";

// =============================================================================
// Row Adapters
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    id: String,
    reference: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    customer_company: Option<String>,
    event_type: EventType,
    event_type_other: Option<String>,
    event_date: NaiveDate,
    guest_count: Option<i64>,
    location: String,
    services: String,
    total_amount_cents: i64,
    payment_method: PaymentMethod,
    status: QuoteStatus,
    payment_status: PaymentStatus,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuoteRow {
    fn into_quote(self, items: Vec<QuoteItem>) -> DbResult<QuoteRequest> {
        Ok(QuoteRequest {
            id: self.id,
            reference: self.reference,
            customer: ContactDetails {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
                company: self.customer_company,
            },
            event: EventDetails {
                event_type: self.event_type,
                event_type_other: self.event_type_other,
                date: self.event_date,
                guest_count: self.guest_count,
                location: self.location,
                services: decode_list(&self.services)?,
            },
            items,
            total_amount_cents: self.total_amount_cents,
            payment_method: self.payment_method,
            status: self.status,
            payment_status: self.payment_status,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct QuoteItemRow {
    item_id: String,
    kind: CatalogKind,
    name: String,
    category: String,
    unit_price_cents: i64,
    quantity: i64,
}

impl From<QuoteItemRow> for QuoteItem {
    fn from(row: QuoteItemRow) -> Self {
        QuoteItem {
            item_id: row.item_id,
            kind: row.kind,
            name: row.name,
            category: row.category,
            unit_price_cents: row.unit_price_cents,
            quantity: row.quantity,
        }
    }
}

/// Quote counts per status for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl StatusCounts {
    pub fn total(&self) -> i64 {
        self.pending + self.approved + self.rejected
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for quote request database operations.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    pool: SqlitePool,
}

impl QuoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        QuoteRepository { pool }
    }

    /// Inserts a newly built quote request and its items in one transaction.
    ///
    /// ## Errors
    /// `UniqueViolation` if the reference is already taken.
    pub async fn insert(&self, quote: &QuoteRequest) -> DbResult<()> {
        debug!(quote_id = %quote.id, reference = %quote.reference, "Inserting quote request");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quote_requests (
                id, reference,
                customer_name, customer_email, customer_phone, customer_company,
                event_type, event_type_other, event_date, guest_count, location, services,
                total_amount_cents, payment_method, status, payment_status, notes,
                created_at, updated_at
            ) VALUES (
                ?1, ?2,
                ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17,
                ?18, ?19
            )
            "#,
        )
        .bind(&quote.id)
        .bind(&quote.reference)
        .bind(&quote.customer.name)
        .bind(normalize_email(&quote.customer.email))
        .bind(&quote.customer.phone)
        .bind(&quote.customer.company)
        .bind(quote.event.event_type)
        .bind(&quote.event.event_type_other)
        .bind(quote.event.date)
        .bind(quote.event.guest_count)
        .bind(&quote.event.location)
        .bind(encode_list(&quote.event.services)?)
        .bind(quote.total_amount_cents)
        .bind(quote.payment_method)
        .bind(quote.status)
        .bind(quote.payment_status)
        .bind(&quote.notes)
        .bind(quote.created_at)
        .bind(quote.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &quote.id, &quote.items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<QuoteRequest>> {
        let sql = format!("SELECT {} FROM quote_requests WHERE id = ?1", QUOTE_COLUMNS);

        let row: Option<QuoteRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        self.hydrate(row).await
    }

    /// Looks a quote up by the reference a customer quoted on their payment.
    pub async fn get_by_reference(&self, reference: &str) -> DbResult<Option<QuoteRequest>> {
        let sql = format!(
            "SELECT {} FROM quote_requests WHERE reference = ?1",
            QUOTE_COLUMNS
        );

        let row: Option<QuoteRow> = sqlx::query_as(&sql)
            .bind(reference.trim().to_uppercase())
            .fetch_optional(&self.pool)
            .await?;

        self.hydrate(row).await
    }

    /// Lists quote requests, newest first.
    ///
    /// ## Returns
    /// `(total_matching, page)`; without pagination the page is every match.
    pub async fn list(&self, query: &QuoteListQuery) -> DbResult<(usize, Vec<QuoteRequest>)> {
        debug!(?query, "Listing quote requests");

        let mut count_qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM quote_requests");
        push_filters(&mut count_qb, query);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM quote_requests", QUOTE_COLUMNS));
        push_filters(&mut qb, query);
        qb.push(" ORDER BY julianday(created_at) DESC, rowid DESC");
        if let Some(page) = query.pagination {
            qb.push(" LIMIT ")
                .push_bind(page.limit())
                .push(" OFFSET ")
                .push_bind(page.offset());
        }

        let rows: Vec<QuoteRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        let mut quotes = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.load_items(&row.id).await?;
            quotes.push(row.into_quote(items)?);
        }

        Ok((total as usize, quotes))
    }

    /// Overwrites a quote's mutable fields and replaces its items.
    ///
    /// `reference`, `status`, `payment_status` and `created_at` are never
    /// written here.
    pub async fn update(&self, quote: &QuoteRequest) -> DbResult<()> {
        debug!(quote_id = %quote.id, "Updating quote request");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE quote_requests SET
                customer_name = ?2,
                customer_email = ?3,
                customer_phone = ?4,
                customer_company = ?5,
                event_type = ?6,
                event_type_other = ?7,
                event_date = ?8,
                guest_count = ?9,
                location = ?10,
                services = ?11,
                total_amount_cents = ?12,
                payment_method = ?13,
                notes = ?14,
                updated_at = ?15
            WHERE id = ?1
            "#,
        )
        .bind(&quote.id)
        .bind(&quote.customer.name)
        .bind(normalize_email(&quote.customer.email))
        .bind(&quote.customer.phone)
        .bind(&quote.customer.company)
        .bind(quote.event.event_type)
        .bind(&quote.event.event_type_other)
        .bind(quote.event.date)
        .bind(quote.event.guest_count)
        .bind(&quote.event.location)
        .bind(encode_list(&quote.event.services)?)
        .bind(quote.total_amount_cents)
        .bind(quote.payment_method)
        .bind(&quote.notes)
        .bind(quote.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("QuoteRequest", &quote.id));
        }

        sqlx::query("DELETE FROM quote_items WHERE quote_id = ?1")
            .bind(&quote.id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, &quote.id, &quote.items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Sets the payment status; allowed whatever the quote status is.
    pub async fn set_payment_status(&self, id: &str, payment_status: PaymentStatus) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE quote_requests SET payment_status = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(payment_status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("QuoteRequest", id));
        }

        Ok(())
    }

    /// Sets status to `rejected`. Customers are not touched.
    pub async fn mark_rejected(&self, id: &str) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE quote_requests SET status = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(QuoteStatus::Rejected)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("QuoteRequest", id));
        }

        Ok(())
    }

    /// Books the customer and sets status to `approved`, atomically.
    ///
    /// ## Steps (one transaction)
    /// 1. Upsert the customer keyed by `email_key`: insert with one booking,
    ///    or add one booking and the quote total to the existing counters
    /// 2. Set the quote's status to `approved`
    ///
    /// The counters are incremented in SQL, so concurrent approvals for the
    /// same email never lose an update.
    ///
    /// ## Returns
    /// The customer record as it stands after the booking.
    pub async fn mark_approved(&self, id: &str, booking: &CustomerBooking) -> DbResult<CustomerRecord> {
        debug!(quote_id = %id, email = %booking.email_key, "Approving quote request");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, email_key, name, email, phone, company, status,
                total_bookings, total_spent_cents, last_event_date,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9, ?10, ?10)
            ON CONFLICT (email_key) DO UPDATE SET
                total_bookings = total_bookings + 1,
                total_spent_cents = total_spent_cents + excluded.total_spent_cents,
                last_event_date = excluded.last_event_date,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&booking.email_key)
        .bind(&booking.name)
        .bind(&booking.email_key)
        .bind(&booking.phone)
        .bind(&booking.company)
        .bind(CustomerStatus::Active)
        .bind(booking.amount_cents)
        .bind(booking.event_date)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let result =
            sqlx::query("UPDATE quote_requests SET status = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(QuoteStatus::Approved)
                .bind(now)
                .execute(&mut *tx)
                .await?;

        // Dropping the transaction rolls the customer upsert back
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("QuoteRequest", id));
        }

        let sql = format!("SELECT {} FROM customers WHERE email_key = ?1", CUSTOMER_COLUMNS);
        let customer: CustomerRow = sqlx::query_as(&sql)
            .bind(&booking.email_key)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(customer.into())
    }

    /// Deletes a quote and its items. Administrative override only.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM quote_requests WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("QuoteRequest", id));
        }

        Ok(())
    }

    /// Counts quotes per status.
    pub async fn count_by_status(&self) -> DbResult<StatusCounts> {
        let rows: Vec<(QuoteStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM quote_requests GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match status {
                QuoteStatus::Pending => counts.pending = count,
                QuoteStatus::Approved => counts.approved = count,
                QuoteStatus::Rejected => counts.rejected = count,
            }
        }

        Ok(counts)
    }

    /// Total number of quote requests ever stored (and not deleted).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quote_requests")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    async fn load_items(&self, quote_id: &str) -> DbResult<Vec<QuoteItem>> {
        let rows: Vec<QuoteItemRow> = sqlx::query_as(
            r#"
            SELECT item_id, kind, name, category, unit_price_cents, quantity
            FROM quote_items
            WHERE quote_id = ?1
            ORDER BY position
            "#,
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QuoteItem::from).collect())
    }

    async fn hydrate(&self, row: Option<QuoteRow>) -> DbResult<Option<QuoteRequest>> {
        match row {
            Some(row) => {
                let items = self.load_items(&row.id).await?;
                Ok(Some(row.into_quote(items)?))
            }
            None => Ok(None),
        }
    }
}

async fn insert_items(conn: &mut SqliteConnection, quote_id: &str, items: &[QuoteItem]) -> DbResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO quote_items (
                quote_id, position, item_id, kind, name, category,
                unit_price_cents, quantity
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(quote_id)
        .bind(position as i64)
        .bind(&item.item_id)
        .bind(item.kind)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &QuoteListQuery) {
    qb.push(" WHERE 1 = 1");

    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }

    if let Some(payment_status) = query.payment_status {
        qb.push(" AND payment_status = ").push_bind(payment_status);
    }

    if let Some(email) = query.email.as_deref().filter(|e| !e.trim().is_empty()) {
        qb.push(" AND customer_email = ").push_bind(normalize_email(email));
    }

    if let Some(pattern) = like_pattern(query.search.as_deref()) {
        qb.push(" AND (lower(reference) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR lower(customer_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR customer_email LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR lower(location) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
