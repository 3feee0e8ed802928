//! # Customer Repository
//!
//! Read access to customer records.
//!
//! Customers are only ever written by the approval transaction in
//! [`super::quote::QuoteRepository::mark_approved`]; this repository reads.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use marquee_core::{normalize_email, CustomerRecord, CustomerStatus};

use super::{like_pattern, CustomerListQuery};
use crate::error::DbResult;

pub(crate) const CUSTOMER_COLUMNS: &str = "id, name, email, phone, company, status, \
     total_bookings, total_spent_cents, last_event_date, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CustomerRow {
    id: String,
    name: String,
    email: String,
    phone: String,
    company: Option<String>,
    status: CustomerStatus,
    total_bookings: i64,
    total_spent_cents: i64,
    last_event_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for CustomerRecord {
    fn from(row: CustomerRow) -> Self {
        CustomerRecord {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            status: row.status,
            total_bookings: row.total_bookings,
            total_spent_cents: row.total_spent_cents,
            last_event_date: row.last_event_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for customer record reads.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CustomerRecord>> {
        let sql = format!("SELECT {} FROM customers WHERE id = ?1", CUSTOMER_COLUMNS);

        let row: Option<CustomerRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CustomerRecord::from))
    }

    /// Looks a customer up by email, case-insensitively.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<CustomerRecord>> {
        let sql = format!("SELECT {} FROM customers WHERE email_key = ?1", CUSTOMER_COLUMNS);

        let row: Option<CustomerRow> = sqlx::query_as(&sql)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CustomerRecord::from))
    }

    /// Lists customers, most recently booked first.
    ///
    /// ## Returns
    /// `(total_matching, page)`
    pub async fn list(&self, query: &CustomerListQuery) -> DbResult<(usize, Vec<CustomerRecord>)> {
        let pattern = like_pattern(query.search.as_deref());

        let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM customers");
        push_search(&mut count_qb, pattern.as_deref());
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM customers", CUSTOMER_COLUMNS));
        push_search(&mut qb, pattern.as_deref());
        qb.push(" ORDER BY updated_at DESC, rowid DESC");
        if let Some(page) = query.pagination {
            qb.push(" LIMIT ")
                .push_bind(page.limit())
                .push(" OFFSET ")
                .push_bind(page.offset());
        }

        let rows: Vec<CustomerRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok((total as usize, rows.into_iter().map(CustomerRecord::from).collect()))
    }
}

fn push_search(qb: &mut QueryBuilder<'_, Sqlite>, pattern: Option<&str>) {
    if let Some(pattern) = pattern {
        qb.push(" WHERE (lower(name) LIKE ")
            .push_bind(pattern.to_string())
            .push(" ESCAPE '\\' OR email_key LIKE ")
            .push_bind(pattern.to_string())
            .push(" ESCAPE '\\' OR lower(coalesce(company, '')) LIKE ")
            .push_bind(pattern.to_string())
            .push(" ESCAPE '\\')");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use marquee_core::CustomerBooking;

    fn booking(email: &str, name: &str, amount_cents: i64) -> CustomerBooking {
        CustomerBooking {
            email_key: normalize_email(email),
            name: name.to_string(),
            email: email.to_string(),
            phone: "0215550100".to_string(),
            company: None,
            amount_cents,
            event_date: NaiveDate::from_ymd_opt(2026, 11, 14).unwrap(),
        }
    }

    /// Books a customer through the only write path: approving a stored quote.
    async fn book(db: &Database, reference: &str, b: &CustomerBooking) {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO quote_requests (id, reference, customer_name, customer_email, \
             customer_phone, event_type, event_date, location, total_amount_cents, \
             payment_method, created_at, updated_at) \
             VALUES (?1, ?1, ?2, ?3, ?4, 'other', ?5, 'Cape Town', ?6, 'cash', ?7, ?7)",
        )
        .bind(reference)
        .bind(&b.name)
        .bind(&b.email_key)
        .bind(&b.phone)
        .bind(b.event_date)
        .bind(b.amount_cents)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();

        db.quotes().mark_approved(reference, b).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_by_email_ignores_case() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        book(&db, "Q1", &booking("Sipho@Example.com", "Sipho", 10_000)).await;

        let found = db
            .customers()
            .get_by_email("  SIPHO@example.COM")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.total_bookings, 1);
        assert_eq!(found.last_event_date, NaiveDate::from_ymd_opt(2026, 11, 14));

        let by_id = db.customers().get_by_id(&found.id).await.unwrap().unwrap();
        assert_eq!(by_id, found);
    }

    #[tokio::test]
    async fn test_list_search_and_pages() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        book(&db, "Q1", &booking("sipho@example.com", "Sipho Dlamini", 10_000)).await;
        book(&db, "Q2", &booking("lerato@example.com", "Lerato Mokoena", 20_000)).await;
        book(&db, "Q3", &booking("anele@example.com", "Anele Dlamini", 30_000)).await;

        let (total, page) = db
            .customers()
            .list(&CustomerListQuery::new().paginate(1, 2))
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);

        let (total, found) = db
            .customers()
            .list(&CustomerListQuery::new().search("dlamini"))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert!(found.iter().all(|c| c.name.ends_with("Dlamini")));
    }
}
