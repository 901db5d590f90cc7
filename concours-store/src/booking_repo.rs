use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use concours_booking::ledger::BookingRepository;
use concours_booking::models::{Booking, BookingStatus, PaymentState};

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    vehicle_id: Uuid,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    scheduled_date: NaiveDate,
    scheduled_time: NaiveTime,
    location: String,
    notes: Option<String>,
    status: String,
    payment_status: String,
    amount_ngn: i64,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        let status: BookingStatus = self.status.parse()?;
        let payment_status: PaymentState = self.payment_status.parse()?;

        Ok(Booking {
            id: self.id,
            vehicle_id: self.vehicle_id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            scheduled_date: self.scheduled_date,
            scheduled_time: self.scheduled_time,
            location: self.location,
            notes: self.notes,
            status,
            payment_status,
            amount_ngn: self.amount_ngn,
            payment_reference: self.payment_reference,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(
        &self,
        booking: &Booking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, vehicle_id, customer_name, customer_email, customer_phone,
                scheduled_date, scheduled_time, location, notes,
                status, payment_status, amount_ngn, payment_reference,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(booking.id)
        .bind(booking.vehicle_id)
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.customer_phone)
        .bind(booking.scheduled_date)
        .bind(booking.scheduled_time)
        .bind(&booking.location)
        .bind(&booking.notes)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.amount_ngn)
        .bind(&booking.payment_reference)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, vehicle_id, customer_name, customer_email, customer_phone,
                   scheduled_date, scheduled_time, location, notes,
                   status, payment_status, amount_ngn, payment_reference,
                   created_at, updated_at
            FROM bookings WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    // The conditional WHERE clause is the double-charge arbiter: of two
    // concurrent callers only one UPDATE matches the row.
    async fn mark_paid(
        &self,
        id: Uuid,
        reference: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET payment_status = $2, status = $3, payment_reference = $4, updated_at = NOW()
            WHERE id = $1 AND payment_status <> $2 AND status <> $3
            "#,
        )
        .bind(id)
        .bind(PaymentState::Paid.as_str())
        .bind(BookingStatus::Confirmed.as_str())
        .bind(reference)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
