use crate::models::DbBooking;
use eyre::Result;
use slotbook_core::models::booking::BookingRecord;
use sqlx::{Pool, Postgres};

/// Insert the booking unless its (employee_id, primary_date, primary_time)
/// key is already taken. Returns the inserted row, or `None` when the unique
/// constraint swallowed the write, which is the commit-time conflict signal.
pub async fn insert_if_absent(
    pool: &Pool<Postgres>,
    record: &BookingRecord,
) -> Result<Option<DbBooking>> {
    tracing::debug!(
        "Committing booking: employee_id={}, date={}, time={}",
        record.employee_id,
        record.primary_date,
        record.primary_time
    );

    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        INSERT INTO bookings (
            id, client_id, client_name,
            employee_id, employee_name, employee_email,
            primary_date, primary_time, primary_time_canonical, primary_time_zone,
            alternate_date, alternate_time, alternate_time_zone,
            status, created_at, scheduled_by, client_user_id, client_user_email
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        ON CONFLICT ON CONSTRAINT uniq_employee_slot DO NOTHING
        RETURNING id, client_id, client_name,
                  employee_id, employee_name, employee_email,
                  primary_date, primary_time, primary_time_canonical, primary_time_zone,
                  alternate_date, alternate_time, alternate_time_zone,
                  status, created_at, scheduled_by, client_user_id, client_user_email
        "#,
    )
    .bind(record.id)
    .bind(&record.client_id)
    .bind(&record.client_name)
    .bind(&record.employee_id)
    .bind(&record.employee_name)
    .bind(&record.employee_email)
    .bind(record.primary_date)
    .bind(record.primary_time)
    .bind(record.primary_time_canonical)
    .bind(&record.primary_time_zone)
    .bind(record.alternate_date)
    .bind(record.alternate_time)
    .bind(&record.alternate_time_zone)
    .bind(record.status.as_str())
    .bind(record.created_at)
    .bind(&record.scheduled_by)
    .bind(&record.client_user_id)
    .bind(&record.client_user_email)
    .fetch_optional(pool)
    .await?;

    if booking.is_none() {
        tracing::debug!(
            "Slot already held: employee_id={}, date={}, time={}",
            record.employee_id,
            record.primary_date,
            record.primary_time
        );
    }

    Ok(booking)
}

pub async fn get_bookings_by_employee_id(
    pool: &Pool<Postgres>,
    employee_id: &str,
) -> Result<Vec<DbBooking>> {
    let bookings = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, client_id, client_name,
               employee_id, employee_name, employee_email,
               primary_date, primary_time, primary_time_canonical, primary_time_zone,
               alternate_date, alternate_time, alternate_time_zone,
               status, created_at, scheduled_by, client_user_id, client_user_email
        FROM bookings
        WHERE employee_id = $1
        ORDER BY primary_date ASC, primary_time ASC
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}
