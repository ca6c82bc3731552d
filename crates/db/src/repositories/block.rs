use crate::models::DbBlockedSlot;
use chrono::{NaiveDate, NaiveTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_blocked_slots_by_date(
    pool: &Pool<Postgres>,
    date: NaiveDate,
) -> Result<Vec<DbBlockedSlot>> {
    let blocks = sqlx::query_as::<_, DbBlockedSlot>(
        r#"
        SELECT id, block_date, block_time, created_by, created_at
        FROM blocked_slots
        WHERE block_date = $1
        ORDER BY block_time ASC
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(blocks)
}

pub async fn create_blocked_slot(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    time: NaiveTime,
    created_by: &str,
) -> Result<DbBlockedSlot> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating blocked slot: date={}, time={}, created_by={}",
        date,
        time,
        created_by
    );

    let block = sqlx::query_as::<_, DbBlockedSlot>(
        r#"
        INSERT INTO blocked_slots (id, block_date, block_time, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT ON CONSTRAINT uniq_blocked_slot DO UPDATE SET created_by = $4
        RETURNING id, block_date, block_time, created_by, created_at
        "#,
    )
    .bind(id)
    .bind(date)
    .bind(time)
    .bind(created_by)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(block)
}

pub async fn delete_blocked_slot(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM blocked_slots
        WHERE block_date = $1 AND block_time = $2
        "#,
    )
    .bind(date)
    .bind(time)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
