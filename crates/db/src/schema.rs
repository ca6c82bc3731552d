use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create bookings table. The unique constraint on (employee_id,
    // primary_date, primary_time) is what makes the commit conditional
    // insert atomic across processes.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            client_id VARCHAR(255) NOT NULL,
            client_name VARCHAR(255) NOT NULL,
            employee_id VARCHAR(255) NOT NULL,
            employee_name VARCHAR(255) NOT NULL,
            employee_email VARCHAR(255) NULL,
            primary_date DATE NOT NULL,
            primary_time TIME NOT NULL,
            primary_time_canonical TIME NOT NULL,
            primary_time_zone VARCHAR(64) NOT NULL,
            alternate_date DATE NULL,
            alternate_time TIME NULL,
            alternate_time_zone VARCHAR(64) NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'InProcess',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            scheduled_by VARCHAR(255) NOT NULL,
            client_user_id VARCHAR(255) NOT NULL,
            client_user_email VARCHAR(255) NOT NULL,
            CONSTRAINT uniq_employee_slot UNIQUE (employee_id, primary_date, primary_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create blocked_slots table for administrator-imposed blocks
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blocked_slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            block_date DATE NOT NULL,
            block_time TIME NOT NULL,
            created_by VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT uniq_blocked_slot UNIQUE (block_date, block_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_bookings_employee_id ON bookings(employee_id);
        CREATE INDEX IF NOT EXISTS idx_bookings_primary_date ON bookings(primary_date);
        CREATE INDEX IF NOT EXISTS idx_blocked_slots_block_date ON blocked_slots(block_date);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
