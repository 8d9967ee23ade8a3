use sqlx::SqliteConnection;

use crate::{
    db_types::{NewService, Service},
    traits::AccountApiError,
};

pub async fn fetch_service(service_id: i64, conn: &mut SqliteConnection) -> Result<Option<Service>, AccountApiError> {
    let service =
        sqlx::query_as("SELECT * FROM services WHERE id = $1").bind(service_id).fetch_optional(conn).await?;
    Ok(service)
}

pub async fn insert_service(service: NewService, conn: &mut SqliteConnection) -> Result<Service, AccountApiError> {
    let service = sqlx::query_as(
        r#"
            INSERT INTO services (title, category, description, price, delivery_estimate, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(service.title)
    .bind(service.category)
    .bind(service.description)
    .bind(service.price.value())
    .bind(service.delivery_estimate)
    .bind(service.image_url)
    .fetch_one(conn)
    .await?;
    Ok(service)
}

/// Marks a service inactive so it no longer resolves during admission. Historical line-item snapshots are untouched.
pub async fn deactivate_service(service_id: i64, conn: &mut SqliteConnection) -> Result<bool, AccountApiError> {
    let result = sqlx::query("UPDATE services SET active = 0, updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(service_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
