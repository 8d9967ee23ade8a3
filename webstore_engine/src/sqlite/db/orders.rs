use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    api::order_objects::OrderQueryFilter,
    db_types::{LineItem, NewOrder, Order, OrderStatus},
    sqlite::db::users,
    traits::{AccountApiError, OrderFlowError},
};

/// Inserts a new order and its line-item snapshots using the given connection. This is not atomic on its own. You
/// can embed this call inside a transaction if you need atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderFlowError> {
    let mut result: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                user_id,
                username,
                customer_name,
                customer_email,
                customer_address,
                note,
                total
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order.user_id)
    .bind(order.username)
    .bind(order.customer_name)
    .bind(order.customer_email)
    .bind(order.customer_address)
    .bind(order.note)
    .bind(order.total.value())
    .fetch_one(&mut *conn)
    .await?;
    for item in order.items {
        let stored: LineItem = sqlx::query_as(
            r#"
                INSERT INTO order_items (order_id, service_id, title, category, price, delivery_estimate, image_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *;
            "#,
        )
        .bind(result.id)
        .bind(item.service_id)
        .bind(item.title)
        .bind(item.category)
        .bind(item.price.value())
        .bind(item.delivery_estimate)
        .bind(item.image_url)
        .fetch_one(&mut *conn)
        .await?;
        result.items.push(stored);
    }
    debug!("📝️ Order #{} inserted with {} items", result.id, result.items.len());
    Ok(result)
}

pub async fn fetch_order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, AccountApiError> {
    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(&mut *conn).await?;
    match order {
        Some(mut order) => {
            order.items = fetch_line_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

pub async fn fetch_line_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<LineItem>, AccountApiError> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// All orders for the user, newest first, line items included.
pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, AccountApiError> {
    let mut orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await?;
    for order in &mut orders {
        order.items = fetch_line_items(order.id, &mut *conn).await?;
    }
    Ok(orders)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in ascending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM orders
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(user_id) = query.user_id {
        where_clause.push("user_id = ");
        where_clause.push_bind_unseparated(user_id);
    }
    if let Some(email) = query.customer_email {
        where_clause.push("customer_email = ");
        where_clause.push_bind_unseparated(email);
    }
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let mut statuses = vec![];
        query.status.as_ref().unwrap().iter().for_each(|s| {
            statuses.push(format!("'{s}'"));
        });
        let status_clause = statuses.join(",");
        where_clause.push(format!("status IN ({status_clause})"));
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at ASC");

    trace!("📝️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let mut orders = query.fetch_all(&mut *conn).await?;
    for order in &mut orders {
        order.items = fetch_line_items(order.id, &mut *conn).await.map_err(|e| match e {
            AccountApiError::DatabaseError(msg) => sqlx::Error::Protocol(msg),
            e => sqlx::Error::Protocol(e.to_string()),
        })?;
    }
    trace!("Result of fetch_orders: {:?}", orders.len());
    Ok(orders)
}

/// A plain status write. No ledger effect; lifecycle legality is the caller's concern.
pub(crate) async fn update_order_status(
    id: i64,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let status = status.to_string();
    let result: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    match result {
        Some(mut order) => {
            order.items = fetch_line_items(order.id, conn).await?;
            Ok(order)
        },
        None => Err(OrderFlowError::OrderNotFound(id)),
    }
}

/// Cancels the order and refunds its recorded total.
///
/// The status write is keyed on the order currently being non-terminal, so the refund runs at most once no matter
/// how many times this is called: a repeat call matches no row and returns the stored order unchanged with `false`.
/// Callers wrap this in a transaction so the status write and the refund commit or roll back together.
pub(crate) async fn cancel_and_refund(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(Order, bool), OrderFlowError> {
    let cancelled: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = 'Cancelled', updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND status IN \
         ('Pending', 'Processing') RETURNING *",
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;
    match cancelled {
        Some(mut order) => {
            users::credit(order.user_id, order.total, &mut *conn).await?;
            order.items = fetch_line_items(order.id, conn).await?;
            Ok((order, true))
        },
        None => {
            let order =
                fetch_order_by_id(order_id, conn).await?.ok_or(OrderFlowError::OrderNotFound(order_id))?;
            match order.status {
                OrderStatus::Cancelled => Ok((order, false)),
                from => Err(OrderFlowError::TransitionForbidden { from, to: OrderStatus::Cancelled }),
            }
        },
    }
}

/// Deletes the order and its line items. No refund: deletion is a record purge, not a cancellation.
pub(crate) async fn delete_order(order_id: i64, conn: &mut SqliteConnection) -> Result<bool, OrderFlowError> {
    sqlx::query("DELETE FROM order_items WHERE order_id = $1").bind(order_id).execute(&mut *conn).await?;
    let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(order_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<u64, OrderFlowError> {
    sqlx::query("DELETE FROM order_items WHERE order_id IN (SELECT id FROM orders WHERE user_id = $1)")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    let result = sqlx::query("DELETE FROM orders WHERE user_id = $1").bind(user_id).execute(conn).await?;
    Ok(result.rows_affected())
}

pub(crate) async fn delete_orders_by_ids(order_ids: &[i64], conn: &mut SqliteConnection) -> Result<u64, OrderFlowError> {
    if order_ids.is_empty() {
        return Ok(0);
    }
    let mut builder = QueryBuilder::new("DELETE FROM order_items WHERE order_id IN (");
    let mut ids = builder.separated(", ");
    for id in order_ids {
        ids.push_bind(id);
    }
    builder.push(")");
    builder.build().execute(&mut *conn).await?;

    let mut builder = QueryBuilder::new("DELETE FROM orders WHERE id IN (");
    let mut ids = builder.separated(", ");
    for id in order_ids {
        ids.push_bind(id);
    }
    builder.push(")");
    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}

/// Creation timestamps of the user's orders at or after `since`, oldest first. This is all the rate window needs,
/// so the full order records stay on disk.
pub async fn order_timestamps_since(
    user_id: i64,
    since: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<DateTime<Utc>>, AccountApiError> {
    let stamps = sqlx::query_scalar(
        "SELECT created_at FROM orders WHERE user_id = $1 AND created_at >= $2 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(conn)
    .await?;
    Ok(stamps)
}

pub async fn count_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<u64, AccountApiError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1").bind(user_id).fetch_one(conn).await?;
    Ok(count as u64)
}
