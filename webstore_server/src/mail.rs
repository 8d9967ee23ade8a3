//! Order-notification mail.
//!
//! The engine fires an event when an order has been admitted; the subscriber registered in [`crate::server`] renders
//! the notification and hands it to a [`Mailer`]. Delivery failures are logged and swallowed: mail is best-effort
//! and must never fail or roll back an order.
use std::fmt::Write;

use log::*;
use webstore_engine::db_types::Order;

/// Outbound mail seam. SMTP delivery lives outside this service; the default implementation writes the rendered
/// message to the log, which is also what the test environment wants.
pub trait Mailer: Send + Sync {
    fn send(&self, subject: &str, body: &str) -> Result<(), MailerError>;
}

#[derive(Debug, thiserror::Error)]
#[error("Could not deliver mail: {0}")]
pub struct MailerError(pub String);

#[derive(Debug, Default, Clone)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, subject: &str, body: &str) -> Result<(), MailerError> {
        info!("📧️ {subject}\n{body}");
        Ok(())
    }
}

/// Renders the order-notification mail from the stored order snapshot.
pub fn render_order_notification(store_name: &str, order: &Order) -> (String, String) {
    let subject = format!("🛒 New {store_name} Order: #{}", order.id);
    let mut services = String::new();
    for item in &order.items {
        let _ = writeln!(services, "    - {} | {} ({})", item.title, item.price, item.category);
    }
    let note = order.note.as_deref().unwrap_or("—");
    let body = format!(
        "A new order has been placed!\n\n🧑 User:  {}\n🧑 Email: {}\n📝 Note:  {}\n💰 Total: {}\n📦 \
         Services:\n{services}\n📅 Placed at: {}",
        order.username, order.customer_email, note, order.total, order.created_at
    );
    (subject, body)
}

/// Renders and sends the notification, logging (not propagating) any delivery failure.
pub fn notify_order_created<M: Mailer>(mailer: &M, store_name: &str, order: &Order) {
    let (subject, body) = render_order_notification(store_name, order);
    if let Err(e) = mailer.send(&subject, &body) {
        warn!("📧️ Failed to send order notification for order #{}: {e}", order.id);
    }
}
