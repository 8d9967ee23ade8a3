use chrono::{DateTime, Utc};
use mockall::mock;
use webstore_engine::{
    db_types::{Order, Service, UserAccount},
    order_objects::OrderQueryFilter,
    AccountApiError,
    AccountManagement,
    AuthApiError,
    AuthManagement,
    LedgerManagement,
    TransferOutcome,
};
use ws_common::Credits;

// One mock backend covering all the query traits, since the handlers take a single backend type parameter.
mock! {
    pub Backend {}
    impl AccountManagement for Backend {
        async fn fetch_user_account(&self, user_id: i64) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_user_account_for_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_user_account_for_username(&self, username: &str) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_balance(&self, user_id: i64) -> Result<Credits, AccountApiError>;
        async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, AccountApiError>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, AccountApiError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError>;
        async fn fetch_order_timestamps_since(&self, user_id: i64, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>, AccountApiError>;
        async fn count_orders_for_user(&self, user_id: i64) -> Result<u64, AccountApiError>;
        async fn fetch_service(&self, service_id: i64) -> Result<Option<Service>, AccountApiError>;
    }
    impl LedgerManagement for Backend {
        async fn credit_account(&self, user_id: i64, amount: Credits) -> Result<Credits, AccountApiError>;
        async fn debit_account(&self, user_id: i64, amount: Credits) -> Result<Credits, AccountApiError>;
        async fn transfer_credits(&self, from_user_id: i64, to_username: &str, amount: Credits) -> Result<TransferOutcome, AccountApiError>;
    }
    impl AuthManagement for Backend {
        async fn fetch_user_for_token(&self, token: &str) -> Result<Option<UserAccount>, AuthApiError>;
    }
}
