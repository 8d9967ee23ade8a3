use sqlx::migrate::MigrateDatabase;
use tokio::runtime::Runtime;
use webstore_engine::{
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed::seed_user,
    },
    AccountApi,
    AccountApiError,
    AccountManagement,
    SqliteDatabase,
    WebstoreDatabase,
};
use ws_common::Credits;

async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

async fn tear_down(db: SqliteDatabase) {
    let url = db.url().to_string();
    sqlx::Sqlite::drop_database(&url).await.ok();
}

#[test]
fn transfers_move_credits_atomically() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let db = setup().await;
        let api = AccountApi::new(db.clone());
        let alice = seed_user(&db, "alice", 100).await;
        let bob = seed_user(&db, "bob", 0).await;

        let outcome = api.transfer(alice.id, "bob", Credits::from(30)).await.unwrap();
        assert_eq!(outcome.sender_balance, Credits::from(70));
        assert_eq!(outcome.recipient_id, bob.id);
        assert_eq!(outcome.recipient_username, "bob");
        assert_eq!(db.fetch_balance(alice.id).await.unwrap(), Credits::from(70));
        assert_eq!(db.fetch_balance(bob.id).await.unwrap(), Credits::from(30));
        tear_down(db).await;
    });
}

#[test]
fn transfer_to_unknown_recipient_leaves_sender_untouched() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let db = setup().await;
        let api = AccountApi::new(db.clone());
        let alice = seed_user(&db, "alice", 100).await;

        let err = api.transfer(alice.id, "nobody", Credits::from(30)).await.unwrap_err();
        assert!(matches!(err, AccountApiError::RecipientNotFound(name) if name == "nobody"));
        // The debit rolled back with the transaction.
        assert_eq!(db.fetch_balance(alice.id).await.unwrap(), Credits::from(100));
        tear_down(db).await;
    });
}

#[test]
fn transfer_amount_must_be_positive_and_covered() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let db = setup().await;
        let api = AccountApi::new(db.clone());
        let alice = seed_user(&db, "alice", 50).await;
        let _bob = seed_user(&db, "bob", 0).await;

        let err = api.transfer(alice.id, "bob", Credits::from(0)).await.unwrap_err();
        assert!(matches!(err, AccountApiError::InvalidAmount(_)));
        let err = api.transfer(alice.id, "bob", Credits::from(-10)).await.unwrap_err();
        assert!(matches!(err, AccountApiError::InvalidAmount(_)));
        let err = api.transfer(alice.id, "bob", Credits::from(500)).await.unwrap_err();
        assert!(matches!(err, AccountApiError::InsufficientFunds));
        assert_eq!(db.fetch_balance(alice.id).await.unwrap(), Credits::from(50));
        tear_down(db).await;
    });
}

#[test]
fn top_up_and_deduct_round_the_ledger() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let db = setup().await;
        let api = AccountApi::new(db.clone());
        let alice = seed_user(&db, "alice", 0).await;

        assert_eq!(api.top_up(alice.id, Credits::from(200)).await.unwrap(), Credits::from(200));
        assert_eq!(api.deduct(alice.id, Credits::from(50)).await.unwrap(), Credits::from(150));
        let err = api.deduct(alice.id, Credits::from(151)).await.unwrap_err();
        assert!(matches!(err, AccountApiError::InsufficientFunds));
        let err = api.top_up(alice.id + 99, Credits::from(10)).await.unwrap_err();
        assert!(matches!(err, AccountApiError::UserNotFound));
        tear_down(db).await;
    });
}
