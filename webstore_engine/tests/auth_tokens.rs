//! Bearer-token resolution against a real sqlite backend.
use sqlx::migrate::MigrateDatabase;
use tokio::runtime::Runtime;
use webstore_engine::{
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed::seed_user,
    },
    AuthApi,
    AuthApiError,
    SqliteDatabase,
    WebstoreDatabase,
};

#[test]
fn tokens_resolve_to_their_owner() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
        let alice = seed_user(&db, "alice", 100).await;
        let bob = seed_user(&db, "bob", 100).await;
        db.insert_access_token(alice.id, "alice-token").await.unwrap();
        db.insert_access_token(bob.id, "bob-token").await.unwrap();

        let api = AuthApi::new(db.clone());
        let user = api.authenticate("alice-token").await.unwrap();
        assert_eq!(user.id, alice.id);
        assert_eq!(user.username, "alice");

        let err = api.authenticate("no-such-token").await.unwrap_err();
        assert!(matches!(err, AuthApiError::TokenNotFound));

        // A banned account still resolves, but authentication rejects it.
        sqlx::query("UPDATE users SET is_banned = 1 WHERE id = $1")
            .bind(bob.id)
            .execute(db.pool())
            .await
            .unwrap();
        let err = api.authenticate("bob-token").await.unwrap_err();
        assert!(matches!(err, AuthApiError::AccountBanned));

        let url = db.url().to_string();
        sqlx::Sqlite::drop_database(&url).await.ok();
    });
}
