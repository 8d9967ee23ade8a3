use ws_common::Credits;

use crate::{
    db_types::{NewService, NewUserAccount, Service, UserAccount},
    SqliteDatabase,
};

pub async fn seed_user(db: &SqliteDatabase, username: &str, credits: i64) -> UserAccount {
    let account = NewUserAccount {
        username: username.to_string(),
        name: format!("{username} Tester"),
        email: format!("{username}@example.com"),
        contact_number: "555-0100".to_string(),
        address: "1 Test Lane".to_string(),
        credits: Credits::from(credits),
    };
    db.insert_account(account).await.expect("Error seeding user")
}

pub async fn seed_service(db: &SqliteDatabase, title: &str, price: i64) -> Service {
    let service = NewService {
        title: title.to_string(),
        category: "general".to_string(),
        description: format!("{title} (test catalog entry)"),
        price: Credits::from(price),
        delivery_estimate: Some("3 days".to_string()),
        image_url: None,
    };
    db.insert_service(service).await.expect("Error seeding service")
}
