//! User repository against a live database.
//!
//! Run with `cargo test -p remark-db -- --ignored`.

use remark_core::{AuthService, Error};
use remark_db::test_fixtures::TestDatabase;

#[tokio::test]
#[ignore = "requires PostGIS database"]
async fn test_sign_up_then_log_in() {
    let mut test_db = TestDatabase::new().await;
    let username = TestDatabase::unique_username("erin");
    test_db.track_user(&username);

    let created = test_db.db.users.sign_up(&username, "hunter2").await.unwrap();
    let session = test_db.db.users.log_in(&username, "hunter2").await.unwrap();
    assert_eq!(created.user_id, session.user_id);
    assert!(session.logged_in_at >= created.logged_in_at);

    test_db.db.users.log_out(&session).await.unwrap();
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostGIS database"]
async fn test_duplicate_username_is_taken() {
    let mut test_db = TestDatabase::new().await;
    let first = test_db.user("frank").await;

    let err = test_db
        .db
        .users
        .sign_up(&first.username, "other")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UsernameTaken(name) if name == first.username));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostGIS database"]
async fn test_bad_credentials() {
    let mut test_db = TestDatabase::new().await;
    let grace = test_db.user("grace").await;

    assert!(matches!(
        test_db.db.users.log_in(&grace.username, "wrong").await,
        Err(Error::InvalidCredentials)
    ));
    assert!(matches!(
        test_db
            .db
            .users
            .log_in(&TestDatabase::unique_username("nobody"), "password")
            .await,
        Err(Error::InvalidCredentials)
    ));

    test_db.cleanup().await;
}
