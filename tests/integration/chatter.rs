//! Chatter API integration tests using SF_AUTH_URL.

use super::common::connect;
use chatter_sf_api::rest::{Fields, RequestMethod};

#[tokio::test]
#[ignore = "requires SF_AUTH_URL"]
async fn test_chatter_users_me() {
    let chatter = connect().await;

    let response = chatter
        .segment("users")
        .segment("me")
        .get(Fields::new())
        .await
        .expect("users/me should not fault");

    assert_eq!(response.status, 200, "body: {}", response.body);
    assert!(response.body["id"].is_string());
}

#[tokio::test]
#[ignore = "requires SF_AUTH_URL"]
async fn test_chatter_expired_token_is_refreshed() {
    let chatter = connect().await;
    let good_token = chatter.access_token();
    chatter.session().set_access_token("00Dinvalid!expired");

    let response = chatter
        .segment("users")
        .segment("me")
        .get(Fields::new())
        .await
        .expect("users/me should not fault");

    assert_eq!(response.status, 200, "body: {}", response.body);
    assert_ne!(chatter.access_token(), "00Dinvalid!expired");
    assert!(!good_token.is_empty());
}

#[tokio::test]
#[ignore = "requires SF_AUTH_URL"]
async fn test_chatter_post_and_delete_feed_item() {
    let chatter = connect().await;

    let created = chatter
        .segment("feeds")
        .segment("news")
        .segment("me")
        .segment("feed_items")
        .post([("text", "Integration test post")])
        .await
        .expect("post should not fault");
    assert_eq!(created.status, 201, "body: {}", created.body);

    let id = created.body["id"]
        .as_str()
        .expect("created feed item should have an id")
        .to_string();

    let deleted = chatter
        .segment("feed_items")
        .request(RequestMethod::Delete, [("id", id)])
        .await
        .expect("delete should not fault");
    assert_eq!(deleted.status, 204, "body: {}", deleted.body);
}

#[tokio::test]
#[ignore = "requires SF_AUTH_URL"]
async fn test_chatter_unknown_resource_is_data() {
    let chatter = connect().await;

    let response = chatter
        .segment("no_such_resource")
        .get(Fields::new())
        .await
        .expect("API errors are returned as data");

    assert_eq!(response.status, 404);
    assert!(!response.errors().is_empty());
}
