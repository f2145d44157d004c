//! Integration tests for the per-shop entry point and pagination.

use httpshopify::{HttpError, PageCursor, Shop};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Order {
    id: u64,
    name: String,
}

fn create_test_shop(server: &MockServer) -> Shop {
    Shop::custom(&format!("{}/admin/api/2021-04", server.uri()), "shpat_test").unwrap()
}

fn link(url: &str, rel: &str) -> String {
    format!(r#"<{url}>; rel="{rel}""#)
}

// ============================================================================
// JSON Helpers
// ============================================================================

#[tokio::test]
async fn test_get_entity_decodes_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2021-04/orders/450789469.json"))
        .and(header("X-Shopify-Access-Token", "shpat_test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"order": {"id": 450_789_469, "name": "#1001"}})),
        )
        .mount(&server)
        .await;

    let shop = create_test_shop(&server);
    let order: Order = shop
        .get_entity("orders/450789469.json", "order", "order", 450_789_469)
        .await
        .unwrap();

    assert_eq!(
        order,
        Order {
            id: 450_789_469,
            name: "#1001".to_string()
        }
    );
}

#[tokio::test]
async fn test_get_entity_with_empty_root_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"order": {}})))
        .mount(&server)
        .await;

    let shop = create_test_shop(&server);
    let error = shop
        .get_entity::<Order>("orders/7.json", "order", "order", 7)
        .await
        .unwrap_err();

    assert!(error.is_not_found());
    assert_eq!(error.to_string(), "order 7 not found");
    assert!(error.response().is_none());
}

#[tokio::test]
async fn test_get_json_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let shop = create_test_shop(&server);
    let result: Result<Value, _> = shop.get_json("shop.json").await;

    assert!(matches!(result, Err(HttpError::Decode(_))));
}

#[tokio::test]
async fn test_post_json_sends_body_and_decodes_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2021-04/orders/1/fulfillments.json"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"fulfillment": {"location_id": 905_684_977}})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"fulfillment": {"id": 255_858_046}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let shop = create_test_shop(&server);
    let reply: Value = shop
        .post_json(
            "orders/1/fulfillments.json",
            &json!({"fulfillment": {"location_id": 905_684_977}}),
        )
        .await
        .unwrap();

    assert_eq!(reply["fulfillment"]["id"], 255_858_046);
}

#[tokio::test]
async fn test_post_json_accepts_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2021-04/orders/1/close.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let shop = create_test_shop(&server);
    let reply: Option<Value> = shop
        .post_json("orders/1/close.json", &json!({}))
        .await
        .unwrap();

    assert!(reply.is_none());
}

#[tokio::test]
async fn test_put_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/api/2021-04/variants/9.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"variant": {"id": 9}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/api/2021-04/variants/9.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let shop = create_test_shop(&server);
    let reply: Value = shop
        .put_json("variants/9.json", &json!({"variant": {"id": 9, "price": "1.00"}}))
        .await
        .unwrap();
    assert_eq!(reply["variant"]["id"], 9);

    shop.delete("variants/9.json").await.unwrap();
}

// ============================================================================
// Pagination
// ============================================================================

async fn mount_three_pages(server: &MockServer) {
    let base = format!("{}/admin/api/2021-04/orders.json", server.uri());
    let page2 = format!("{base}?page_info=p2&limit=1");
    let page3 = format!("{base}?page_info=p3&limit=1");

    // Later pages first: the first mounted matching mock answers.
    Mock::given(method("GET"))
        .and(path("/admin/api/2021-04/orders.json"))
        .and(query_param("page_info", "p3"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link(&page2, "previous").as_str())
                .set_body_json(json!({"orders": [{"id": 3, "name": "#3"}]})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2021-04/orders.json"))
        .and(query_param("page_info", "p2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Link",
                    format!("{}, {}", link(&base, "previous"), link(&page3, "next")).as_str(),
                )
                .set_body_json(json!({"orders": [{"id": 2, "name": "#2"}]})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2021-04/orders.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link(&page2, "next").as_str())
                .set_body_json(json!({"orders": [{"id": 1, "name": "#1"}]})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_json_follows_next_links() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;

    let shop = create_test_shop(&server);
    let orders: Vec<Order> = shop.list_json("orders.json", "orders").await.unwrap();

    let ids: Vec<u64> = orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[tokio::test]
async fn test_paginator_cursor_per_page() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;

    let shop = create_test_shop(&server);
    let mut pages = shop.paginate("orders.json");

    let first = pages.next_page().await.unwrap().unwrap();
    let cursor: PageCursor = first.cursor();
    assert!(cursor.has_next());
    assert!(!cursor.has_previous());
    assert_eq!(cursor.next_page_info(), Some("p2"));

    let second = pages.next_page().await.unwrap().unwrap();
    assert!(second.cursor().has_previous());
    assert_eq!(second.cursor().next_page_info(), Some("p3"));

    let third = pages.next_page().await.unwrap().unwrap();
    assert!(!third.cursor().has_next());

    assert!(pages.next_page().await.is_none());
    assert_eq!(pages.pages_fetched(), 3);
    assert!(!pages.truncated());
}

#[tokio::test]
async fn test_paginator_page_limit() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;

    let shop = create_test_shop(&server);
    let mut pages = shop.paginate("orders.json").max_pages(2);

    assert!(pages.next_page().await.is_some());
    assert!(pages.next_page().await.is_some());
    assert!(pages.next_page().await.is_none());
    assert_eq!(pages.pages_fetched(), 2);
    assert!(pages.truncated());
}

#[tokio::test]
async fn test_paginator_stops_on_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"errors":"Invalid API key"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let shop = create_test_shop(&server);
    let mut pages = shop.paginate("orders.json");

    assert!(matches!(
        pages.next_page().await,
        Some(Err(HttpError::Unauthorized(_)))
    ));
    assert!(pages.next_page().await.is_none());
}

#[tokio::test]
async fn test_paginator_collect_all_and_cancel() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;

    let shop = create_test_shop(&server);
    let pages = shop.paginate("orders.json").collect_all().await.unwrap();
    assert_eq!(pages.len(), 3);

    let token = CancellationToken::new();
    token.cancel();
    let result = shop
        .paginate("orders.json")
        .cancel_on(token)
        .collect_all()
        .await;
    assert!(matches!(result, Err(HttpError::Cancelled)));
}
