//! Client round trips against local backends.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode, Uri},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use httper::{CodecError, ContentType, Error, Method, Params, Request};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Item {
    id: u32,
    name: String,
}

/// Echoes the body back with the request's Content-Type.
async fn echo(headers: HeaderMap, body: Bytes) -> (HeaderMap, Bytes) {
    let mut reply = HeaderMap::new();
    if let Some(ct) = headers.get(header::CONTENT_TYPE) {
        reply.insert(header::CONTENT_TYPE, ct.clone());
    }
    (reply, body)
}

fn router() -> Router {
    Router::new()
        .route("/users", get(|| async { Json(json!([{"id": 1, "name": "ada"}])) }))
        .route("/target", get(|uri: Uri| async move { uri.to_string() }))
        .route("/echo", post(echo).put(echo))
        .route("/malformed", get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{not json") }))
        .route("/text", get(|| async { "plain words" }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        )
}

#[tokio::test]
async fn get_joins_prefix_and_drains_body() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let res = client.get("/users").await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.url().path(), "/users");
    assert_eq!(res.content_type(), Some(ContentType::Json));
    let body: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body[0]["name"], "ada");
}

#[tokio::test]
async fn non_success_status_is_not_an_error() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let res = client.get("/missing").await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text(), "nope");
}

#[tokio::test]
async fn get_json_decodes_into_destination() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let mut items: Vec<Item> = Vec::new();
    client.get_json("/users", &mut items).await.unwrap();
    assert_eq!(
        items,
        vec![Item {
            id: 1,
            name: "ada".into()
        }]
    );
}

#[tokio::test]
async fn get_json_malformed_body_keeps_response() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let mut items = vec![Item::default()];
    let err = client.get_json("/malformed", &mut items).await.unwrap_err();

    assert!(err.is_decode());
    assert!(matches!(
        err,
        Error::Decode {
            source: CodecError::MalformedBody { .. },
            ..
        }
    ));
    // Destination untouched on failure.
    assert_eq!(items, vec![Item::default()]);

    let res = err.into_response().unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(&res.body()[..], b"{not json");
}

#[tokio::test]
async fn post_json_sends_json_and_decodes_reply() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let sent = Item {
        id: 7,
        name: "grace".into(),
    };
    let mut received = Item::default();
    let res = client.post_json("/echo", &sent, &mut received).await.unwrap();

    assert_eq!(res.content_type(), Some(ContentType::Json));
    assert_eq!(received, sent);
}

#[tokio::test]
async fn post_json_reply_of_wrong_shape_is_decode_error() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let mut received = Item::default();
    let err = client
        .post_json("/echo", &json!(["not", "an", "item"]), &mut received)
        .await
        .unwrap_err();

    assert!(err.is_decode());
    assert_eq!(err.response().unwrap().text(), r#"["not","an","item"]"#);
}

#[tokio::test]
async fn execute_resolves_target_like_get() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let via_get = client.get("/target?page=2").await.unwrap();
    let request = Request::new(Params::new(Method::Get, "/target?page=2")).unwrap();
    let via_execute = client.execute(request).await.unwrap();

    assert_eq!(via_get.url(), via_execute.url());
    assert_eq!(via_execute.text(), "/target?page=2");
}

#[tokio::test]
async fn execute_round_trips_xml() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let sent = Item {
        id: 3,
        name: "lovelace".into(),
    };
    let mut received = Item::default();
    let params = Params::new(Method::Post, "/echo")
        .marshal(ContentType::Xml, &sent)
        .unmarshal(ContentType::Xml, &mut received);
    let request = Request::new(params).unwrap();
    assert_eq!(request.headers()[header::CONTENT_TYPE], "application/xml");

    let res = client.execute(request).await.unwrap();
    assert_eq!(res.content_type(), Some(ContentType::Xml));
    assert_eq!(received, sent);
}

#[tokio::test]
async fn execute_sends_raw_bytes_and_decodes_text() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let mut text = String::new();
    let params = Params::new(Method::Put, "/echo")
        .byte_body("raw payload")
        .header(header::CONTENT_TYPE, "text/plain".parse().unwrap())
        .unmarshal(ContentType::Text, &mut text);

    client.execute(Request::new(params).unwrap()).await.unwrap();
    assert_eq!(text, "raw payload");
}

#[tokio::test]
async fn execute_without_unmarshal_leaves_body_raw() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let request = Request::new(Params::new(Method::Get, "/malformed")).unwrap();
    assert!(!request.need_unmarshal());

    let res = client.execute(request).await.unwrap();
    assert_eq!(res.text(), "{not json");
}

#[tokio::test]
async fn execute_text_into_struct_is_incompatible() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let mut item = Item::default();
    let params = Params::new(Method::Get, "/text").unmarshal(ContentType::Text, &mut item);
    let err = client.execute(Request::new(params).unwrap()).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Decode {
            source: CodecError::IncompatibleDestinationType { .. },
            ..
        }
    ));
    assert_eq!(err.response().unwrap().text(), "plain words");
}

#[tokio::test]
async fn execute_unsupported_decode_type_is_reported() {
    let addr = common::start_backend(router()).await;
    let client = common::client(&format!("http://{addr}"));

    let mut text = String::new();
    let params = Params::new(Method::Get, "/text").unmarshal(ContentType::from("image/png"), &mut text);
    let err = client.execute(Request::new(params).unwrap()).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Decode {
            source: CodecError::UnsupportedContentType(_),
            ..
        }
    ));
}

#[tokio::test]
async fn free_functions_use_the_default_client() {
    let addr = common::start_backend(router()).await;

    let mut items: Vec<Item> = Vec::new();
    let res = httper::get_json(&format!("http://{addr}/users"), &mut items).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(items[0].name, "ada");

    let sent = Item {
        id: 9,
        name: "hopper".into(),
    };
    let mut received = Item::default();
    httper::post_json(&format!("http://{addr}/echo"), &sent, &mut received)
        .await
        .unwrap();
    assert_eq!(received, sent);

    let mut text = String::new();
    let params = Params::new(Method::Get, format!("http://{addr}/text")).unmarshal(ContentType::Text, &mut text);
    httper::execute(Request::new(params).unwrap()).await.unwrap();
    assert_eq!(text, "plain words");
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let addr = common::closed_addr().await;
    let client = common::client(&format!("http://{addr}"));

    let err = client.get("/users").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.response().is_none());
}

#[tokio::test]
async fn truncated_body_is_body_read_error() {
    let addr = common::start_raw_backend(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 100\r\n\r\nshort",
    )
    .await;
    let client = common::client(&format!("http://{addr}"));

    let err = client.get("/").await.unwrap_err();
    assert!(matches!(err, Error::BodyRead(_)), "got {err:?}");
}

#[tokio::test]
async fn timeout_surfaces_as_transport_error() {
    let addr = common::start_backend(router()).await;
    let transport = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let client = httper::Client::with_transport(transport, format!("http://{addr}"));

    let err = client.get("/slow").await.unwrap_err();
    match err {
        Error::Transport(e) => assert!(e.is_timeout()),
        other => panic!("expected transport timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_url_fails_before_sending() {
    let client = common::client("");
    let err = client.get("/relative/only").await.unwrap_err();
    assert!(matches!(err, Error::InvalidUrl { .. }));
}

#[tokio::test]
async fn one_client_serves_concurrent_tasks() {
    let addr = common::start_backend(router()).await;
    let client = Arc::new(common::client(&format!("http://{addr}")));

    let handles: Vec<_> = (0..8)
        .map(|id| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                let sent = Item {
                    id,
                    name: format!("task-{id}"),
                };
                let mut received = Item::default();
                client.post_json("/echo", &sent, &mut received).await.unwrap();
                assert_eq!(received, sent);
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }
}
