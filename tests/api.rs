use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bookstore::App;
use bookstore_db::{Database, PoolConfig};
use bookstore_kernel::settings::Settings;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn app() -> Router {
    let db = Database::in_memory().await.unwrap();
    App::with_database(Settings::default(), db)
        .await
        .unwrap()
        .router()
}

async fn open_file(url: &str) -> App {
    let db = Database::connect(url, &PoolConfig::default()).await.unwrap();
    App::with_database(Settings::default(), db).await.unwrap()
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };

    Response {
        status,
        headers,
        body,
    }
}

async fn get(router: &Router, uri: &str) -> Response {
    send(router, Method::GET, uri, None).await
}

async fn post(router: &Router, uri: &str, body: Value) -> Response {
    send(router, Method::POST, uri, Some(body)).await
}

async fn put(router: &Router, uri: &str, body: Value) -> Response {
    send(router, Method::PUT, uri, Some(body)).await
}

async fn delete(router: &Router, uri: &str) -> Response {
    send(router, Method::DELETE, uri, None).await
}

fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}

fn dune() -> Value {
    json!({
        "name": "Dune",
        "genre": "Science Fiction",
        "price": 15,
        "releaseDate": "1965-08-01"
    })
}

#[tokio::test]
async fn fresh_database_is_seeded() {
    let router = app().await;

    let genres = get(&router, "/genres").await;
    assert_eq!(genres.status, StatusCode::OK);
    assert_eq!(
        names(&genres.body),
        vec!["Fiction", "Non-Fiction", "Science Fiction", "Fantasy", "Mystery"]
    );

    let books = get(&router, "/books").await;
    assert_eq!(books.status, StatusCode::OK);
    assert_eq!(
        names(&books.body),
        vec!["Antifragile", "Out of Control", "The One Thing"]
    );
    for book in books.body.as_array().unwrap() {
        assert_eq!(book["genre"], "Non-Fiction");
    }
    assert_eq!(books.body[1]["price"], 20.11);
    assert_eq!(books.body[1]["releaseDate"], "1991-01-01");
}

#[tokio::test]
async fn restart_does_not_reseed() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("catalog.db").display());

    let first = open_file(&url).await;
    let router = first.router();
    assert_eq!(delete(&router, "/books/1").await.status, StatusCode::NO_CONTENT);
    first.close().await;

    let second = open_file(&url).await;
    let router = second.router();
    assert_eq!(get(&router, "/genres").await.body.as_array().unwrap().len(), 5);
    assert_eq!(
        names(&get(&router, "/books").await.body),
        vec!["Out of Control", "The One Thing"]
    );
    second.close().await;
}

#[tokio::test]
async fn created_book_round_trips() {
    let router = app().await;

    let created = post(&router, "/books", dune()).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_i64().unwrap();
    assert_eq!(
        created.headers[header::LOCATION].to_str().unwrap(),
        format!("/books/{id}")
    );

    let fetched = get(&router, &format!("/books/{id}")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(
        fetched.body,
        json!({
            "id": id,
            "name": "Dune",
            "genre": "Science Fiction",
            "price": 15.0,
            "releaseDate": "1965-08-01"
        })
    );
    assert_eq!(created.body, fetched.body);
}

#[tokio::test]
async fn genre_is_resolved_ignoring_case() {
    let router = app().await;

    let mut body = dune();
    body["genre"] = json!("sCIENCE fICTION");
    let created = post(&router, "/books", body).await;

    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["genre"], "Science Fiction");
}

#[tokio::test]
async fn unknown_genre_is_a_client_error() {
    let router = app().await;

    let mut body = dune();
    body["genre"] = json!("Cookbooks");
    let created = post(&router, "/books", body).await;

    assert_eq!(created.status, StatusCode::BAD_REQUEST);
    assert!(created.body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Cookbooks"));
    assert_eq!(get(&router, "/books").await.body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn failed_update_leaves_book_untouched() {
    let router = app().await;
    let before = get(&router, "/books/1").await.body;

    let updated = put(
        &router,
        "/books/1",
        json!({
            "name": "Renamed",
            "genre": "Cookbooks",
            "price": 99,
            "releaseDate": "2020-02-02"
        }),
    )
    .await;

    assert_eq!(updated.status, StatusCode::BAD_REQUEST);
    assert_eq!(get(&router, "/books/1").await.body, before);
}

#[tokio::test]
async fn update_replaces_every_field() {
    let router = app().await;

    let updated = put(
        &router,
        "/books/2",
        json!({
            "name": "Out of Control (2nd ed.)",
            "genre": "fantasy",
            "price": "24.50",
            "releaseDate": "1994-05-01"
        }),
    )
    .await;
    assert_eq!(updated.status, StatusCode::NO_CONTENT);

    let fetched = get(&router, "/books/2").await.body;
    assert_eq!(fetched["name"], "Out of Control (2nd ed.)");
    assert_eq!(fetched["genre"], "Fantasy");
    assert_eq!(fetched["price"], 24.5);
    assert_eq!(fetched["releaseDate"], "1994-05-01");

    assert_eq!(put(&router, "/books/999", dune()).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_book_is_not_found() {
    let router = app().await;

    let fetched = get(&router, "/books/999").await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
    assert_eq!(fetched.body["error"]["code"], "not_found");

    assert_eq!(delete(&router, "/books/3").await.status, StatusCode::NO_CONTENT);
    assert_eq!(get(&router, "/books/3").await.status, StatusCode::NOT_FOUND);
    assert_eq!(delete(&router, "/books/3").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_book_input_is_rejected() {
    let router = app().await;

    let cases = [
        json!({ "name": "", "genre": "Fiction", "price": 10, "releaseDate": "2000-01-01" }),
        json!({ "name": "x".repeat(51), "genre": "Fiction", "price": 10, "releaseDate": "2000-01-01" }),
        json!({ "name": "Ok", "genre": "g".repeat(21), "price": 10, "releaseDate": "2000-01-01" }),
        json!({ "name": "Ok", "genre": "Fiction", "price": 0.5, "releaseDate": "2000-01-01" }),
        json!({ "name": "Ok", "genre": "Fiction", "price": 101, "releaseDate": "2000-01-01" }),
        json!({ "name": "Ok", "genre": "Fiction", "price": 10 }),
        json!({ "name": "Ok", "genre": "Fiction", "price": 10, "releaseDate": "2000-13-45" }),
    ];

    for body in cases {
        let created = post(&router, "/books", body.clone()).await;
        assert_eq!(created.status, StatusCode::BAD_REQUEST, "accepted {body}");
        assert_eq!(created.body["error"]["code"], "validation_error");
    }
    assert_eq!(get(&router, "/books").await.body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn genre_crud() {
    let router = app().await;

    let created = post(&router, "/genres", json!({ "name": "Poetry" })).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_i64().unwrap();
    assert_eq!(created.body, json!({ "id": id, "name": "Poetry" }));
    assert_eq!(
        created.headers[header::LOCATION].to_str().unwrap(),
        format!("/genres/{id}")
    );

    let fetched = get(&router, &format!("/genres/{id}")).await;
    assert_eq!(fetched.body, created.body);

    let renamed = put(&router, &format!("/genres/{id}"), json!({ "name": "Verse" })).await;
    assert_eq!(renamed.status, StatusCode::NO_CONTENT);
    assert_eq!(get(&router, &format!("/genres/{id}")).await.body["name"], "Verse");

    assert_eq!(get(&router, "/genres/999").await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        put(&router, "/genres/999", json!({ "name": "Ghost" })).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn genre_names_are_unique_ignoring_case() {
    let router = app().await;

    let first = post(&router, "/genres", json!({ "name": "Horror" })).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = post(&router, "/genres", json!({ "name": "HORROR" })).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error"]["message"], "Genre 'HORROR' already exists");

    // Taking another genre's name conflicts; recasing your own does not
    let clash = put(&router, "/genres/1", json!({ "name": "fantasy" })).await;
    assert_eq!(clash.status, StatusCode::CONFLICT);

    let recased = put(&router, "/genres/1", json!({ "name": "FICTION" })).await;
    assert_eq!(recased.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn non_ascii_genre_names_match_ignoring_case() {
    let router = app().await;

    let created = post(&router, "/genres", json!({ "name": "Élan" })).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_i64().unwrap();

    let duplicate = post(&router, "/genres", json!({ "name": "élan" })).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    for genre in ["Élan", "élan", "ÉLAN"] {
        let book = json!({
            "name": "Rayuela",
            "genre": genre,
            "price": 18.5,
            "releaseDate": "1963-06-28"
        });
        let created = post(&router, "/books", book).await;
        assert_eq!(created.status, StatusCode::CREATED, "rejected genre {genre}");
        assert_eq!(created.body["genre"], "Élan");
    }

    let renamed = put(&router, &format!("/genres/{id}"), json!({ "name": "Ödland" })).await;
    assert_eq!(renamed.status, StatusCode::NO_CONTENT);
    let clash = post(&router, "/genres", json!({ "name": "ödland" })).await;
    assert_eq!(clash.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_genre_input_is_rejected() {
    let router = app().await;

    for body in [json!({ "name": "" }), json!({ "name": "x".repeat(31) }), json!({})] {
        let created = post(&router, "/genres", body).await;
        assert_eq!(created.status, StatusCode::BAD_REQUEST);
    }

    let renamed = put(&router, "/genres/1", json!({ "name": "  " })).await;
    assert_eq!(renamed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn referenced_genre_cannot_be_deleted() {
    let router = app().await;

    // Non-Fiction holds every seeded book
    let refused = delete(&router, "/genres/2").await;
    assert_eq!(refused.status, StatusCode::BAD_REQUEST);
    assert_eq!(get(&router, "/genres/2").await.status, StatusCode::OK);

    let removed = delete(&router, "/genres/5").await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert!(!names(&get(&router, "/genres").await.body).contains(&"Mystery".to_string()));

    assert_eq!(delete(&router, "/genres/5").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn books_show_the_current_genre_name() {
    let router = app().await;

    let renamed = put(&router, "/genres/2", json!({ "name": "Nonfiction" })).await;
    assert_eq!(renamed.status, StatusCode::NO_CONTENT);

    let books = get(&router, "/books").await.body;
    for book in books.as_array().unwrap() {
        assert_eq!(book["genre"], "Nonfiction");
    }
}

#[tokio::test]
async fn health_and_docs_are_served() {
    let router = app().await;

    let health = get(&router, "/healthz").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, json!("ok"));

    let docs = get(&router, "/docs/openapi.json").await;
    assert_eq!(docs.status, StatusCode::OK);
    assert!(docs.body["paths"]["/books"]["post"].is_object());
    assert!(docs.body["paths"]["/genres/{id}"]["delete"].is_object());
    assert!(docs.body["components"]["schemas"]["Book"].is_object());
}

#[tokio::test]
async fn health_fails_once_the_database_is_gone() {
    let db = Database::in_memory().await.unwrap();
    let app = App::with_database(Settings::default(), db).await.unwrap();
    let router = app.router();
    app.close().await;

    let health = get(&router, "/healthz").await;
    assert_eq!(health.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(health.body["error"]["code"], "internal_error");
}
