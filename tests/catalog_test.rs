use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::get,
};
use reqwest::Client;
use serde_json::{Value, json};
use spotrec::{
    error::CatalogError,
    spotify::catalog::*,
    types::TimeRange,
};

fn raw_track(id: &str, artist: &str, album: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Song {id}"),
        "artists": [{ "id": format!("{artist}-id"), "name": artist }],
        "album": {
            "id": format!("{album}-id"),
            "name": album,
            "images": [{ "url": format!("https://i.scdn.co/image/{id}") }]
        },
        "external_urls": { "spotify": format!("https://open.spotify.com/track/{id}") }
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some("Bearer good-token")
}

async fn top_tracks(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if q.get("time_range").map(String::as_str) != Some("medium_term") {
        return Json(json!({ "items": [] })).into_response();
    }
    Json(json!({
        "items": [
            raw_track("t1", "Low", "Things We Lost in the Fire"),
            null,
            { "id": "broken", "name": "No artists" },
            raw_track("t2", "Slint", "Spiderland")
        ]
    }))
    .into_response()
}

async fn top_artists(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "items": [
            {
                "id": "a1",
                "name": "Low",
                "genres": ["slowcore", "slowcore", "indie rock"],
                "images": []
            },
            { "id": "", "name": "Nameless" },
            { "id": "a2", "name": "Slint" }
        ]
    }))
    .into_response()
}

async fn search(Query(q): Query<HashMap<String, String>>) -> Response {
    match q.get("q").map(String::as_str) {
        Some("genre:\"slowcore\"") => {
            let limit: usize = q.get("limit").and_then(|l| l.parse().ok()).unwrap_or(0);
            let items: Vec<Value> = (0..limit)
                .map(|i| raw_track(&format!("s{i}"), "Codeine", "Frigid Stars"))
                .collect();
            Json(json!({ "tracks": { "items": items } })).into_response()
        }
        Some("genre:\"rate limited\"") => {
            (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "0")]).into_response()
        }
        Some("genre:\"slow down\"") => {
            (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "600")]).into_response()
        }
        Some("genre:\"broken\"") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Some("genre:\"garbled\"") => "<html>maintenance</html>".into_response(),
        Some("genre:\"wrong shape\"") => {
            Json(json!({ "tracks": { "items": "none" } })).into_response()
        }
        _ => Json(json!({})).into_response(),
    }
}

async fn me() -> Json<Value> {
    Json(json!({ "id": "listener42", "display_name": null }))
}

async fn start_fake_api() -> String {
    let app = Router::new()
        .route("/v1/me", get(me))
        .route("/v1/me/top/tracks", get(top_tracks))
        .route("/v1/me/top/artists", get(top_artists))
        .route("/v1/search", get(search));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1/")
}

async fn catalog(token: &str) -> SpotifyCatalog {
    SpotifyCatalog::new(Client::new(), start_fake_api().await, token.to_string())
}

#[tokio::test]
async fn test_top_tracks_drops_malformed_items() {
    let catalog = catalog("good-token").await;

    let tracks = catalog.top_tracks(TimeRange::MediumTerm, 10).await.unwrap();

    let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2"]);
    assert_eq!(tracks[0].artist, "Low");
    assert_eq!(tracks[0].album, "Things We Lost in the Fire");
    assert_eq!(tracks[0].url, "https://open.spotify.com/track/t1");
    assert_eq!(tracks[0].image_url.as_deref(), Some("https://i.scdn.co/image/t1"));

    assert!(catalog.top_tracks(TimeRange::ShortTerm, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_top_artists_are_validated() {
    let catalog = catalog("good-token").await;

    let artists = catalog.top_artists(TimeRange::LongTerm, 10).await.unwrap();

    assert_eq!(artists.len(), 2);
    assert_eq!(artists[0].genres, vec!["slowcore", "indie rock"]);
    assert!(artists[1].genres.is_empty());
    assert_eq!(artists[1].image_url, None);
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let catalog = catalog("stale-token").await;

    let err = catalog.top_tracks(TimeRange::MediumTerm, 10).await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_search_tracks_by_genre() {
    let catalog = catalog("good-token").await;

    let tracks = catalog.search_tracks(&genre_query("slowcore"), 4).await.unwrap();
    assert_eq!(tracks.len(), 4);

    // limits are clamped to what the API serves
    let tracks = catalog.search_tracks(&genre_query("slowcore"), 500).await.unwrap();
    assert_eq!(tracks.len(), MAX_PAGE_LIMIT as usize);

    // a response without a tracks page is an empty result
    assert!(catalog.search_tracks("genre:\"unknown\"", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_errors() {
    let catalog = catalog("good-token").await;

    let err = catalog.search_tracks(&genre_query("broken"), 5).await.unwrap_err();
    assert!(matches!(err, CatalogError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    assert!(!err.is_unauthorized());

    let err = catalog.search_tracks(&genre_query("rate limited"), 5).await.unwrap_err();
    assert!(matches!(err, CatalogError::RateLimited(0)));

    let err = catalog.search_tracks(&genre_query("slow down"), 5).await.unwrap_err();
    assert!(matches!(err, CatalogError::RateLimited(600)));
}

#[tokio::test]
async fn test_undecodable_body_is_malformed() {
    let catalog = catalog("good-token").await;

    let err = catalog.search_tracks(&genre_query("garbled"), 5).await.unwrap_err();
    assert!(matches!(err, CatalogError::Malformed(_)));
    assert!(!err.is_unauthorized());

    let err = catalog.search_tracks(&genre_query("wrong shape"), 5).await.unwrap_err();
    assert!(matches!(err, CatalogError::Malformed(_)));
}

#[tokio::test]
async fn test_current_user_falls_back_to_id() {
    let catalog = catalog("good-token").await;

    let identity = catalog.current_user().await.unwrap();
    assert_eq!(identity.id, "listener42");
    assert_eq!(identity.display_name, "listener42");
}

#[test]
fn test_parse_tracks_requires_all_fields() {
    let mut no_link = raw_track("x", "A", "B");
    no_link["external_urls"] = json!({});
    let mut no_album_name = raw_track("y", "A", "B");
    no_album_name["album"]["name"] = Value::Null;
    let mut wrong_type = raw_track("z", "A", "B");
    wrong_type["id"] = json!(42);

    let tracks = parse_tracks(vec![
        no_link,
        no_album_name,
        wrong_type,
        json!("not an object"),
        raw_track("ok", "A", "B"),
    ]);

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "ok");
}

#[test]
fn test_parse_artists_collapses_genres() {
    let artists = parse_artists(vec![
        json!({ "id": "1", "name": "Low", "genres": ["slowcore", "", "slowcore"] }),
        json!({ "name": "No id" }),
        Value::Null,
    ]);

    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].genres, vec!["slowcore"]);
}

#[test]
fn test_genre_query() {
    assert_eq!(genre_query("indie rock"), "genre:\"indie rock\"");
    assert_eq!(genre_query("say \"hi\""), "genre:\"say hi\"");
}

#[test]
fn test_clamp_limit() {
    assert_eq!(clamp_limit(0), 1);
    assert_eq!(clamp_limit(10), 10);
    assert_eq!(clamp_limit(51), MAX_PAGE_LIMIT);
}
