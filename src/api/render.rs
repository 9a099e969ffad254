//! Server-rendered HTML for the web app.

use crate::{
    types::{Dashboard, Identity, Track},
    utils::escape_html,
};

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;background:#121212;color:#eee}\
a{color:#1db954}\
ul.items{list-style:none;padding:0}\
ul.items li{display:flex;align-items:center;gap:.75rem;margin:.4rem 0}\
ul.items img{width:48px;height:48px;object-fit:cover;border-radius:4px}\
.genres span{display:inline-block;background:#282828;border-radius:1rem;padding:.2rem .7rem;margin:.2rem}\
form{display:inline-block;margin-right:.5rem}\
button{background:#1db954;color:#000;border:0;border-radius:1rem;padding:.4rem 1rem;cursor:pointer}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title><style>{STYLE}</style></head><body>{body}</body></html>",
        title = escape_html(title),
    )
}

fn image(url: Option<&str>) -> String {
    match url {
        Some(url) => format!("<img src=\"{}\" alt=\"\">", escape_html(url)),
        None => String::new(),
    }
}

fn header(identity: Option<&Identity>) -> String {
    match identity {
        Some(identity) => format!(
            "<p>Logged in as <strong>{}</strong> · <a href=\"/logout\">Log out</a></p>",
            escape_html(&identity.display_name)
        ),
        None => String::new(),
    }
}

pub fn login_page() -> String {
    page(
        "spotrec",
        "<h1>spotrec</h1><p>See your top tracks, artists and genres and get a few new tracks to try.</p>\
<p><a href=\"/login\"><button>Log in with Spotify</button></a></p>",
    )
}

pub fn auth_failed_page(message: &str) -> String {
    page(
        "Authentication failed",
        &format!(
            "<h1>Authentication failed</h1><p>{}</p><p><a href=\"/login\">Try again</a></p>",
            escape_html(message)
        ),
    )
}

pub fn no_data_page(identity: Option<&Identity>) -> String {
    page(
        "Not enough data",
        &format!(
            "{}<h1>Not enough listening data yet</h1><p>Spotify has no top tracks or artists for this account. Listen to some music and come back later.</p>",
            header(identity)
        ),
    )
}

pub fn error_page(message: &str) -> String {
    page(
        "Something went wrong",
        &format!(
            "<h1>Something went wrong</h1><p>{}</p><p><a href=\"/dashboard\">Back</a></p>",
            escape_html(message)
        ),
    )
}

pub fn dashboard_page(
    identity: Option<&Identity>,
    dashboard: &Dashboard,
    recommendations: &[Track],
) -> String {
    let tracks: String = dashboard
        .tracks
        .iter()
        .map(|t| {
            format!(
                "<li>{}<span><a href=\"{}\">{}</a> · {}</span></li>",
                image(t.image_url.as_deref()),
                escape_html(&t.url),
                escape_html(&t.name),
                escape_html(&t.artist)
            )
        })
        .collect();

    let artists: String = dashboard
        .artists
        .iter()
        .map(|a| {
            format!(
                "<li>{}<span>{}</span></li>",
                image(a.image_url.as_deref()),
                escape_html(&a.name)
            )
        })
        .collect();

    let genres: String = dashboard
        .genres
        .iter()
        .map(|g| format!("<span>{}</span>", escape_html(g)))
        .collect();

    let albums: String = dashboard
        .albums
        .iter()
        .map(|a| {
            format!(
                "<li>{}<span>{} · {}</span></li>",
                image(a.image_url.as_deref()),
                escape_html(&a.name),
                escape_html(&a.artist)
            )
        })
        .collect();

    let body = format!(
        "{header}<h1>Your top music</h1><p>Time range: {range}</p>\
<h2>Top tracks</h2><ul class=\"items\">{tracks}</ul>\
<h2>Top artists</h2><ul class=\"items\">{artists}</ul>\
<h2>Top genres</h2><div class=\"genres\">{genres}</div>\
<h2>Top albums</h2><ul class=\"items\">{albums}</ul>\
{recommendations}",
        header = header(identity),
        range = dashboard.time_range,
        recommendations = recommendations_section(recommendations),
    );

    page("Your top music", &body)
}

fn recommendations_section(recommendations: &[Track]) -> String {
    let controls = "<form method=\"post\" action=\"/recommendations\">\
<select name=\"mode\"><option value=\"sequential\">By genre</option><option value=\"round-robin\">Mixed genres</option></select> \
<button type=\"submit\">Get recommendations</button></form>\
<form method=\"post\" action=\"/recommendations\"><input type=\"hidden\" name=\"regenerate\" value=\"1\">\
<button type=\"submit\">Regenerate</button></form>";

    if recommendations.is_empty() {
        return format!("<h2>Recommendations</h2>{controls}");
    }

    let items: String = recommendations
        .iter()
        .map(|t| {
            format!(
                "<li>{}<span><a href=\"{}\">{}</a> · {} · {}</span></li>",
                image(t.image_url.as_deref()),
                escape_html(&t.url),
                escape_html(&t.name),
                escape_html(&t.artist),
                escape_html(&t.album)
            )
        })
        .collect();

    format!("<h2>Recommendations</h2>{controls}<ul class=\"items\">{items}</ul>")
}
