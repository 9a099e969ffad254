use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    /// Unix timestamp (seconds) at which the access token stops working.
    pub fn expires_at(&self) -> u64 {
        self.obtained_at.saturating_add(self.expires_in)
    }
}

/// Login handshake in flight for the CLI: the PKCE verifier and `state` sent
/// with the authorize URL, and the token once the callback has exchanged it.
#[derive(Debug, Clone)]
pub struct PkceToken {
    pub state: String,
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// The logged-in Spotify account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub image_url: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub genres: Vec<String>,
}

impl Track {
    /// Validates a raw Web API track. Entries without an id, name, primary
    /// artist, album name or Spotify link are rejected.
    pub fn from_api(raw: ApiTrack) -> Option<Self> {
        let artist = raw.artists.into_iter().next()?.name.filter(|n| !n.is_empty())?;
        let album = raw.album?;
        let mut external_urls = raw.external_urls;

        Some(Track {
            id: raw.id.filter(|id| !id.is_empty())?,
            name: raw.name?,
            artist,
            album: album.name.filter(|n| !n.is_empty())?,
            image_url: first_image(album.images),
            url: external_urls.remove("spotify")?,
        })
    }
}

impl Artist {
    /// Validates a raw Web API artist. Duplicate genre tags are collapsed.
    pub fn from_api(raw: ApiArtist) -> Option<Self> {
        let mut genres: Vec<String> = Vec::with_capacity(raw.genres.len());
        for genre in raw.genres {
            if !genre.is_empty() && !genres.contains(&genre) {
                genres.push(genre);
            }
        }

        Some(Artist {
            id: raw.id.filter(|id| !id.is_empty())?,
            name: raw.name.filter(|n| !n.is_empty())?,
            image_url: first_image(raw.images),
            genres,
        })
    }
}

fn first_image(images: Vec<ApiImage>) -> Option<String> {
    images.into_iter().next().and_then(|i| i.url)
}

/// An album derived from the user's top tracks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlbumSummary {
    pub name: String,
    pub artist: String,
    pub image_url: Option<String>,
}

/// Provider-defined window the top items are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeRange {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    /// Order in which the dashboard falls back when a window has no data.
    pub const FALLBACK: [TimeRange; 3] = [
        TimeRange::LongTerm,
        TimeRange::MediumTerm,
        TimeRange::ShortTerm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "short" | "short_term" => Ok(TimeRange::ShortTerm),
            "medium" | "medium_term" => Ok(TimeRange::MediumTerm),
            "long" | "long_term" => Ok(TimeRange::LongTerm),
            other => Err(format!(
                "Invalid time range: '{}'. Use one of: short, medium, long",
                other
            )),
        }
    }
}

/// Everything the stats page shows.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub time_range: TimeRange,
    pub tracks: Vec<Track>,
    pub artists: Vec<Artist>,
    pub genres: Vec<String>,
    pub albums: Vec<AlbumSummary>,
}

// Raw Web API shapes. Every field is optional so a single malformed entry
// can be dropped at the boundary instead of failing the whole page.

#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<Paging<serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiImage {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiArtistRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiAlbum {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<ApiImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiTrack {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<ApiArtistRef>,
    pub album: Option<ApiAlbum>,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiArtist {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<ApiImage>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    pub name: String,
    pub artist: String,
    pub album: String,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    pub name: String,
    pub genres: String,
}

#[derive(Tabled)]
pub struct AlbumTableRow {
    pub name: String,
    pub artist: String,
}

#[derive(Tabled)]
pub struct RecommendationTableRow {
    pub name: String,
    pub artist: String,
    pub album: String,
    pub link: String,
}
