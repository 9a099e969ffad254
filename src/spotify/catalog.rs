use std::future::Future;

use reqwest::Client;
use serde_json::Value;

use crate::{
    error::CatalogError,
    spotify::get_json,
    types::{
        ApiArtist, ApiTrack, ApiUser, Artist, Identity, Paging, SearchResponse, TimeRange, Track,
    },
};

/// Largest page the Web API serves for top items and search.
pub const MAX_PAGE_LIMIT: u32 = 50;

/// Read-only queries against the music catalog.
///
/// [`SpotifyCatalog`] is the production implementation; the recommendation
/// builder and the dashboard only depend on this trait.
pub trait Catalog {
    /// The user's most played tracks over `time_range`, best first.
    fn top_tracks(
        &self,
        time_range: TimeRange,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Track>, CatalogError>> + Send;

    /// The user's most played artists over `time_range`, best first.
    fn top_artists(
        &self,
        time_range: TimeRange,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Artist>, CatalogError>> + Send;

    /// Keyword search restricted to tracks.
    fn search_tracks(
        &self,
        query: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Track>, CatalogError>> + Send;
}

/// Web API client bound to one user's access token.
#[derive(Debug, Clone)]
pub struct SpotifyCatalog {
    client: Client,
    api_url: String,
    token: String,
}

impl SpotifyCatalog {
    pub fn new(client: Client, api_url: String, token: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Profile of the token's owner. A missing display name falls back to
    /// the user id.
    pub async fn current_user(&self) -> Result<Identity, CatalogError> {
        let url = format!("{}/me", self.api_url);
        let user: ApiUser = get_json(&self.client, &url, &self.token, &[]).await?;

        Ok(Identity {
            display_name: user
                .display_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| user.id.clone()),
            id: user.id,
        })
    }

    async fn top_page(
        &self,
        kind: &str,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<Value>, CatalogError> {
        let url = format!("{}/me/top/{}", self.api_url, kind);
        let page: Paging<Value> = get_json(
            &self.client,
            &url,
            &self.token,
            &[
                ("time_range", time_range.as_str().to_string()),
                ("limit", clamp_limit(limit).to_string()),
            ],
        )
        .await?;
        Ok(page.items)
    }
}

impl Catalog for SpotifyCatalog {
    async fn top_tracks(
        &self,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError> {
        let items = self.top_page("tracks", time_range, limit).await?;
        Ok(parse_tracks(items))
    }

    async fn top_artists(
        &self,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<Artist>, CatalogError> {
        let items = self.top_page("artists", time_range, limit).await?;
        Ok(parse_artists(items))
    }

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        let url = format!("{}/search", self.api_url);
        let res: SearchResponse = get_json(
            &self.client,
            &url,
            &self.token,
            &[
                ("q", query.to_string()),
                ("type", "track".to_string()),
                ("limit", clamp_limit(limit).to_string()),
            ],
        )
        .await?;

        Ok(res.tracks.map(|p| parse_tracks(p.items)).unwrap_or_default())
    }
}

/// Search query matching tracks by an artist genre tag.
pub fn genre_query(genre: &str) -> String {
    format!("genre:\"{}\"", genre.replace('"', ""))
}

pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_LIMIT)
}

/// Validates raw track items, silently dropping malformed or null entries.
pub fn parse_tracks(items: Vec<Value>) -> Vec<Track> {
    items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<ApiTrack>(v).ok())
        .filter_map(Track::from_api)
        .collect()
}

/// Validates raw artist items, silently dropping malformed or null entries.
pub fn parse_artists(items: Vec<Value>) -> Vec<Artist> {
    items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<ApiArtist>(v).ok())
        .filter_map(Artist::from_api)
        .collect()
}
