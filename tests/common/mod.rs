#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::Mutex,
};

use reqwest::StatusCode;
use spotrec::{
    error::CatalogError,
    spotify::catalog::{Catalog, genre_query},
    types::{Artist, TimeRange, Track},
};

/// In-memory catalog with canned answers.
#[derive(Default)]
pub struct FakeCatalog {
    pub searches: HashMap<String, Result<Vec<Track>, StatusCode>>,
    pub top_tracks: HashMap<TimeRange, Result<Vec<Track>, StatusCode>>,
    pub top_artists: HashMap<TimeRange, Result<Vec<Artist>, StatusCode>>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genre(mut self, genre: &str, tracks: Vec<Track>) -> Self {
        self.searches.insert(genre_query(genre), Ok(tracks));
        self
    }

    pub fn with_failing_genre(mut self, genre: &str) -> Self {
        self.searches
            .insert(genre_query(genre), Err(StatusCode::INTERNAL_SERVER_ERROR));
        self
    }

    pub fn with_top(mut self, range: TimeRange, tracks: Vec<Track>, artists: Vec<Artist>) -> Self {
        self.top_tracks.insert(range, Ok(tracks));
        self.top_artists.insert(range, Ok(artists));
        self
    }

    pub fn with_failing_top(mut self, range: TimeRange, status: StatusCode) -> Self {
        self.top_tracks.insert(range, Err(status));
        self.top_artists.insert(range, Err(status));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Catalog for FakeCatalog {
    async fn top_tracks(
        &self,
        time_range: TimeRange,
        _limit: u32,
    ) -> Result<Vec<Track>, CatalogError> {
        match self.top_tracks.get(&time_range) {
            Some(Ok(tracks)) => Ok(tracks.clone()),
            Some(Err(status)) => Err(CatalogError::Status(*status)),
            None => Ok(Vec::new()),
        }
    }

    async fn top_artists(
        &self,
        time_range: TimeRange,
        _limit: u32,
    ) -> Result<Vec<Artist>, CatalogError> {
        match self.top_artists.get(&time_range) {
            Some(Ok(artists)) => Ok(artists.clone()),
            Some(Err(status)) => Err(CatalogError::Status(*status)),
            None => Ok(Vec::new()),
        }
    }

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        self.queries.lock().unwrap().push(query.to_string());
        match self.searches.get(query) {
            Some(Ok(tracks)) => Ok(tracks.iter().take(limit as usize).cloned().collect()),
            Some(Err(status)) => Err(CatalogError::Status(*status)),
            None => Ok(Vec::new()),
        }
    }
}

pub fn track(id: &str, artist: &str, album: &str) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Song {}", id),
        artist: artist.to_string(),
        album: album.to_string(),
        image_url: Some(format!("https://i.scdn.co/image/{}", id)),
        url: format!("https://open.spotify.com/track/{}", id),
    }
}

/// Track whose artist and album are unique to its id.
pub fn solo(id: &str) -> Track {
    track(id, &format!("artist-{}", id), &format!("album-{}", id))
}

pub fn artist(id: &str, name: &str, genres: &[&str]) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        image_url: None,
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

pub fn ids(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(|t| t.id.as_str()).collect()
}
