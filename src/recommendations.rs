//! Genre-seeded track recommendations.
//!
//! The builder takes the genre tags of a user's top artists, runs one catalog
//! search per genre and picks a short, deduplicated list of tracks from the
//! results. Within one list no artist and no album appears twice, and a track
//! that was recommended earlier in the same session never comes back.
//!
//! A failing genre search only removes that genre's candidates; the builder
//! itself never fails.

use std::{
    collections::{HashSet, VecDeque},
    str::FromStr,
};

use rand::{Rng, seq::SliceRandom};

use crate::{
    error::CatalogError,
    spotify::catalog::{Catalog, genre_query},
    types::{Artist, TimeRange, Track},
    warning,
};

/// Maximum number of genres a recommendation request is seeded with.
pub const MAX_SEED_GENRES: usize = 5;

/// Upper bound for [`RecommendOptions::cap`].
pub const MAX_CAP: usize = 30;

/// How candidates from the per-genre result lists are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Exhaust the first genre's list, then the next one.
    #[default]
    Sequential,
    /// Take one candidate from every genre per round.
    RoundRobin,
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "sequential" => Ok(SelectionMode::Sequential),
            "round-robin" | "roundrobin" => Ok(SelectionMode::RoundRobin),
            other => Err(format!(
                "Invalid selection mode: '{}'. Use one of: sequential, round-robin",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendOptions {
    /// Tracks requested per genre search.
    pub per_genre_limit: u32,
    /// Maximum length of the resulting list.
    pub cap: usize,
    pub mode: SelectionMode,
    /// Shuffle each genre's results before selecting.
    pub shuffle: bool,
    /// Also skip artists and albums recommended earlier in the session.
    pub exclude_seen_artists: bool,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            per_genre_limit: 10,
            cap: 10,
            mode: SelectionMode::Sequential,
            shuffle: false,
            exclude_seen_artists: true,
        }
    }
}

impl RecommendOptions {
    /// Options for the regenerate action: the session's artist and album
    /// memory is ignored for this one call. Track ids stay excluded.
    pub fn regenerate(&self) -> Self {
        Self {
            exclude_seen_artists: false,
            ..self.clone()
        }
    }

    fn effective_cap(&self) -> usize {
        self.cap.clamp(1, MAX_CAP)
    }
}

/// Everything recommended so far in a session.
///
/// Only ever grows; it is dropped together with the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenState {
    tracks: HashSet<String>,
    artists: HashSet<String>,
    albums: HashSet<String>,
}

impl SeenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, track: &Track) {
        self.tracks.insert(track.id.clone());
        self.artists.insert(track.artist.clone());
        self.albums.insert(track.album.clone());
    }

    /// Folds another snapshot into this one.
    pub fn merge(&mut self, other: SeenState) {
        self.tracks.extend(other.tracks);
        self.artists.extend(other.artists);
        self.albums.extend(other.albums);
    }

    pub fn has_track(&self, id: &str) -> bool {
        self.tracks.contains(id)
    }

    pub fn has_artist(&self, name: &str) -> bool {
        self.artists.contains(name)
    }

    pub fn has_album(&self, name: &str) -> bool {
        self.albums.contains(name)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Genre tags of the given artists in rank order, without duplicates,
/// truncated to `cap`.
pub fn derive_genres(artists: &[Artist], cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    artists
        .iter()
        .flat_map(|a| a.genres.iter())
        .filter(|g| seen.insert(*g))
        .take(cap)
        .cloned()
        .collect()
}

/// Seed genres from the user's recent top artists.
///
/// Tries the short-term window first and falls back to longer ones when it
/// has no artists with genre tags. A rejected token is returned as an error;
/// any other failure only skips that window.
pub async fn seed_genres<C>(catalog: &C, artist_limit: u32) -> Result<Vec<String>, CatalogError>
where
    C: Catalog + Sync,
{
    for time_range in [
        TimeRange::ShortTerm,
        TimeRange::MediumTerm,
        TimeRange::LongTerm,
    ] {
        match catalog.top_artists(time_range, artist_limit).await {
            Ok(artists) => {
                let genres = derive_genres(&artists, MAX_SEED_GENRES);
                if !genres.is_empty() {
                    return Ok(genres);
                }
            }
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => warning!("Failed to load top artists ({}): {}", time_range, e),
        }
    }

    Ok(Vec::new())
}

/// Builds a recommendation list for `genres`, recording accepted tracks in
/// `seen`.
///
/// Searches run one genre at a time. A failed search is reported and that
/// genre contributes nothing. No genres yields an empty list.
pub async fn build_recommendations<C>(
    catalog: &C,
    genres: &[String],
    seen: &mut SeenState,
    options: &RecommendOptions,
) -> Vec<Track>
where
    C: Catalog + Sync,
{
    let mut candidates: Vec<Vec<Track>> = Vec::with_capacity(genres.len());

    for genre in genres.iter().take(MAX_SEED_GENRES) {
        match catalog
            .search_tracks(&genre_query(genre), options.per_genre_limit)
            .await
        {
            Ok(tracks) => candidates.push(tracks),
            Err(e) => warning!("Search for genre '{}' failed: {}", genre, e),
        }
    }

    let mut rng = rand::rng();
    select_tracks(candidates, seen, options, &mut rng)
}

/// Picks tracks from per-genre candidate lists.
///
/// A candidate is accepted when its id has not been seen before in the
/// session and neither its artist nor its album is already part of this
/// list. With [`RecommendOptions::exclude_seen_artists`] artists and albums
/// from earlier lists are rejected as well. Selection stops at the cap or
/// when every list is exhausted.
pub fn select_tracks<R: Rng + ?Sized>(
    mut candidates: Vec<Vec<Track>>,
    seen: &mut SeenState,
    options: &RecommendOptions,
    rng: &mut R,
) -> Vec<Track> {
    if options.shuffle {
        for list in candidates.iter_mut() {
            list.shuffle(rng);
        }
    }

    let cap = options.effective_cap();
    let mut used_artists: HashSet<String> = HashSet::new();
    let mut used_albums: HashSet<String> = HashSet::new();
    let mut picked: Vec<Track> = Vec::with_capacity(cap);

    for track in candidate_order(candidates, options.mode) {
        if picked.len() >= cap {
            break;
        }

        if seen.has_track(&track.id)
            || used_artists.contains(&track.artist)
            || used_albums.contains(&track.album)
        {
            continue;
        }

        if options.exclude_seen_artists
            && (seen.has_artist(&track.artist) || seen.has_album(&track.album))
        {
            continue;
        }

        used_artists.insert(track.artist.clone());
        used_albums.insert(track.album.clone());
        picked.push(track);
    }

    // recorded after the loop so the session memory does not reject
    // candidates on behalf of the per-call sets
    for track in &picked {
        seen.record(track);
    }

    picked
}

fn candidate_order(candidates: Vec<Vec<Track>>, mode: SelectionMode) -> Vec<Track> {
    match mode {
        SelectionMode::Sequential => candidates.into_iter().flatten().collect(),
        SelectionMode::RoundRobin => {
            let mut queues: Vec<VecDeque<Track>> =
                candidates.into_iter().map(VecDeque::from).collect();
            let mut order = Vec::with_capacity(queues.iter().map(|q| q.len()).sum());

            loop {
                let mut progressed = false;
                for queue in queues.iter_mut() {
                    if let Some(track) = queue.pop_front() {
                        order.push(track);
                        progressed = true;
                    }
                }
                if !progressed {
                    break;
                }
            }

            order
        }
    }
}
