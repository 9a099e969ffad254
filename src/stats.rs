//! Dashboard data: top tracks, artists, genres and albums.

use crate::{
    error::{AppError, CatalogError},
    recommendations::{MAX_SEED_GENRES, derive_genres},
    spotify::catalog::Catalog,
    types::{Artist, Dashboard, TimeRange, Track},
    utils, warning,
};

/// Number of top tracks and artists shown on the dashboard.
pub const TOP_ITEMS_LIMIT: u32 = 10;

/// Loads the dashboard, falling back from the long-term window to shorter
/// ones until one has both top tracks and top artists.
///
/// # Errors
///
/// - [`AppError::NoData`] when no window has both kinds of items
/// - [`AppError::CatalogQuery`] when the token was rejected, so the caller can
///   send the user back to the login page
pub async fn load_dashboard<C>(catalog: &C, limit: u32) -> Result<Dashboard, AppError>
where
    C: Catalog + Sync,
{
    load_dashboard_in(catalog, &TimeRange::FALLBACK, limit).await
}

/// Like [`load_dashboard`] but only looks at the given windows, in order.
pub async fn load_dashboard_in<C>(
    catalog: &C,
    time_ranges: &[TimeRange],
    limit: u32,
) -> Result<Dashboard, AppError>
where
    C: Catalog + Sync,
{
    for &time_range in time_ranges {
        let tracks = top_or_empty(
            catalog.top_tracks(time_range, limit).await,
            "tracks",
            time_range,
        )?;
        let artists = top_or_empty(
            catalog.top_artists(time_range, limit).await,
            "artists",
            time_range,
        )?;

        if !tracks.is_empty() && !artists.is_empty() {
            return Ok(build_dashboard(time_range, tracks, artists));
        }
    }

    Err(AppError::NoData)
}

pub fn build_dashboard(
    time_range: TimeRange,
    tracks: Vec<Track>,
    artists: Vec<Artist>,
) -> Dashboard {
    Dashboard {
        time_range,
        genres: derive_genres(&artists, MAX_SEED_GENRES),
        albums: utils::top_albums(&tracks),
        tracks,
        artists,
    }
}

fn top_or_empty<T>(
    result: Result<Vec<T>, CatalogError>,
    kind: &str,
    time_range: TimeRange,
) -> Result<Vec<T>, AppError> {
    match result {
        Ok(items) => Ok(items),
        Err(e) if e.is_unauthorized() => Err(AppError::CatalogQuery(e)),
        Err(e) => {
            warning!("Failed to load top {} ({}): {}", kind, time_range, e);
            Ok(Vec::new())
        }
    }
}
