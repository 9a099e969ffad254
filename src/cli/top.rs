use tabled::Table;

use crate::{
    cli::{auth::login_catalog, spinner},
    error,
    error::AppError,
    info, stats,
    types::{AlbumTableRow, ArtistTableRow, TimeRange, TrackTableRow},
    warning,
};

pub async fn top(time_range: Option<TimeRange>, limit: u32) {
    let catalog = match login_catalog().await {
        Ok(catalog) => catalog,
        Err(e) => error!("Login failed. Err: {}", e),
    };

    let pb = spinner("Fetching your top music...");
    let result = match time_range {
        Some(range) => stats::load_dashboard_in(&catalog, &[range], limit).await,
        None => stats::load_dashboard(&catalog, limit).await,
    };
    pb.finish_and_clear();

    let dashboard = match result {
        Ok(dashboard) => dashboard,
        Err(AppError::NoData) => {
            warning!("Spotify has no top tracks or artists for this account yet.");
            return;
        }
        Err(e) => error!("Failed to load top items. Err: {}", e),
    };

    info!("Top items for {}", dashboard.time_range);

    let tracks: Vec<TrackTableRow> = dashboard
        .tracks
        .iter()
        .enumerate()
        .map(|(i, t)| TrackTableRow {
            rank: i + 1,
            name: t.name.clone(),
            artist: t.artist.clone(),
            album: t.album.clone(),
        })
        .collect();
    println!("{}", Table::new(tracks));

    let artists: Vec<ArtistTableRow> = dashboard
        .artists
        .iter()
        .enumerate()
        .map(|(i, a)| ArtistTableRow {
            rank: i + 1,
            name: a.name.clone(),
            genres: a
                .genres
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(","),
        })
        .collect();
    println!("{}", Table::new(artists));

    let albums: Vec<AlbumTableRow> = dashboard
        .albums
        .iter()
        .map(|a| AlbumTableRow {
            name: a.name.clone(),
            artist: a.artist.clone(),
        })
        .collect();
    println!("{}", Table::new(albums));

    if dashboard.genres.is_empty() {
        info!("Top genres: none");
    } else {
        info!("Top genres: {}", dashboard.genres.join(", "));
    }
}
