use tabled::Table;

use crate::{
    cli::{auth::login_catalog, spinner},
    error, info,
    recommendations::{RecommendOptions, SeenState, build_recommendations, seed_genres},
    stats::TOP_ITEMS_LIMIT,
    success,
    types::RecommendationTableRow,
    warning,
};

pub async fn recommend(options: RecommendOptions) {
    let catalog = match login_catalog().await {
        Ok(catalog) => catalog,
        Err(e) => error!("Login failed. Err: {}", e),
    };

    let pb = spinner("Looking at your top artists...");
    let genres = match seed_genres(&catalog, TOP_ITEMS_LIMIT).await {
        Ok(genres) => genres,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to load top artists. Err: {}", e);
        }
    };

    if genres.is_empty() {
        pb.finish_and_clear();
        warning!("None of your top artists has genre tags. Nothing to recommend yet.");
        return;
    }

    pb.set_message(format!("Searching {} genres...", genres.len()));
    let mut seen = SeenState::new();
    let recommendations = build_recommendations(&catalog, &genres, &mut seen, &options).await;
    pb.finish_and_clear();

    info!("Seed genres: {}", genres.join(", "));
    if recommendations.is_empty() {
        warning!("No recommendations found.");
        return;
    }

    let rows: Vec<RecommendationTableRow> = recommendations
        .into_iter()
        .map(|t| RecommendationTableRow {
            name: t.name,
            artist: t.artist,
            album: t.album,
            link: t.url,
        })
        .collect();
    let count = rows.len();

    println!("{}", Table::new(rows));
    success!("{} recommendations", count);
}
