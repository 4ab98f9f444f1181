pub mod bids;
pub mod datasets;
pub mod details;
pub mod estimates;
pub mod health;
pub mod pricing;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        // Reference datasets
        .route(
            "/datasets",
            post(datasets::import_dataset).layer(DefaultBodyLimit::max(datasets::MAX_DATASET_BYTES)),
        )
        // Bids
        .route("/bids", get(bids::list_bids).post(bids::create_bid))
        .route("/bids/count", get(bids::count_bids))
        .route(
            "/bids/:bid_id",
            get(bids::get_bid)
                .patch(bids::update_bid)
                .delete(bids::delete_bid),
        )
        .route("/bids/:bid_id/dataset", get(datasets::download_bid_dataset))
        // Project details
        .route(
            "/bids/:bid_id/details",
            get(details::get_details).put(details::save_details),
        )
        // Estimates
        .route(
            "/bids/:bid_id/estimate",
            get(estimates::get_estimate).post(estimates::compute_estimate),
        )
        .route(
            "/bids/:bid_id/estimate/tiered",
            get(estimates::get_tiered_estimate),
        )
        // Pricing tiers
        .route(
            "/bids/:bid_id/pricing",
            get(pricing::get_pricing).patch(pricing::select_pricing),
        )
}
