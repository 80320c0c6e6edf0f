use axum::{
    Router,
    routing::{get, post},
};
use storage::Database;

use super::handlers::{get_series_results, list_series, recompute_series_results, what_if};

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/", get(list_series))
        .route("/:series_id/results", get(get_series_results))
        .route(
            "/:series_id/results/recompute",
            post(recompute_series_results),
        )
        .route("/:series_id/what-if", post(what_if))
}
