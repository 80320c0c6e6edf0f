use axum::{Router, routing::get};
use storage::Database;

use super::handlers::{get_effective_codes, get_scoring_system, list_scoring_systems};

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/", get(list_scoring_systems))
        .route("/:system_id", get(get_scoring_system))
        .route("/:system_id/codes", get(get_effective_codes))
}
