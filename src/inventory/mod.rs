mod dto;
pub mod handlers;
mod repo;
pub mod repo_types;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:user_id/inventory",
            get(handlers::list_inventory).post(handlers::add_ingredient),
        )
        .route(
            "/users/:user_id/inventory/:name",
            get(handlers::get_item)
                .patch(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route(
            "/users/:user_id/inventory/:name/quantity",
            get(handlers::get_quantity),
        )
        .route("/ingredients/:name/unit", get(handlers::get_unit))
}
