pub mod error;
pub mod handlers;
pub mod state;
pub mod validation;

pub use state::ApiState;

use axum::{Router, routing::get};

pub fn build_api_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/api/v1/book",
            get(handlers::find_book).post(handlers::create_book),
        )
        .route(
            "/api/v1/book/{id}",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .route(
            "/api/v1/{category}/book",
            get(handlers::list_category_books),
        )
}
