use crate::modules::library::controller::{
    create_book, create_category, create_issue, delete_book, delete_category, get_book, get_books,
    get_categories, get_issue, get_issues, get_settings, return_issue, update_book,
    update_category, update_issue, update_settings,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn init_library_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(get_categories).post(create_category))
        .route(
            "/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/books", get(get_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/issues", get(get_issues).post(create_issue))
        .route("/issues/{id}", get(get_issue).put(update_issue))
        .route("/issues/{id}/return", post(return_issue))
        .route("/settings", get(get_settings).put(update_settings))
}
