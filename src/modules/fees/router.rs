use crate::modules::fees::controller::{
    create_category, create_due_date, create_structure, create_transaction, delete_structure,
    get_categories, get_due_dates, get_my_transactions, get_structure, get_structures,
    get_transaction, get_transactions, update_category, update_structure,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

pub fn init_fees_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(get_categories).post(create_category))
        .route("/categories/{id}", put(update_category))
        .route("/structures", get(get_structures).post(create_structure))
        .route(
            "/structures/{id}",
            get(get_structure).put(update_structure).delete(delete_structure),
        )
        .route(
            "/structures/{id}/due-dates",
            get(get_due_dates).post(create_due_date),
        )
        .route(
            "/transactions",
            get(get_transactions).post(create_transaction),
        )
        .route("/transactions/me", get(get_my_transactions))
        .route("/transactions/{id}", get(get_transaction))
}
