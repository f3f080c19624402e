use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use qrbridge_core::Repository;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    asset_handler, create_group_handler, create_mapping_handler, delete_group_handler,
    delete_mapping_handler, folders_handler, get_mapping_handler, health_handler,
    keep_alive_handler, list_groups_handler, list_mappings_handler, missing_link_handler,
    qr_pdf_handler, qr_png_handler, redirect_handler, update_mapping_handler, upload_handler,
};
use crate::state::AppState;

/// Largest accepted request body, which bounds uploaded logos.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub struct App {}

impl App {
    pub fn router<R: Repository>(state: AppState<R>) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/api/redirect", get(missing_link_handler))
            .route("/api/redirect/", get(missing_link_handler))
            .route("/api/redirect/{random_link}", get(redirect_handler::<R>))
            .route("/api/cron/keep-alive", get(keep_alive_handler::<R>))
            .route("/api/upload", post(upload_handler::<R>))
            .route("/assets/{key}", get(asset_handler::<R>))
            .nest("/api/admin", Self::admin_router::<R>())
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    fn admin_router<R: Repository>() -> Router<AppState<R>> {
        Router::new()
            .route(
                "/mappings",
                get(list_mappings_handler::<R>).post(create_mapping_handler::<R>),
            )
            .route(
                "/mappings/{id}",
                get(get_mapping_handler::<R>)
                    .patch(update_mapping_handler::<R>)
                    .delete(delete_mapping_handler::<R>),
            )
            .route("/mappings/{id}/qr.png", get(qr_png_handler::<R>))
            .route("/mappings/{id}/qr.pdf", get(qr_pdf_handler::<R>))
            .route("/folders", get(folders_handler::<R>))
            .route(
                "/groups",
                get(list_groups_handler::<R>).post(create_group_handler::<R>),
            )
            .route("/groups/{name}", delete(delete_group_handler::<R>))
    }
}
