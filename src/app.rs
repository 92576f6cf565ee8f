use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue},
    routing::{get, patch, post},
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/forms/:category/submit", post(handlers::form_submit))
        .route("/forms/:category/edit/:id", post(handlers::form_edit))
        .route("/forms/:category/cancel", post(handlers::form_cancel))
        .route("/forms/:category/delete/:id", post(handlers::form_delete))
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/records", get(handlers::get_workbook))
        .route(
            "/api/records/:category",
            get(handlers::get_category).post(handlers::create_record),
        )
        .route(
            "/api/records/:category/:id",
            patch(handlers::update_record).delete(handlers::delete_record),
        )
        .route("/api/export", get(handlers::export_all))
        .route("/api/export/:category", get(handlers::export_category))
        .route("/api/copy", post(handlers::copy_all))
        .route("/api/copy/:category", post(handlers::copy_category))
        .route("/api/copy/:category/:id", post(handlers::copy_record))
        .route("/api/copy/:category/:id/:field", post(handlers::copy_field))
        .route("/api/visit", post(handlers::visit))
        .route("/api/visitors", get(handlers::get_visitors))
        .route("/api/status", get(handlers::get_status))
        .layer(security_header(header::X_FRAME_OPTIONS, "DENY"))
        .layer(security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(security_header(header::REFERRER_POLICY, "origin-when-cross-origin"))
        .layer(security_header(
            header::STRICT_TRANSPORT_SECURITY,
            "max-age=31536000; includeSubDomains",
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn security_header(
    name: header::HeaderName,
    value: &'static str,
) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}
