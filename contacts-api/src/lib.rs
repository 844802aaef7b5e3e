pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod helpers;

use actix_web::web;

pub use database::Database;

/// Routes plus the extractor settings that funnel their failures into
/// [`error::ApiError`]. The caller adds shared state and the default service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::path_config())
        .app_data(error::query_config())
        .route("/health", web::get().to(handlers::health::health))
        .service(
            web::resource(["/api/contacts", "/api/contacts/"])
                .route(web::post().to(handlers::contacts::create_contact))
                .route(web::get().to(handlers::contacts::list_contacts)),
        )
        .service(
            web::resource("/api/contacts/{id}")
                .route(web::get().to(handlers::contacts::get_contact))
                .route(web::put().to(handlers::contacts::update_contact))
                .route(web::delete().to(handlers::contacts::delete_contact)),
        );
}
