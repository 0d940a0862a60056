use actix_web::web;

use crate::error::{json_error_handler, path_error_handler, query_error_handler};

use super::{health, method, namespace, resource};

/// Register the management API and its extractor error handling on `cfg`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(health::health)
        .service(namespace::routes())
        .service(resource::routes())
        .service(method::routes());
}
