//! HTTP server setup

use std::sync::Arc;

use actix_web::{
    App, Error, HttpServer,
    body::MessageBody,
    dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Logger,
    web,
};

use crate::{
    api,
    middleware::{
        auth::Authentication, rate_limit::TrafficGovernor, security_headers::security_headers,
    },
    model::AppState,
};

/// Build the application.
///
/// Requests pass through the access log, the security headers, the
/// authentication gate and the traffic governor, in that order, before
/// reaching a handler.
pub fn app(
    app_state: Arc<AppState>,
    authentication: Authentication,
    governor: TrafficGovernor,
    context_path: &str,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .wrap(governor)
        .wrap(authentication.under_context_path(context_path))
        .wrap(security_headers())
        .wrap(Logger::default())
        .app_data(web::Data::from(app_state))
        .service(web::scope(context_path).configure(api::route::configure))
}

/// Creates and binds the management HTTP server.
pub fn main_server(
    app_state: Arc<AppState>,
    authentication: Authentication,
    governor: TrafficGovernor,
    context_path: String,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        app(
            app_state.clone(),
            authentication.clone(),
            governor.clone(),
            &context_path,
        )
    })
    .bind((address, port))?
    .run())
}
