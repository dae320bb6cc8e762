use std::collections::HashSet;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use http::header;
use tower::ServiceBuilder;
use tower_http::{
    ServiceBuilderExt,
    cors::{AllowOrigin, Any, CorsLayer},
    propagate_header::PropagateHeaderLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_docs::ApiDoc;
use crate::config::{Config, MAX_REQUEST_BODY_BYTES};
use crate::middleware::error_context::{error_context, not_found};
use crate::middleware::http_logger::http_logger;
use crate::routes;
use crate::state::AppState;

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_headers = [
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        header::ACCEPT,
        header::ACCEPT_LANGUAGE,
        header::HeaderName::from_static("x-request-id"),
    ];

    let allowed_methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::PUT,
        http::Method::DELETE,
        http::Method::PATCH,
        http::Method::OPTIONS,
    ];

    if config.cors_allowed_origins == "*" {
        // Wildcard origins cannot be combined with credentials
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(allowed_methods)
            .allow_headers(allowed_headers)
            .allow_credentials(false)
    } else {
        let allowed_origins: HashSet<String> = config
            .cors_allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let origins: Vec<http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(allowed_methods)
            .allow_headers(allowed_headers)
            .allow_credentials(true)
    }
}

pub fn create_app(state: AppState) -> anyhow::Result<Router> {
    let mut router: Router<AppState> = Router::new()
        .merge(routes::health::route::create_route())
        .merge(routes::auth::create_route())
        .merge(routes::departments::create_route())
        .merge(routes::courses::create_route())
        .merge(routes::syllabi::create_route())
        .merge(routes::choices::create_route());

    if state.config.swagger_enabled {
        let swagger_ui =
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());
        router = router.merge(swagger_ui);
    }

    let sensitive_headers: Arc<[_]> =
        vec![header::AUTHORIZATION, header::COOKIE, header::SET_COOKIE].into();

    // Axum middleware goes on the router; ServiceBuilder only takes tower layers
    let router = router
        .route_layer(middleware::from_fn(error_context))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), http_logger))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES));

    let middleware = ServiceBuilder::new()
        .layer(cors_layer(&state.config))
        .layer(PropagateHeaderLayer::new(header::HeaderName::from_static(
            "x-request-id",
        )))
        .sensitive_request_headers(sensitive_headers.clone())
        .sensitive_response_headers(sensitive_headers)
        .compression();

    Ok(router.layer(middleware).with_state(state))
}
