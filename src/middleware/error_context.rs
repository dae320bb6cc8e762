use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use http::{Method, Uri, header};

use crate::error::{AppError, ErrorReport};

/// Renders `AppError` responses with the route and method that produced them.
pub async fn error_context(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let view = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let mut response = next.run(req).await;

    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    let (parts, _) = response.into_parts();
    let mut rendered = report.render(view, &method);

    // Keep headers set by the handler, such as cleared cookies.
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rendered.headers_mut().append(name.clone(), value.clone());
        }
    }

    rendered
}

/// Fallback for paths no router matched.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    ErrorReport::from(AppError::NotFound(format!("No route for {}", uri.path())))
        .render(uri.path().to_string(), &method)
}
