//! Placeholder pages for the public and role namespaces.
//!
//! Page content is intentionally bare; the gate in front of the role
//! namespaces is what matters here.

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use verdant_auth::gate::Namespace;

/// Public and namespaced page routes.
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let mut router = Router::new()
        .route("/", get(home))
        .route("/login/:role", get(login_page));

    for namespace in Namespace::ALL {
        let root = format!("/{}", namespace.as_str());
        router = router
            .route(&root, get(namespace_page))
            .route(&format!("{root}/*rest"), get(namespace_page));
    }

    router
}

async fn home() -> Html<&'static str> {
    Html("<h1>Verdant</h1><p>Plants, care guides and the sellers who grow them.</p>")
}

async fn login_page(Path(role): Path<String>) -> Response {
    match role.as_str() {
        "user" | "seller" => Html(format!(
            "<h1>Sign in</h1><form data-login-type=\"{role}\" \
             data-action=\"/api/session/login\"></form>"
        ))
        .into_response(),
        "admin" => Html("<h1>Admin sign in</h1><p>Admins sign in through the console.</p>")
            .into_response(),
        _ => not_found().await.into_response(),
    }
}

async fn namespace_page(uri: Uri) -> Html<String> {
    Html(format!("<h1>{}</h1>", uri.path()))
}

/// Fallback for unknown paths.
pub async fn not_found() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html("<h1>Not found</h1>"))
}
