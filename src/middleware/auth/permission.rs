//! Permission guard: bearer token → verified claims → required permission.
//!
//! Applied per route with `route_layer`, so the permission each endpoint needs
//! is spelled out where the route is registered:
//!
//! ```ignore
//! .route("/drinks", require(auth.clone(), "post:drinks", post(create_drink)))
//! ```
//!
//! On success the claims go into request extensions for `AuthClaims`.
//! Any failure answers immediately and the handler is never called.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::error::AppError;
use crate::services::auth::Authorizer;

#[derive(Clone)]
struct Guard {
    authorizer: Arc<Authorizer>,
    permission: &'static str,
}

/// Wrap every method of `route` with a check for `permission`.
pub fn require<S>(
    authorizer: Arc<Authorizer>,
    permission: &'static str,
    route: MethodRouter<S>,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let guard = Guard {
        authorizer,
        permission,
    };
    route.route_layer(middleware::from_fn_with_state(guard, guard_middleware))
}

async fn guard_middleware(
    State(guard): State<Guard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = guard
        .authorizer
        .authorize(req.headers(), guard.permission)
        .await?;

    tracing::debug!(
        sub = claims.sub(),
        permission = guard.permission,
        "request authorized"
    );

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
