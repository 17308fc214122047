use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;

use crate::authorizer::Authorizer;
use crate::bearer::{authorization_header, bearer_token};
use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::gate::check_permission;

/// Verified claims of the current request.
///
/// Extracting it from a route guarded by [`require_permission`] reuses the
/// context the middleware stored; otherwise the token is verified on the spot
/// with no permission requirement.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    pub token: String,
}

impl AuthContext {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.claims.has_permission(permission)
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<Authorizer>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<AuthContext>() {
            return Ok(ctx.clone());
        }

        let authorizer = Arc::<Authorizer>::from_ref(state);
        let header = authorization_header(&parts.headers)?;
        let claims = authorizer.authorize("", header).await?;
        let token = bearer_token(header)?.to_owned();

        Ok(Self { claims, token })
    }
}

/// In-handler permission check for routes that only extract [`AuthContext`].
pub fn ensure_permission(auth: &AuthContext, permission: &str) -> AuthResult<()> {
    check_permission(permission, &auth.claims)
}

#[derive(Clone)]
struct PermissionGuard {
    authorizer: Arc<Authorizer>,
    permission: &'static str,
}

/// Guards every route of `router` with `permission`.
///
/// The check runs before the handler; on success the handler can extract
/// [`AuthContext`] without verifying the token again.
///
/// ```ignore
/// let movies = Router::new().route("/movies", post(create_movie));
/// let movies = require_permission(movies, authorizer.clone(), POST_MOVIES);
/// ```
pub fn require_permission<S>(
    router: Router<S>,
    authorizer: Arc<Authorizer>,
    permission: &'static str,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let guard = PermissionGuard {
        authorizer,
        permission,
    };
    router.route_layer(middleware::from_fn_with_state(guard, permission_middleware))
}

async fn permission_middleware(
    State(guard): State<PermissionGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // The request body is not Sync, so nothing borrowed from `req` may be
    // held across the await below.
    let header = authorization_header(req.headers())?.map(str::to_owned);
    let claims = guard
        .authorizer
        .authorize(guard.permission, header.as_deref())
        .await?;
    let token = bearer_token(header.as_deref())?.to_owned();

    req.extensions_mut().insert(AuthContext { claims, token });
    Ok(next.run(req).await)
}
