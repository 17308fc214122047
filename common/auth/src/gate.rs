use tracing::warn;

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};

/// Admits the claims when `required` is one of the granted permissions.
///
/// An empty `required` string means the operation needs no permission and
/// always passes, even for tokens without a `permissions` claim.
pub fn check_permission(required: &str, claims: &Claims) -> AuthResult<()> {
    if required.is_empty() {
        return Ok(());
    }

    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::MissingPermissionsClaim)?;

    if granted.iter().any(|permission| permission == required) {
        Ok(())
    } else {
        warn!(
            required,
            subject = claims.subject.as_deref().unwrap_or("unknown"),
            "permission_check_failed"
        );
        Err(AuthError::PermissionDenied {
            required: required.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{
        CASTING_ASSISTANT, CASTING_DIRECTOR, DELETE_MOVIES, EXECUTIVE_PRODUCER, PATCH_MOVIES,
        POST_ACTORS, VIEW_MOVIES,
    };
    use serde_json::json;

    fn claims_with(permissions: Option<&[&str]>) -> Claims {
        let mut payload = json!({ "iss": "https://d/", "aud": "a", "exp": 1_700_000_000 });
        if let Some(permissions) = permissions {
            payload["permissions"] = json!(permissions);
        }
        Claims::try_from(payload).expect("claims")
    }

    #[test]
    fn member_permission_passes() {
        let claims = claims_with(Some(CASTING_ASSISTANT));
        assert!(check_permission(VIEW_MOVIES, &claims).is_ok());
    }

    #[test]
    fn non_member_permission_is_denied() {
        let claims = claims_with(Some(CASTING_ASSISTANT));
        let err = check_permission(POST_ACTORS, &claims).expect_err("denied");
        match &err {
            AuthError::PermissionDenied { required } => assert_eq!(required, POST_ACTORS),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status().as_u16(), 401);
    }

    #[test]
    fn missing_permissions_claim_is_bad_request() {
        let claims = claims_with(None);
        let err = check_permission(VIEW_MOVIES, &claims).expect_err("no claim");
        assert!(matches!(err, AuthError::MissingPermissionsClaim));
        assert_eq!(err.status().as_u16(), 400);
    }

    #[test]
    fn empty_requirement_always_passes() {
        assert!(check_permission("", &claims_with(None)).is_ok());
        assert!(check_permission("", &claims_with(Some(&[]))).is_ok());
        assert!(check_permission("", &claims_with(Some(CASTING_ASSISTANT))).is_ok());
    }

    #[test]
    fn membership_is_exact_not_prefix() {
        let claims = claims_with(Some(&["view:movies:extra", "VIEW:MOVIES"]));
        assert!(check_permission(VIEW_MOVIES, &claims).is_err());
    }

    #[test]
    fn role_bundles_follow_casting_hierarchy() {
        let director = claims_with(Some(CASTING_DIRECTOR));
        let producer = claims_with(Some(EXECUTIVE_PRODUCER));

        assert!(check_permission(PATCH_MOVIES, &director).is_ok());
        assert!(check_permission(DELETE_MOVIES, &director).is_err());
        for permission in CASTING_DIRECTOR {
            assert!(check_permission(permission, &producer).is_ok(), "{permission}");
        }
        assert!(check_permission(DELETE_MOVIES, &producer).is_ok());
    }
}
