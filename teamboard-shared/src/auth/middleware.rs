/// Authenticated caller context
///
/// After the API crate's token middleware validates a bearer token, it adds
/// an [`AuthContext`] to the request extensions. Handlers extract it with
/// Axum's `Extension` extractor:
///
/// ```
/// use axum::Extension;
/// use teamboard_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;
use crate::models::user::UserRole;

/// The identity resolved from a validated session token
///
/// Carries only what the token itself proves; team-scoped roles are always
/// looked up fresh from the membership table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// The user's email
    pub email: String,

    /// The user's global role
    pub role: UserRole,
}

impl AuthContext {
    /// Builds the context from validated token claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "alice@example.com", "Alice Anderson", UserRole::Admin);

        let auth = AuthContext::from_claims(&claims);

        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.email, "alice@example.com");
        assert_eq!(auth.role, UserRole::Admin);
    }
}
