/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Session token generation and validation (HS256, 7-day expiry)
/// - [`middleware`]: The authenticated caller context carried on requests
/// - [`authorization`]: The membership oracle (team/project access checks)
///
/// # Security Notes
///
/// - Passwords are hashed with Argon2id; the plaintext never leaves the
///   register/login handlers.
/// - Tokens are stateless: there is no server-side session store and no
///   revocation. Logout is client-side token deletion.
/// - Every authorization check is a database query over active membership
///   rows, and mutating paths run the check inside the same transaction as
///   the write.

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
