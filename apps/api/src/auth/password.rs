use crate::auth::AuthError;

const BCRYPT_COST: u32 = 10;

/// Hashes off the async runtime; bcrypt is deliberately slow.
pub async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|_| AuthError::HashingAborted)?
        .map_err(AuthError::from)
}

/// Malformed stored hashes count as a mismatch.
pub async fn verify_password(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}
