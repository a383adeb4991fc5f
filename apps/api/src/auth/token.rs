//! Minimal HS256 JWTs: `base64url(header).base64url(claims).base64url(hmac)`.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::auth::AuthError;
use crate::models::user::{Role, User};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Issues a token for `user` valid for `ttl`.
pub fn issue(user: &User, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        iat: now,
        exp: now + ttl.as_secs() as i64,
    };
    sign(&claims, secret)
}

pub fn sign(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    let header = Header {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let header_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).map_err(|_| AuthError::InvalidToken)?);
    let claims_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).map_err(|_| AuthError::InvalidToken)?);
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac = mac(secret)?;
    mac.update(signing_input.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{sig_b64}"))
}

pub fn verify(token: &str, secret: &str) -> Result<Claims, AuthError> {
    verify_at(token, secret, Utc::now().timestamp())
}

pub fn verify_at(token: &str, secret: &str, now: i64) -> Result<Claims, AuthError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(claims_b64), Some(sig_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::InvalidToken);
    };

    let header: Header = decode_json(header_b64)?;
    if header.alg != "HS256" {
        return Err(AuthError::InvalidToken);
    }

    let signature = URL_SAFE_NO_PAD
        .decode(sig_b64.as_bytes())
        .map_err(|_| AuthError::InvalidToken)?;
    let mut mac = mac(secret)?;
    mac.update(format!("{header_b64}.{claims_b64}").as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AuthError::InvalidToken)?;

    let claims: Claims = decode_json(claims_b64)?;
    if now >= claims.exp {
        return Err(AuthError::Expired);
    }
    Ok(claims)
}

fn mac(secret: &str) -> Result<HmacSha256, AuthError> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AuthError::InvalidToken)
}

fn decode_json<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.as_bytes())
        .map_err(|_| AuthError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidToken)
}
