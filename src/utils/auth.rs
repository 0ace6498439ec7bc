//! Authentication utilities

use anyhow::Result;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::models::UserPayload;

const PBKDF2_ITERATIONS: u32 = 100_000;
const HASH_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// session token claims; the user identity is flattened into the payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub user: UserPayload,
    pub exp: usize,
}

fn derive(password: &str, salt: &[u8]) -> [u8; HASH_LENGTH] {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut hash);
    hash
}

/// hash a password using pbkdf2-sha256 with a random salt
///
/// The result is `<hash-hex>.<salt-hex>`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let hash = derive(password, &salt);
    format!("{}.{}", hex::encode(hash), hex::encode(salt))
}

/// verify a password against a stored hash using constant-time comparison
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((hash_hex, salt_hex)) = stored.split_once('.') else {
        return false;
    };
    let (Ok(expected), Ok(salt)) = (hex::decode(hash_hex), hex::decode(salt_hex)) else {
        return false;
    };

    let computed = derive(password, &salt);
    computed.as_slice().ct_eq(expected.as_slice()).into()
}

/// create a signed session token valid for `expires_in` seconds
pub fn create_jwt(user: UserPayload, secret: &str, expires_in: u64) -> Result<String> {
    let expiration = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() + expires_in;

    let claims = Claims {
        user,
        exp: expiration as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// verify a session token and return its claims
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}
