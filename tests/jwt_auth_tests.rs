// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT compatibility tests.
//!
//! Session tokens come from the identity provider; these tests pin the
//! claim layout the middleware expects so a change on either side fails here.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use volunteer_tracker::middleware::auth::{create_jwt, verify_jwt};

/// Claims as the identity provider issues them.
#[derive(Debug, Serialize, Deserialize)]
struct ProviderClaims {
    sub: String,
    email: String,
    name: String,
    exp: usize,
    iat: usize,
}

const SIGNING_KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

#[test]
fn test_provider_token_accepted() {
    let claims = ProviderClaims {
        sub: "provider-user-42".to_string(),
        email: "ada@example.org".to_string(),
        name: "Ada Lovelace".to_string(),
        exp: now() + 3600,
        iat: now(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap();

    let verified = verify_jwt(&token, SIGNING_KEY).expect("Provider token should verify");
    assert_eq!(verified.sub, "provider-user-42");
    assert_eq!(verified.email, "ada@example.org");
    assert_eq!(verified.name, "Ada Lovelace");
}

#[test]
fn test_created_token_decodes_as_provider_claims() {
    let token = create_jwt("sub-1", "ada@example.org", "Ada", SIGNING_KEY).unwrap();

    let decoded = decode::<ProviderClaims>(
        &token,
        &DecodingKey::from_secret(SIGNING_KEY),
        &Validation::new(Algorithm::HS256),
    )
    .expect("Failed to decode JWT");

    assert_eq!(decoded.claims.sub, "sub-1");
    assert!(decoded.claims.exp > decoded.claims.iat);
}

#[test]
fn test_missing_name_defaults_to_empty() {
    #[derive(Serialize)]
    struct NoName {
        sub: String,
        email: String,
        exp: usize,
        iat: usize,
    }
    let token = encode(
        &Header::new(Algorithm::HS256),
        &NoName {
            sub: "s".to_string(),
            email: "ada@example.org".to_string(),
            exp: now() + 3600,
            iat: now(),
        },
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap();

    let verified = verify_jwt(&token, SIGNING_KEY).unwrap();
    assert_eq!(verified.name, "");
}

#[test]
fn test_other_algorithm_rejected() {
    let claims = ProviderClaims {
        sub: "s".to_string(),
        email: "ada@example.org".to_string(),
        name: "Ada".to_string(),
        exp: now() + 3600,
        iat: now(),
    };
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap();

    assert!(verify_jwt(&token, SIGNING_KEY).is_err());
}
