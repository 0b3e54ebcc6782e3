use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::JwtConfig, error::ApiError, state::AppState};

/// JWT payload. There is no server-side session table; validity is entirely
/// signature plus expiry at verification time.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// Signing and verification keys plus the token lifetime, built once from
/// configuration. Rotating the secret invalidates all outstanding tokens.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::from_secs((config.ttl_minutes as u64) * 60),
        }
    }

    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Decode and validate a token. Every failure mode (bad signature,
    /// malformed input, expired) collapses into the one invalid-token error.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| ApiError::InvalidToken("Invalid token"))?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

/// Verified caller identity, read from `Authorization: Bearer <token>`.
/// A handler taking this argument only runs once the token has verified;
/// anything else short-circuits with 401 before the handler body.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::InvalidToken("Unauthorized"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::InvalidToken("Unauthorized"))?;

        let claims = keys.verify(token).map_err(|e| {
            warn!("invalid or expired token");
            e
        })?;

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            ttl_minutes: 5,
        })
    }

    #[test]
    fn sign_then_verify_decodes_the_same_user() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_a_swapped_signature() {
        let keys = make_keys("dev-secret");
        let t1 = keys.sign(Uuid::new_v4()).expect("sign t1");
        let t2 = keys.sign(Uuid::new_v4()).expect("sign t2");
        let (body, _) = t1.rsplit_once('.').expect("three segments");
        let (_, sig) = t2.rsplit_once('.').expect("three segments");
        let forged = format!("{}.{}", body, sig);
        assert!(keys.verify(&forged).is_err());
    }

    #[test]
    fn verify_rejects_a_token_from_another_secret() {
        let keys = make_keys("dev-secret");
        let other = make_keys("rotated-secret");
        let token = other.sign(Uuid::new_v4()).expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_an_expired_token() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (now - 7200) as usize,
            exp: (now - 3600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_garbage_input() {
        let keys = make_keys("dev-secret");
        assert!(keys.verify("").is_err());
        assert!(keys.verify("not-a-token").is_err());
        assert!(keys.verify("a.b.c").is_err());
    }

    fn parts_with_auth(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/jobs/create");
        if let Some(h) = header {
            builder = builder.header(axum::http::header::AUTHORIZATION, h);
        }
        let (parts, _) = builder.body(()).expect("request").into_parts();
        parts
    }

    #[tokio::test]
    async fn extractor_rejects_a_missing_header() {
        let keys = make_keys("dev-secret");
        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        match err {
            ApiError::InvalidToken(msg) => assert_eq!(msg, "Unauthorized"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn extractor_rejects_a_non_bearer_scheme() {
        let keys = make_keys("dev-secret");
        let token = keys.sign(Uuid::new_v4()).expect("sign");
        let mut parts = parts_with_auth(Some(&format!("Token {}", token)));
        let err = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        match err {
            ApiError::InvalidToken(msg) => assert_eq!(msg, "Unauthorized"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn extractor_rejects_an_invalid_token() {
        let keys = make_keys("dev-secret");
        let mut parts = parts_with_auth(Some("Bearer garbage"));
        let err = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        match err {
            ApiError::InvalidToken(msg) => assert_eq!(msg, "Invalid token"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn extractor_passes_the_verified_identity_through() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));
        let AuthUser(extracted) = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .expect("extract");
        assert_eq!(extracted, user_id);
    }
}
