//! Bearer check for the mutating cron endpoints

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use super::error::ApiError;

/// Accepts the request only when `Authorization` is exactly `Bearer <secret>`.
///
/// Without a configured secret every request is rejected.
pub fn authorize(secret: Option<&SecretString>, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(secret) = secret else {
        warn!("Rejected cron request: no trigger secret configured");
        return Err(ApiError::Unauthorized);
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(value) if value == format!("Bearer {}", secret.expose_secret()) => Ok(()),
        Some(_) => {
            warn!("Rejected cron request: bearer token mismatch");
            Err(ApiError::Unauthorized)
        }
        None => {
            warn!("Rejected cron request: missing authorization header");
            Err(ApiError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_exact_bearer_accepted() {
        let secret = SecretString::from("s3cret");
        assert!(authorize(Some(&secret), &headers("Bearer s3cret")).is_ok());
    }

    #[test]
    fn test_near_misses_rejected() {
        let secret = SecretString::from("s3cret");
        for value in ["bearer s3cret", "Bearer s3cret ", "Bearer  s3cret", "s3cret", "Bearer other"] {
            assert!(
                authorize(Some(&secret), &headers(value)).is_err(),
                "accepted {value:?}"
            );
        }
        assert!(authorize(Some(&secret), &HeaderMap::new()).is_err());
    }

    #[test]
    fn test_missing_secret_rejects_everything() {
        assert!(authorize(None, &headers("Bearer ")).is_err());
        assert!(authorize(None, &headers("Bearer anything")).is_err());
    }
}
