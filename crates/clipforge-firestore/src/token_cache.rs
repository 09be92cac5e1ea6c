//! OAuth access token cache for the Firestore REST client.
//!
//! Tokens are refreshed a minute before they expire. Concurrent callers that
//! find a stale token queue on one write lock so only one refresh runs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use gcp_auth::TokenProvider;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{FirestoreError, FirestoreResult};

/// Refresh this long before the reported expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when the provider's expiry cannot be converted.
const FALLBACK_TTL: Duration = Duration::from_secs(50 * 60);

/// OAuth scope for Firestore REST access.
pub const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Fresh enough to hand out without refreshing.
    fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }

    /// Not yet expired, even if due for refresh.
    fn is_usable(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Instant at which a token reported to expire at `expires_at` lapses.
fn local_expiry(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Instant {
    if expires_at <= now {
        return Instant::now();
    }
    let ttl = (expires_at - now).to_std().unwrap_or(FALLBACK_TTL);
    Instant::now() + ttl
}

/// Shared token cache in front of a `gcp_auth` provider.
pub struct TokenCache {
    provider: Arc<dyn TokenProvider>,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            cached: RwLock::new(None),
        }
    }

    /// Drop the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    /// Current access token, refreshed when close to expiry.
    pub async fn get_token(&self) -> FirestoreResult<String> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh(Instant::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let mut cached = self.cached.write().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Instant::now()) {
                return Ok(token.access_token.clone());
            }
        }

        match self.provider.token(&[FIRESTORE_SCOPE]).await {
            Ok(token) => {
                let fresh = CachedToken {
                    access_token: token.as_str().to_string(),
                    expires_at: local_expiry(token.expires_at(), Utc::now()),
                };
                debug!("Refreshed Firestore access token");
                let access_token = fresh.access_token.clone();
                *cached = Some(fresh);
                Ok(access_token)
            }
            Err(e) => match cached.as_ref() {
                Some(stale) if stale.is_usable(Instant::now()) => {
                    warn!("Token refresh failed, reusing current token: {}", e);
                    Ok(stale.access_token.clone())
                }
                _ => Err(FirestoreError::auth_error(format!(
                    "Failed to obtain access token: {}",
                    e
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_freshness_respects_margin() {
        let now = Instant::now();
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + Duration::from_secs(30),
        };
        assert!(!token.is_fresh(now));
        assert!(token.is_usable(now));

        let long_lived = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + Duration::from_secs(600),
        };
        assert!(long_lived.is_fresh(now));
    }

    #[test]
    fn test_expired_token_maps_to_now() {
        let now = Utc::now();
        let expiry = local_expiry(now - chrono::Duration::seconds(5), now);
        assert!(expiry <= Instant::now());

        let later = local_expiry(now + chrono::Duration::seconds(3600), now);
        assert!(later > Instant::now() + Duration::from_secs(3500));
    }

    #[test]
    fn test_firestore_scope() {
        assert!(FIRESTORE_SCOPE.ends_with("/datastore"));
    }
}
