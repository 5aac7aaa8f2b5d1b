//! Secondary-unlock gate for already-opened sessions.
//!
//! `AuthGate` lets a caller park an unlocked session behind an opaque
//! random token for a bounded time, so a platform gate (biometric
//! prompt, screen-lock re-auth) can restore it without re-entering the
//! master password.  The gate never derives key material from the
//! secondary factor — the factor only decides whether the cached
//! session is released.  On expiry the session is dropped, which
//! zeroizes its key and plaintext.
//!
//! Whether the platform prompt actually succeeded is the caller's
//! responsibility; `redeem` must only be called after it has.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::TryRngCore;

use crate::errors::{Result, VaultError};
use crate::vault::session::VaultSession;

/// Length of an unlock token in bytes (256 bits).
const TOKEN_LEN: usize = 32;

/// Opaque capability token returned by `AuthGate::register`.
#[derive(Clone, PartialEq, Eq)]
pub struct UnlockToken([u8; TOKEN_LEN]);

// Tokens are capabilities; keep them out of logs.
impl fmt::Debug for UnlockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnlockToken(<redacted>)")
    }
}

struct CachedSession {
    session: VaultSession,
    expires_at: Instant,
}

/// Cache of parked sessions, keyed by random token.
pub struct AuthGate {
    cached: Mutex<HashMap<[u8; TOKEN_LEN], CachedSession>>,
}

impl AuthGate {
    pub fn new() -> Self {
        Self {
            cached: Mutex::new(HashMap::new()),
        }
    }

    /// Park an unlocked session for at most `ttl` and return the token
    /// that redeems it.
    ///
    /// A locked session is refused — the gate is a shortcut past
    /// password *re-entry*, never a way to unlock.
    pub fn register(&self, session: VaultSession, ttl: Duration) -> Result<UnlockToken> {
        if session.is_locked() {
            return Err(VaultError::LockedSession);
        }

        let mut raw = [0u8; TOKEN_LEN];
        rand::rngs::OsRng
            .try_fill_bytes(&mut raw)
            .expect("OS RNG unavailable");

        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        cached.insert(
            raw,
            CachedSession {
                session,
                expires_at: Instant::now() + ttl,
            },
        );

        Ok(UnlockToken(raw))
    }

    /// Release the session behind `token`.
    ///
    /// Single-use: the token is consumed whether or not it had expired.
    /// An expired token returns `TokenExpired` and the cached session
    /// is dropped on the spot, zeroizing its key.
    pub fn redeem(&self, token: &UnlockToken) -> Result<VaultSession> {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());

        match cached.remove(&token.0) {
            None => Err(VaultError::UnknownToken),
            Some(entry) if Instant::now() >= entry.expires_at => Err(VaultError::TokenExpired),
            Some(entry) => Ok(entry.session),
        }
    }

    /// Drop every expired cached session now instead of waiting for its
    /// token to be redeemed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        cached.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of sessions currently parked (expired ones included until
    /// redeemed or purged).
    pub fn cached_count(&self) -> usize {
        self.cached.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}
