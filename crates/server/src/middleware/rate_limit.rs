//! Rate limiting for the login endpoint using governor and `tower_governor`.
//!
//! Keys on the TCP peer address only. Forwarding headers (`X-Forwarded-For`,
//! `X-Real-IP`, `Forwarded`) are client-controlled and are ignored, so a
//! caller cannot rotate them to get a fresh bucket. The server must be served
//! with `into_make_service_with_connect_info::<SocketAddr>()`.

use std::sync::Arc;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Seconds between replenished login attempts per IP (~10/minute).
const LOGIN_REPLENISH_SECONDS: u64 = 6;
/// Login attempts an IP may make back to back.
const LOGIN_BURST: u32 = 5;

/// Create the rate limiter for `POST /auth/login`.
///
/// # Panics
///
/// Never in practice: both settings are non-zero constants, which
/// `GovernorConfigBuilder` always accepts.
#[must_use]
pub fn login_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(PeerIpKeyExtractor)
        .per_second(LOGIN_REPLENISH_SECONDS)
        .burst_size(LOGIN_BURST)
        .finish()
        .expect("login rate limiter settings are non-zero");
    GovernorLayer::new(Arc::new(config))
}
