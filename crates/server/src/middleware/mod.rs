//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (browser frontend origin)
//! 5. Rate limiting on `/auth/login` (governor)
//!
//! Authentication is not a layer: handlers take a [`RequireAuth`],
//! [`RequireBuyer`], [`RequireSeller`] or [`RequireAdmin`] extractor.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{RequireAdmin, RequireAuth, RequireBuyer, RequireSeller};
pub use rate_limit::login_rate_limiter;
pub use request_id::{RequestId, request_id_middleware};
