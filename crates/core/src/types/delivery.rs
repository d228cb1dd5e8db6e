//! Delivery methods and providers.
//!
//! Both are lookup tables in the database; sub-orders reference them by name
//! through foreign keys. The names here are the seeded rows and are used to
//! build error messages when a foreign key rejects an unknown value.

/// Flat delivery fee charged per sub-order, in the smallest currency unit.
pub const DELIVERY_PRICE: i32 = 30_000;

/// Seeded delivery method names, sorted.
pub const DELIVERY_METHODS: [&str; 3] = ["Economy", "Express", "Standard"];

/// Seeded delivery provider names, sorted.
pub const DELIVERY_PROVIDERS: [&str; 3] = ["Giao Hang Nhanh", "GrabExpress", "VNPost"];

/// Lead time used when a method has no explicit entry.
const DEFAULT_LEAD_DAYS: u32 = 7;

/// Days between order date and expected delivery for a method.
#[must_use]
pub fn lead_time_days(method: &str) -> u32 {
    match method {
        "Express" => 2,
        "Standard" => 4,
        _ => DEFAULT_LEAD_DAYS,
    }
}

/// Human readable list of valid delivery methods.
#[must_use]
pub fn delivery_method_choices() -> String {
    DELIVERY_METHODS.join(", ")
}

/// Human readable list of valid delivery providers.
#[must_use]
pub fn delivery_provider_choices() -> String {
    DELIVERY_PROVIDERS.join(", ")
}
