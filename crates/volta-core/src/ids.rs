//! # Human-Readable Identifiers
//!
//! Order, account and service ids are a fixed prefix plus a random numeric
//! suffix. Uniqueness is not guaranteed here: the caller writes with
//! create-if-absent and draws a new id when the key is taken.
//!
//! | Kind               | Example        |
//! |--------------------|----------------|
//! | Online order       | `GE-482913`    |
//! | POS sale           | `POS-120044`   |
//! | Customer account   | `GE-C-40921`   |
//! | Technician account | `GE-T-77310`   |
//! | Service request    | `SR-310552`    |
//!
//! The RNG is a parameter so tests can use a seeded generator.

use rand::Rng;

use crate::types::{Role, SaleChannel};

pub const ONLINE_ORDER_PREFIX: &str = "GE-";
pub const POS_ORDER_PREFIX: &str = "POS-";
pub const SERVICE_REQUEST_PREFIX: &str = "SR-";

/// How many fresh ids to try before giving up on a create.
pub const MAX_ID_ATTEMPTS: usize = 5;

fn numeric_suffix<R: Rng + ?Sized>(rng: &mut R, digits: u32) -> String {
    let low = 10u32.pow(digits - 1);
    let high = 10u32.pow(digits);
    rng.gen_range(low..high).to_string()
}

/// `GE-######` for online orders, `POS-######` for counter sales.
pub fn order_id<R: Rng + ?Sized>(channel: SaleChannel, rng: &mut R) -> String {
    let prefix = match channel {
        SaleChannel::Online => ONLINE_ORDER_PREFIX,
        SaleChannel::Pos => POS_ORDER_PREFIX,
    };
    format!("{}{}", prefix, numeric_suffix(rng, 6))
}

/// `GE-C-#####` / `GE-T-#####`; `None` for roles that cannot register.
pub fn account_id<R: Rng + ?Sized>(role: Role, rng: &mut R) -> Option<String> {
    role.account_prefix()
        .map(|prefix| format!("{}{}", prefix, numeric_suffix(rng, 5)))
}

pub fn service_request_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}{}", SERVICE_REQUEST_PREFIX, numeric_suffix(rng, 6))
}

// =============================================================================
// Unit Tests
// =============================================================================
