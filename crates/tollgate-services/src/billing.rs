//! Parking fee calculation
//!
//! Stays are billed in 15-minute increments, rounded up. Elapsed time is
//! measured in `f64` minutes; the money side is computed in `Decimal`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::constants::{
    BOUNDARY_EPSILON_MINUTES, INCREMENT_MINUTES, UNIT_PRICE, ZERO_CHARGE_THRESHOLD_MINUTES,
};

/// Result of billing one stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Charge {
    /// Elapsed time rounded to the nearest minute (informational)
    pub elapsed_minutes: i64,
    /// Billed 15-minute increments
    pub increments: i64,
    /// Amount due
    pub amount: Decimal,
}

impl Charge {
    pub const FREE: Charge = Charge {
        elapsed_minutes: 0,
        increments: 0,
        amount: Decimal::ZERO,
    };
}

/// Elapsed time between two instants in fractional minutes
///
/// Negative spans (exit before entry, e.g. clock skew) count as zero.
fn minutes_between(entry_time: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - entry_time)
        .to_std()
        .map(|d| d.as_secs_f64() / 60.0)
        .unwrap_or(0.0)
}

/// Elapsed time rounded to the nearest whole minute
pub fn elapsed_minutes(entry_time: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    minutes_between(entry_time, now).round() as i64
}

/// Calculate the charge for a stay from `entry_time` until `now`
///
/// - Under 1µs: free, zero elapsed minutes
/// - Otherwise `ceil((minutes - 1ms) / 15)` increments, at least one
/// - Each increment costs `UNIT_PRICE`
pub fn calculate_charge(entry_time: DateTime<Utc>, now: DateTime<Utc>) -> Charge {
    let total_minutes = minutes_between(entry_time, now);

    if total_minutes < ZERO_CHARGE_THRESHOLD_MINUTES {
        return Charge::FREE;
    }

    let adjusted_minutes = (total_minutes - BOUNDARY_EPSILON_MINUTES).max(0.0);
    let mut increments = (adjusted_minutes / INCREMENT_MINUTES as f64).ceil() as i64;

    // Stays between 1µs and 1ms land here
    if increments == 0 {
        increments = 1;
    }

    Charge {
        elapsed_minutes: total_minutes.round() as i64,
        increments,
        amount: UNIT_PRICE * Decimal::from(increments),
    }
}
