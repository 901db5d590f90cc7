//! Canonical test-drive fee handling.
//!
//! The fee charged for a test-drive booking is server-authoritative: it is
//! read from the site settings once at booking-creation time, snapshotted
//! into the booking record, and never recomputed from client input.

/// Fee substituted when the `test_drive_fee` settings row is absent (₦50,000).
pub const DEFAULT_TEST_DRIVE_FEE_NGN: i64 = 50_000;

/// Fixed multiplier from whole naira to the processor's minor unit (kobo).
pub const MINOR_UNITS_PER_NAIRA: i64 = 100;

/// ISO currency code charged by the payment processor.
pub const CURRENCY: &str = "NGN";

/// Convert a whole-naira amount to the processor's minor-unit representation.
pub fn to_minor_units(amount_ngn: i64) -> i64 {
    amount_ngn * MINOR_UNITS_PER_NAIRA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_naira_to_kobo() {
        assert_eq!(to_minor_units(159_984), 15_998_400);
        assert_eq!(to_minor_units(DEFAULT_TEST_DRIVE_FEE_NGN), 5_000_000);
    }
}
