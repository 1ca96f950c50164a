//! System-wide constants for the rules engine.

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Default base lockup for domestic holders (one year).
pub const DEFAULT_DOMESTIC_LOCKUP_SECS: u64 = 365 * SECONDS_PER_DAY;

/// Default base lockup for foreign holders (40-day compliance period).
pub const DEFAULT_FOREIGN_LOCKUP_SECS: u64 = 40 * SECONDS_PER_DAY;

/// Number of admin audit events retained before the oldest is evicted.
pub const DEFAULT_AUDIT_CAPACITY: usize = 10_000;

/// Basis-point denominator used for consumption ratios.
pub const BPS_PRECISION: u128 = 10_000;

/// Token decimals of the host ledger.
pub const TOKEN_DECIMALS: u32 = 18;

/// One whole token in base units.
pub const ONE_TOKEN: u128 = 10u128.pow(TOKEN_DECIMALS);

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
