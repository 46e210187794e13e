use std::time::Duration;

/// Decimal precision for prices, values and gain/loss
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Tolerance for the sum of portfolio weights
pub const WEIGHT_SUM_TOLERANCE: &str = "0.000001";

/// Sector assigned to holdings submitted without one
pub const DEFAULT_SECTOR: &str = "Other";

/// Symbols resolved concurrently per batch
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Pause between two batches
pub const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_millis(500);

/// Lifetime of a cached quote
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Staleness threshold after a full or user-provided refresh
pub const DEFAULT_FULL_STALENESS: Duration = Duration::from_secs(5 * 60);

/// Staleness threshold after a partial refresh
pub const DEFAULT_PARTIAL_STALENESS: Duration = Duration::from_secs(60);

/// Staleness threshold after a synthetic-only refresh
pub const DEFAULT_SYNTHETIC_STALENESS: Duration = Duration::from_secs(15);

/// Default auto-refresh interval persisted in preferences, in milliseconds
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 15_000;

/// Largest accepted price per unit
pub const MAX_UNIT_PRICE: u64 = 1_000_000_000_000;

/// Largest accepted quantity per holding
pub const MAX_QUANTITY: u64 = 1_000_000_000_000;

/// Largest accepted holdings array. Together with the price and quantity
/// bounds this keeps portfolio totals inside `Decimal` range.
pub const MAX_HOLDINGS: usize = 10_000;
