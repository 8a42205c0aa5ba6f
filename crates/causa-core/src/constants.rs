/// causa version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Depth / path-length sentinel meaning "no bound".
pub const UNBOUNDED: i32 = -1;

/// Hard ceiling on repair passes in `guarantee_pag`.
pub const MAX_PAG_REPAIR_ITERATIONS: usize = 25;

/// Upper bound on orientation sweeps before a rule engine gives up on reaching
/// a fixed point. Each sweep orients at least one endpoint, so this is never
/// reached on graphs below this many endpoints.
pub const MAX_ORIENTATION_SWEEPS: usize = 100_000;
