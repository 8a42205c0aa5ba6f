// Single source of truth for all default values.

// --- Search ---
pub const DEFAULT_ALGORITHM: &str = "pc-stable";
pub const DEFAULT_ALPHA: f64 = 0.05;
pub const DEFAULT_DEPTH: i32 = -1; // unbounded
pub const DEFAULT_MAX_PATH_LENGTH: i32 = -1; // unbounded
pub const DEFAULT_COMPLETE_RULE_SET: bool = true;
pub const DEFAULT_DISCRIMINATING_PATH_RULE: bool = true;
pub const DEFAULT_POSSIBLE_DSEP: bool = true;
pub const DEFAULT_GUARANTEE_PAG: bool = false;
pub const DEFAULT_NUM_THREADS: usize = 1;

// --- Scores ---
pub const DEFAULT_PENALTY_DISCOUNT: f64 = 1.0;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
