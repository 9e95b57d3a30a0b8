//! Application-level configuration constants.

// Persistence
pub const STORAGE_KEY: &str = "workouts";
pub const STORAGE_FORMAT_VERSION: u32 = 1;

// Map behaviour
pub const MAP_ZOOM_LEVEL: u8 = 13;
pub const PAN_DURATION_SEC: f64 = 1.0;

// UI Behavior
pub const FORM_RESET_DELAY_MS: u32 = 1_000;

// User-facing alerts
pub const ALERT_INVALID_INPUT: &str = "Inputs have to be positive numbers";
pub const ALERT_NO_POSITION: &str = "Could not get your position";
