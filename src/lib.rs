//! Workout log pinned on a map.
//!
//! The library holds everything that does not need a browser: workout
//! records and their validation, the in-memory store, persistence through a
//! key-value store, and the controller state machine driving the UI. The
//! Yew front end in `main.rs` applies the controller's effects to the DOM and
//! the Leaflet map.

pub mod config;
pub mod controller;
pub mod form;
pub mod storage;
pub mod store;
pub mod workout;

pub use controller::{Controller, Effect, Marker, Phase};
pub use form::FormInput;
pub use storage::{KeyValueStore, LocalStorage, MemoryStorage, Persistence, StorageError};
pub use store::WorkoutStore;
pub use workout::{
    Coords, Discipline, Field, ValidationError, Workout, WorkoutId, WorkoutInput, WorkoutKind,
};

/// Pace or speed rounded to one decimal, as shown in the list.
pub fn format_metric(value: f64) -> String {
    format!("{:.1}", value)
}
