//! In-memory, append-only list of the session's workouts.

use crate::workout::{Workout, WorkoutId};
use chrono::{DateTime, Utc};

/// Ordered workouts in insertion order.
#[derive(Debug, Clone, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
    /// Highest numeric id issued or loaded so far.
    last_id_ms: i64,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_workouts(workouts: Vec<Workout>) -> Self {
        let mut store = Self::new();
        for w in workouts {
            store.add(w);
        }
        store
    }

    /// Append a record. This is the only mutation besides `clear`.
    pub fn add(&mut self, workout: Workout) -> &Workout {
        if let Some(ms) = workout.id().as_millis() {
            self.last_id_ms = self.last_id_ms.max(ms);
        }
        self.workouts.push(workout);
        &self.workouts[self.workouts.len() - 1]
    }

    pub fn find(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id().as_str() == id)
    }

    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Workout> {
        self.workouts.iter()
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    /// Drop every record. Used by reset only.
    pub fn clear(&mut self) {
        self.workouts.clear();
        self.last_id_ms = 0;
    }

    /// Allocate an id for a record created at `now`.
    ///
    /// Ids are epoch milliseconds, bumped past the last issued value so that
    /// two records created within the same millisecond stay distinct.
    pub fn next_id(&mut self, now: DateTime<Utc>) -> WorkoutId {
        let ms = now.timestamp_millis().max(self.last_id_ms.saturating_add(1));
        self.last_id_ms = ms;
        WorkoutId::new(ms.to_string())
    }
}
