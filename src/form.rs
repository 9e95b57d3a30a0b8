//! Raw entry-form values and their conversion to numbers.

use crate::workout::{WorkoutInput, WorkoutKind};

/// Text of the entry form as typed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormInput {
    pub kind: WorkoutKind,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl FormInput {
    /// Numeric view of the form. Only the field matching `kind` is read for
    /// the discipline metric.
    pub fn to_input(&self) -> WorkoutInput {
        let metric = match self.kind {
            WorkoutKind::Running => &self.cadence,
            WorkoutKind::Cycling => &self.elevation,
        };
        WorkoutInput {
            kind: self.kind,
            distance: parse_number(&self.distance),
            duration: parse_number(&self.duration),
            metric: parse_number(metric),
        }
    }

    /// Empty all numeric fields, keeping the selected kind.
    pub fn clear_values(&mut self) {
        self.distance.clear();
        self.duration.clear();
        self.cadence.clear();
        self.elevation.clear();
    }
}

/// Convert a numeric input's text the way the browser coerces it: blank is
/// zero, anything unparsable is NaN.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
