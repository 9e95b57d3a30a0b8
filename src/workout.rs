//! Workout records: the shared base fields plus the discipline-specific
//! payload, and the validation applied before a record may exist.

use crate::config::ALERT_INVALID_INPUT;
use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Geographic position as (latitude, longitude) in degrees.
///
/// Serialized as a two-element array `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

/// Record identifier, unique within a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id, if it is made of digits only.
    pub fn as_millis(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The discriminant stored under `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    #[default]
    Running,
    Cycling,
}

impl WorkoutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃‍♂️",
            WorkoutKind::Cycling => "🚴‍♀️",
        }
    }

    /// Parse the value of the form's type selector.
    pub fn from_form_value(value: &str) -> Option<Self> {
        match value.trim() {
            "running" => Some(WorkoutKind::Running),
            "cycling" => Some(WorkoutKind::Cycling),
            _ => None,
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discipline-specific payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Discipline {
    /// Cadence in steps per minute.
    Running { cadence: f64 },
    /// Elevation gain in meters.
    Cycling { elevation_gain: f64 },
}

impl Discipline {
    pub fn kind(&self) -> WorkoutKind {
        match self {
            Discipline::Running { .. } => WorkoutKind::Running,
            Discipline::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    fn metric(&self) -> (Field, f64) {
        match *self {
            Discipline::Running { cadence } => (Field::Cadence, cadence),
            Discipline::Cycling { elevation_gain } => (Field::ElevationGain, elevation_gain),
        }
    }
}

/// Numeric form fields subject to validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Distance,
    Duration,
    Cadence,
    ElevationGain,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Distance => "distance",
            Field::Duration => "duration",
            Field::Cadence => "cadence",
            Field::ElevationGain => "elevation gain",
        };
        f.write_str(name)
    }
}

/// Why a workout could not be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    NotFinite(Field),
    NotPositive(Field),
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match *self {
            ValidationError::NotFinite(field) | ValidationError::NotPositive(field) => field,
        }
    }

    /// Text shown to the user in the blocking alert.
    pub fn user_message(&self) -> &'static str {
        ALERT_INVALID_INPUT
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotFinite(field) => write!(f, "{} must be a finite number", field),
            ValidationError::NotPositive(field) => write!(f, "{} must be positive", field),
        }
    }
}

impl std::error::Error for ValidationError {}

fn ensure_positive(field: Field, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive(field));
    }
    Ok(value)
}

fn ensure_finite(field: Field, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }
    Ok(value)
}

/// Where the values being validated come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Typed into the form.
    Entered,
    /// Read back from storage. Saved cycling records may carry a zero or
    /// negative elevation gain, which is kept as long as it is finite.
    Stored,
}

fn validate(
    distance: f64,
    duration: f64,
    discipline: Discipline,
    origin: Origin,
) -> Result<(), ValidationError> {
    ensure_positive(Field::Distance, distance)?;
    ensure_positive(Field::Duration, duration)?;
    match (discipline, origin) {
        (Discipline::Cycling { elevation_gain }, Origin::Stored) => {
            ensure_finite(Field::ElevationGain, elevation_gain)?;
        }
        _ => {
            let (field, metric) = discipline.metric();
            ensure_positive(field, metric)?;
        }
    }
    // Extreme but finite inputs can still overflow the derived rate
    match discipline {
        Discipline::Running { .. } => ensure_finite(Field::Distance, duration / distance)?,
        Discipline::Cycling { .. } => ensure_finite(Field::Duration, distance / (duration / 60.0))?,
    };
    Ok(())
}

/// Numeric values entered for one workout, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutInput {
    pub kind: WorkoutKind,
    /// Kilometers.
    pub distance: f64,
    /// Minutes.
    pub duration: f64,
    /// Cadence for running, elevation gain for cycling.
    pub metric: f64,
}

impl WorkoutInput {
    /// Check the values without building a workout.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self.distance, self.duration, self.discipline(), Origin::Entered)
    }

    fn discipline(&self) -> Discipline {
        match self.kind {
            WorkoutKind::Running => Discipline::Running {
                cadence: self.metric,
            },
            WorkoutKind::Cycling => Discipline::Cycling {
                elevation_gain: self.metric,
            },
        }
    }
}

/// One logged activity. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    date: DateTime<Utc>,
    coords: Coords,
    distance: f64,
    duration: f64,
    discipline: Discipline,
    description: String,
}

impl Workout {
    /// Validate `input` and build the matching variant.
    ///
    /// Distance, duration and the discipline metric must all be finite and
    /// strictly positive. The description is derived from the local calendar
    /// date of `date`.
    pub fn create(
        id: WorkoutId,
        date: DateTime<Utc>,
        coords: Coords,
        input: WorkoutInput,
    ) -> Result<Self, ValidationError> {
        Self::from_parts(
            id,
            date,
            coords,
            input.distance,
            input.duration,
            input.discipline(),
            Origin::Entered,
        )
    }

    pub fn running(
        id: WorkoutId,
        date: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: f64,
    ) -> Result<Self, ValidationError> {
        Self::from_parts(
            id,
            date,
            coords,
            distance,
            duration,
            Discipline::Running { cadence },
            Origin::Entered,
        )
    }

    pub fn cycling(
        id: WorkoutId,
        date: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    ) -> Result<Self, ValidationError> {
        Self::from_parts(
            id,
            date,
            coords,
            distance,
            duration,
            Discipline::Cycling { elevation_gain },
            Origin::Entered,
        )
    }

    pub(crate) fn from_parts(
        id: WorkoutId,
        date: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        discipline: Discipline,
        origin: Origin,
    ) -> Result<Self, ValidationError> {
        validate(distance, duration, discipline, origin)?;

        let description = describe(discipline.kind(), &date.with_timezone(&Local));
        Ok(Self {
            id,
            date,
            coords,
            distance,
            duration,
            discipline,
            description,
        })
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    pub fn kind(&self) -> WorkoutKind {
        self.discipline.kind()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Minutes per kilometer, running only.
    pub fn pace(&self) -> Option<f64> {
        match self.discipline {
            Discipline::Running { .. } => Some(self.duration / self.distance),
            Discipline::Cycling { .. } => None,
        }
    }

    /// Kilometers per hour, cycling only.
    pub fn speed(&self) -> Option<f64> {
        match self.discipline {
            Discipline::Cycling { .. } => Some(self.distance / (self.duration / 60.0)),
            Discipline::Running { .. } => None,
        }
    }

    pub fn cadence(&self) -> Option<f64> {
        match self.discipline {
            Discipline::Running { cadence } => Some(cadence),
            Discipline::Cycling { .. } => None,
        }
    }

    pub fn elevation_gain(&self) -> Option<f64> {
        match self.discipline {
            Discipline::Cycling { elevation_gain } => Some(elevation_gain),
            Discipline::Running { .. } => None,
        }
    }

    /// Marker popup text: icon followed by the description.
    pub fn label(&self) -> String {
        format!("{} {}", self.kind().icon(), self.description)
    }
}

/// "Running on April 14" for the calendar date of `date` in its own zone.
pub fn describe<Tz: TimeZone>(kind: WorkoutKind, date: &DateTime<Tz>) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{} on {} {}", kind.title(), month, date.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn id() -> WorkoutId {
        WorkoutId::new("1713096000000")
    }

    #[test]
    fn running_scenario_pace() {
        let w = Workout::running(id(), at(2024, 4, 14), Coords::new(50.0, -12.0), 5.2, 2.0, 178.0)
            .unwrap();
        assert!((w.pace().unwrap() - 0.384_615).abs() < 1e-5);
        assert_eq!(w.speed(), None);
        assert_eq!(w.cadence(), Some(178.0));
        assert_eq!(w.kind(), WorkoutKind::Running);
        let local = w.date().with_timezone(&Local);
        assert_eq!(w.description(), describe(WorkoutKind::Running, &local));
    }

    #[test]
    fn cycling_scenario_speed() {
        let w = Workout::cycling(id(), at(2024, 4, 14), Coords::new(50.0, -16.0), 27.0, 95.0, 538.0)
            .unwrap();
        assert!((w.speed().unwrap() - 17.052_63).abs() < 1e-4);
        assert_eq!(w.pace(), None);
        assert_eq!(w.elevation_gain(), Some(538.0));
        assert!(w.description().starts_with("Cycling on "));
    }

    #[test]
    fn describe_uses_month_name_and_day() {
        assert_eq!(describe(WorkoutKind::Running, &at(2024, 4, 14)), "Running on April 14");
        assert_eq!(describe(WorkoutKind::Cycling, &at(2023, 12, 1)), "Cycling on December 1");
    }

    #[test]
    fn rejects_non_positive_and_non_finite_values() {
        let c = Coords::new(0.0, 0.0);
        let err = Workout::running(id(), at(2024, 1, 1), c, 0.0, 10.0, 170.0).unwrap_err();
        assert_eq!(err, ValidationError::NotPositive(Field::Distance));

        let err = Workout::running(id(), at(2024, 1, 1), c, 5.0, f64::NAN, 170.0).unwrap_err();
        assert_eq!(err, ValidationError::NotFinite(Field::Duration));

        let err = Workout::running(id(), at(2024, 1, 1), c, 5.0, 10.0, -1.0).unwrap_err();
        assert_eq!(err, ValidationError::NotPositive(Field::Cadence));

        let err = Workout::cycling(id(), at(2024, 1, 1), c, 5.0, 10.0, 0.0).unwrap_err();
        assert_eq!(err, ValidationError::NotPositive(Field::ElevationGain));

        let err = Workout::cycling(id(), at(2024, 1, 1), c, f64::INFINITY, 10.0, 5.0).unwrap_err();
        assert_eq!(err, ValidationError::NotFinite(Field::Distance));
        assert_eq!(err.user_message(), ALERT_INVALID_INPUT);
    }

    #[test]
    fn stored_cycling_keeps_zero_or_negative_elevation() {
        let c = Coords::new(0.0, 0.0);
        for elevation in [0.0, -120.0] {
            let w = Workout::from_parts(
                id(),
                at(2024, 1, 1),
                c,
                20.0,
                60.0,
                Discipline::Cycling { elevation_gain: elevation },
                Origin::Stored,
            )
            .unwrap();
            assert_eq!(w.elevation_gain(), Some(elevation));
        }

        let err = Workout::from_parts(
            id(),
            at(2024, 1, 1),
            c,
            20.0,
            60.0,
            Discipline::Cycling { elevation_gain: f64::NAN },
            Origin::Stored,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::NotFinite(Field::ElevationGain));

        let err = Workout::from_parts(
            id(),
            at(2024, 1, 1),
            c,
            20.0,
            60.0,
            Discipline::Running { cadence: 0.0 },
            Origin::Stored,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::NotPositive(Field::Cadence));
    }

    #[test]
    fn overflowing_rates_are_rejected() {
        let c = Coords::new(0.0, 0.0);
        let err = Workout::running(id(), at(2024, 1, 1), c, 1e-300, 1e10, 170.0).unwrap_err();
        assert_eq!(err, ValidationError::NotFinite(Field::Distance));

        let err = Workout::cycling(id(), at(2024, 1, 1), c, 1e308, 0.5, 100.0).unwrap_err();
        assert_eq!(err, ValidationError::NotFinite(Field::Duration));
    }

    #[test]
    fn input_validation_matches_create() {
        let mut input = WorkoutInput {
            kind: WorkoutKind::Running,
            distance: 5.0,
            duration: 25.0,
            metric: 170.0,
        };
        assert_eq!(input.validate(), Ok(()));
        input.duration = -1.0;
        assert_eq!(input.validate(), Err(ValidationError::NotPositive(Field::Duration)));
    }

    #[test]
    fn create_dispatches_on_kind() {
        let input = WorkoutInput {
            kind: WorkoutKind::Cycling,
            distance: 10.0,
            duration: 30.0,
            metric: 120.0,
        };
        let w = Workout::create(id(), at(2024, 6, 2), Coords::new(1.0, 2.0), input).unwrap();
        assert_eq!(w.discipline(), Discipline::Cycling { elevation_gain: 120.0 });
        assert_eq!(w.speed(), Some(20.0));
        assert!(w.label().starts_with("🚴‍♀️ Cycling on "));
    }

    #[test]
    fn coords_serialize_as_pair() {
        let json = serde_json::to_string(&Coords::new(50.5, -12.25)).unwrap();
        assert_eq!(json, "[50.5,-12.25]");
        let back: Coords = serde_json::from_str("[1.0,2.0]").unwrap();
        assert_eq!(back, Coords::new(1.0, 2.0));
    }

    #[test]
    fn form_value_parsing() {
        assert_eq!(WorkoutKind::from_form_value("cycling"), Some(WorkoutKind::Cycling));
        assert_eq!(WorkoutKind::from_form_value(" running "), Some(WorkoutKind::Running));
        assert_eq!(WorkoutKind::from_form_value("swimming"), None);
    }

    proptest! {
        #[test]
        fn pace_is_duration_over_distance(
            distance in 0.001f64..1_000.0,
            duration in 0.001f64..10_000.0,
            cadence in 0.001f64..400.0,
        ) {
            let w = Workout::running(id(), at(2024, 4, 14), Coords::new(0.0, 0.0), distance, duration, cadence).unwrap();
            prop_assert_eq!(w.pace(), Some(duration / distance));
            prop_assert!(w.description().contains("Running"));
        }

        #[test]
        fn speed_is_distance_per_hour(
            distance in 0.001f64..1_000.0,
            duration in 0.001f64..10_000.0,
            elevation in 0.001f64..9_000.0,
        ) {
            let w = Workout::cycling(id(), at(2024, 4, 14), Coords::new(0.0, 0.0), distance, duration, elevation).unwrap();
            prop_assert_eq!(w.speed(), Some(distance / (duration / 60.0)));
        }

        #[test]
        fn non_positive_values_are_rejected(bad in -1_000.0f64..=0.0, slot in 0usize..3) {
            let mut values = [5.0, 30.0, 170.0];
            values[slot] = bad;
            let res = Workout::running(id(), at(2024, 4, 14), Coords::new(0.0, 0.0), values[0], values[1], values[2]);
            prop_assert!(matches!(res, Err(ValidationError::NotPositive(_))));
        }
    }
}
