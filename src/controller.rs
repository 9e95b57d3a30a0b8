//! Application state machine.
//!
//! The controller owns the workout store, the persistence adapter and the
//! form/map state. Every event handler returns the UI [`Effect`]s the browser
//! shell has to apply; the controller itself never touches the DOM or the map.
//!
//! Phases: `Idle` → `Entering` (form visible, click position pending) → `Idle`.

use crate::config::{ALERT_NO_POSITION, MAP_ZOOM_LEVEL};
use crate::form::FormInput;
use crate::storage::{KeyValueStore, Persistence};
use crate::store::WorkoutStore;
use crate::workout::{Coords, Workout, WorkoutKind};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// No form shown.
    Idle,
    /// Form visible; `pending` is where the map was clicked.
    Entering { pending: Coords },
}

/// A marker to place on the map, with its popup.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coords: Coords,
    /// CSS class of the popup, `running-popup` or `cycling-popup`.
    pub class_name: String,
    pub label: String,
}

impl From<&Workout> for Marker {
    fn from(w: &Workout) -> Self {
        Self {
            coords: w.coords(),
            class_name: format!("{}-popup", w.kind()),
            label: w.label(),
        }
    }
}

/// Side effects requested from the browser shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ShowForm,
    /// Clear the inputs and hide the form.
    HideForm,
    ToggleDisciplineFields(WorkoutKind),
    AddMarker(Marker),
    /// The workout list gained entries and must be re-rendered.
    ListChanged,
    PanTo { coords: Coords, zoom: u8 },
    Alert(String),
    /// Reload the whole application.
    Reload,
}

pub struct Controller<S: KeyValueStore> {
    store: WorkoutStore,
    persistence: Persistence<S>,
    phase: Phase,
    map_ready: bool,
}

impl<S: KeyValueStore> Controller<S> {
    /// Load persisted workouts from `storage`. Their list entries can be
    /// rendered right away; markers follow in [`Controller::on_map_ready`].
    pub fn start(storage: S) -> Self {
        let persistence = Persistence::new(storage);
        let store = WorkoutStore::from_workouts(persistence.load());
        info!("Loaded {} stored workouts", store.len());
        Self {
            store,
            persistence,
            phase: Phase::Idle,
            map_ready: false,
        }
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_map_ready(&self) -> bool {
        self.map_ready
    }

    /// The map finished loading: place markers for every known workout.
    pub fn on_map_ready(&mut self) -> Vec<Effect> {
        self.map_ready = true;
        debug!("Map ready, placing {} markers", self.store.len());
        self.store
            .iter()
            .map(|w| Effect::AddMarker(Marker::from(w)))
            .collect()
    }

    /// Position lookup failed; the map stays unavailable for the session.
    pub fn on_geolocation_failed(&mut self) -> Vec<Effect> {
        warn!("Geolocation failed, map disabled");
        vec![Effect::Alert(ALERT_NO_POSITION.to_string())]
    }

    pub fn on_map_click(&mut self, coords: Coords) -> Vec<Effect> {
        if !self.map_ready {
            debug!("Ignoring map click before the map is ready");
            return Vec::new();
        }
        self.phase = Phase::Entering { pending: coords };
        vec![Effect::ShowForm]
    }

    /// Submit the entry form. `now` becomes the workout's creation time.
    pub fn on_submit(&mut self, form: &FormInput, now: DateTime<Utc>) -> Vec<Effect> {
        let Phase::Entering { pending } = self.phase else {
            debug!("Ignoring form submission without a selected position");
            return Vec::new();
        };

        let input = form.to_input();
        if let Err(e) = input.validate() {
            debug!("Rejected workout: {}", e);
            return vec![Effect::Alert(e.user_message().to_string())];
        }
        let id = self.store.next_id(now);
        let workout = match Workout::create(id, now, pending, input) {
            Ok(w) => w,
            Err(e) => {
                debug!("Rejected workout: {}", e);
                return vec![Effect::Alert(e.user_message().to_string())];
            }
        };

        let marker = Marker::from(&workout);
        info!("Added {} ({})", workout.description(), workout.id());
        self.store.add(workout);
        if let Err(e) = self.persistence.save(self.store.all()) {
            warn!("Workout kept for this session only: {}", e);
        }
        self.phase = Phase::Idle;

        vec![Effect::AddMarker(marker), Effect::ListChanged, Effect::HideForm]
    }

    pub fn on_discipline_change(&self, kind: WorkoutKind) -> Vec<Effect> {
        vec![Effect::ToggleDisciplineFields(kind)]
    }

    /// A click inside the list. `id` is the `data-id` of the enclosing
    /// entry, `None` when the click landed outside any entry.
    pub fn on_list_click(&self, id: Option<&str>) -> Vec<Effect> {
        let Some(id) = id else {
            return Vec::new();
        };
        if !self.map_ready {
            return Vec::new();
        }
        match self.store.find(id) {
            Some(w) => vec![Effect::PanTo {
                coords: w.coords(),
                zoom: MAP_ZOOM_LEVEL,
            }],
            None => {
                debug!("No workout with id {}", id);
                Vec::new()
            }
        }
    }

    /// Forget every workout and reload the application.
    pub fn reset(&mut self) -> Vec<Effect> {
        if let Err(e) = self.persistence.clear() {
            warn!("{}", e);
        }
        self.store.clear();
        self.phase = Phase::Idle;
        info!("Workout history cleared");
        vec![Effect::Reload]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ALERT_INVALID_INPUT, STORAGE_KEY};
    use crate::storage::MemoryStorage;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 14, 9, 30, 0).unwrap()
    }

    fn running_form() -> FormInput {
        FormInput {
            kind: WorkoutKind::Running,
            distance: "5.2".into(),
            duration: "2".into(),
            cadence: "178".into(),
            elevation: String::new(),
        }
    }

    fn ready(storage: MemoryStorage) -> Controller<MemoryStorage> {
        let mut c = Controller::start(storage);
        c.on_map_ready();
        c
    }

    #[test]
    fn click_then_submit_records_workout() {
        let storage = MemoryStorage::new();
        let mut c = ready(storage.clone());
        let spot = Coords::new(50.0, -12.0);

        assert_eq!(c.on_map_click(spot), vec![Effect::ShowForm]);
        assert_eq!(c.phase(), Phase::Entering { pending: spot });

        let effects = c.on_submit(&running_form(), now());
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.store().len(), 1);

        let w = &c.store().all()[0];
        assert_eq!(w.coords(), spot);
        assert_eq!(
            effects,
            vec![
                Effect::AddMarker(Marker {
                    coords: spot,
                    class_name: "running-popup".into(),
                    label: w.label(),
                }),
                Effect::ListChanged,
                Effect::HideForm,
            ]
        );
        assert!(storage.get(STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn invalid_submit_alerts_and_keeps_form_open() {
        let storage = MemoryStorage::new();
        let mut c = ready(storage.clone());
        let spot = Coords::new(1.0, 2.0);
        c.on_map_click(spot);

        let mut form = running_form();
        form.distance = "-3".into();
        let effects = c.on_submit(&form, now());

        assert_eq!(effects, vec![Effect::Alert(ALERT_INVALID_INPUT.to_string())]);
        assert_eq!(c.phase(), Phase::Entering { pending: spot });
        assert!(c.store().is_empty());
        assert_eq!(storage.get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn rejected_submit_does_not_consume_an_id() {
        let mut c = ready(MemoryStorage::new());
        c.on_map_click(Coords::new(1.0, 2.0));

        let mut form = running_form();
        form.duration = "abc".into();
        c.on_submit(&form, now());
        c.on_submit(&form, now());

        c.on_submit(&running_form(), now());
        let id = c.store().all()[0].id();
        assert_eq!(id.as_millis(), Some(now().timestamp_millis()));
    }

    #[test]
    fn blank_cycling_elevation_is_rejected() {
        let mut c = ready(MemoryStorage::new());
        c.on_map_click(Coords::new(1.0, 2.0));
        let form = FormInput {
            kind: WorkoutKind::Cycling,
            distance: "27".into(),
            duration: "95".into(),
            cadence: "180".into(),
            elevation: String::new(),
        };
        assert!(matches!(c.on_submit(&form, now()).as_slice(), [Effect::Alert(_)]));
        assert!(c.store().is_empty());
    }

    #[test]
    fn submit_while_idle_is_ignored() {
        let mut c = ready(MemoryStorage::new());
        assert!(c.on_submit(&running_form(), now()).is_empty());
        assert!(c.store().is_empty());
    }

    #[test]
    fn map_click_before_map_ready_is_ignored() {
        let mut c = Controller::start(MemoryStorage::new());
        assert!(c.on_map_click(Coords::new(1.0, 1.0)).is_empty());
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn discipline_change_keeps_phase() {
        let mut c = ready(MemoryStorage::new());
        c.on_map_click(Coords::new(1.0, 1.0));
        let effects = c.on_discipline_change(WorkoutKind::Cycling);
        assert_eq!(effects, vec![Effect::ToggleDisciplineFields(WorkoutKind::Cycling)]);
        assert!(matches!(c.phase(), Phase::Entering { .. }));
    }

    #[test]
    fn list_click_pans_to_known_workout() {
        let mut c = ready(MemoryStorage::new());
        let spot = Coords::new(48.1, 11.5);
        c.on_map_click(spot);
        c.on_submit(&running_form(), now());
        let id = c.store().all()[0].id().to_string();

        assert_eq!(
            c.on_list_click(Some(&id)),
            vec![Effect::PanTo {
                coords: spot,
                zoom: MAP_ZOOM_LEVEL
            }]
        );
        assert!(c.on_list_click(Some("unknown")).is_empty());
        assert!(c.on_list_click(None).is_empty());
    }

    #[test]
    fn restart_loads_history_and_places_markers_when_map_is_ready() {
        let storage = MemoryStorage::new();
        {
            let mut c = ready(storage.clone());
            c.on_map_click(Coords::new(50.0, -12.0));
            c.on_submit(&running_form(), now());
            c.on_map_click(Coords::new(50.0, -16.0));
            let ride = FormInput {
                kind: WorkoutKind::Cycling,
                distance: "27".into(),
                duration: "95".into(),
                cadence: String::new(),
                elevation: "538".into(),
            };
            c.on_submit(&ride, now());
        }

        let mut c = Controller::start(storage);
        assert_eq!(c.store().len(), 2);
        assert!(!c.is_map_ready());
        assert!(c.on_list_click(Some(c.store().all()[0].id().as_str())).is_empty());

        let effects = c.on_map_ready();
        assert_eq!(effects.len(), 2);
        assert!(matches!(&effects[1], Effect::AddMarker(m) if m.class_name == "cycling-popup"));
        let ids: Vec<_> = c.store().iter().map(|w| w.id().clone()).collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn reset_clears_storage_and_requests_reload() {
        let storage = MemoryStorage::new();
        let mut c = ready(storage.clone());
        c.on_map_click(Coords::new(1.0, 1.0));
        c.on_submit(&running_form(), now());

        assert_eq!(c.reset(), vec![Effect::Reload]);
        assert!(c.store().is_empty());
        assert!(Controller::start(storage).store().is_empty());
    }

    #[test]
    fn storage_failure_keeps_session_record() {
        let mut c = ready(MemoryStorage::read_only());
        c.on_map_click(Coords::new(1.0, 1.0));
        let effects = c.on_submit(&running_form(), now());
        assert_eq!(c.store().len(), 1);
        assert!(effects.contains(&Effect::HideForm));
    }

    #[test]
    fn geolocation_failure_alerts() {
        let mut c = Controller::start(MemoryStorage::new());
        assert_eq!(
            c.on_geolocation_failed(),
            vec![Effect::Alert(ALERT_NO_POSITION.to_string())]
        );
        assert!(!c.is_map_ready());
    }
}
