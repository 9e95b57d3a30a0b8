//! Main module for the workout map application using Yew.
//! Wires the controller, UI components, the map and geolocation.

use chrono::Utc;
use gloo_timers::callback::Timeout;
use log::{info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::{Element, HtmlSelectElement};
use workout_map::config::{FORM_RESET_DELAY_MS, MAP_ZOOM_LEVEL};
use workout_map::{Controller, Effect, KeyValueStore, LocalStorage, MemoryStorage, WorkoutKind};
use yew::prelude::*;

mod components;
mod geolocation;
mod hooks;
mod map;

use components::{render_workout, EntryForm};
use hooks::{use_workout_form, WorkoutForm};

type AppController = Controller<Box<dyn KeyValueStore>>;

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

/// Local storage when the browser grants it, otherwise a session-only store.
fn open_storage() -> Box<dyn KeyValueStore> {
    match LocalStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            warn!("{}; workouts will not survive a reload", e);
            Box::new(MemoryStorage::new())
        }
    }
}

fn alert(message: &str) {
    if let Err(e) = gloo_utils::window().alert_with_message(message) {
        warn!("alert failed: {:?}", e);
    }
}

/// `data-id` of the list entry enclosing the click target, if any.
fn clicked_workout_id(e: &MouseEvent) -> Option<String> {
    let target: Element = e.target_dyn_into()?;
    let entry = target.closest(".workout").ok().flatten()?;
    entry.get_attribute("data-id")
}

/// State handles the controller's effects are applied to.
#[derive(Clone)]
struct Ui {
    controller: Rc<RefCell<AppController>>,
    form: WorkoutForm,
    form_visible: UseStateHandle<bool>,
    form_suppressed: UseStateHandle<bool>,
    form_reset_timer: UseStateHandle<Option<Timeout>>,
    list_version: UseStateHandle<usize>,
}

impl Ui {
    fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ShowForm => self.form_visible.set(true),
                Effect::HideForm => {
                    self.form.clear.emit(());
                    self.form_visible.set(false);
                    self.form_suppressed.set(true);
                    // Restore the grid layout once the form is out of view
                    let suppressed = self.form_suppressed.clone();
                    let handle = Timeout::new(FORM_RESET_DELAY_MS, move || suppressed.set(false));
                    self.form_reset_timer.set(Some(handle));
                }
                Effect::ToggleDisciplineFields(kind) => self.form.set_kind.emit(kind),
                Effect::AddMarker(marker) => map::add_marker(&marker),
                Effect::ListChanged => self.list_version.set(self.list_version.wrapping_add(1)),
                Effect::PanTo { coords, zoom } => map::pan_to(coords, zoom),
                Effect::Alert(message) => alert(&message),
                Effect::Reload => {
                    if let Err(e) = gloo_utils::window().location().reload() {
                        warn!("reload failed: {:?}", e);
                    }
                }
            }
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────

/// Primary application component wiring state, effects, and UI elements.
#[function_component(App)]
fn app() -> Html {
    let controller = use_mut_ref(|| Controller::start(open_storage()));
    let form = use_workout_form();
    let form_visible = use_state(|| false);
    let form_suppressed = use_state(|| false);
    let form_reset_timer = use_state(|| None::<Timeout>);
    // Bumped whenever the store gains entries to trigger a re-render
    let list_version = use_state(|| 0usize);

    let ui = Ui {
        controller: controller.clone(),
        form: form.clone(),
        form_visible: form_visible.clone(),
        form_suppressed: form_suppressed.clone(),
        form_reset_timer,
        list_version: list_version.clone(),
    };

    // Locate the user, then bring up the map and its markers
    {
        let ui = ui.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match geolocation::current_position().await {
                    Ok(center) => {
                        info!("Centering map on {:.4}, {:.4}", center.lat, center.lng);
                        let click_ui = ui.clone();
                        map::show_map(center, MAP_ZOOM_LEVEL, move |coords| {
                            let effects = click_ui.controller.borrow_mut().on_map_click(coords);
                            click_ui.apply(effects);
                        });
                        let effects = ui.controller.borrow_mut().on_map_ready();
                        ui.apply(effects);
                    }
                    Err(e) => {
                        warn!("{}", e);
                        let effects = ui.controller.borrow_mut().on_geolocation_failed();
                        ui.apply(effects);
                    }
                }
            });
            || ()
        });
    }

    let onsubmit = {
        let ui = ui.clone();
        let values = form.values.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let effects = ui.controller.borrow_mut().on_submit(&values, Utc::now());
            ui.apply(effects);
        })
    };

    let onkindchange = {
        let ui = ui.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let Some(kind) = WorkoutKind::from_form_value(&select.value()) else {
                warn!("Unknown workout type {:?}", select.value());
                return;
            };
            let effects = ui.controller.borrow().on_discipline_change(kind);
            ui.apply(effects);
        })
    };

    let onlistclick = {
        let ui = ui.clone();
        Callback::from(move |e: MouseEvent| {
            let id = clicked_workout_id(&e);
            let effects = ui.controller.borrow().on_list_click(id.as_deref());
            ui.apply(effects);
        })
    };

    let onreset = {
        let ui = ui.clone();
        Callback::from(move |_: MouseEvent| {
            let effects = ui.controller.borrow_mut().reset();
            ui.apply(effects);
        })
    };

    // Ensure re-render on store updates by reading list_version
    let _ = *list_version;
    // Newest entries sit directly beneath the form
    let entries = controller
        .borrow()
        .store()
        .iter()
        .rev()
        .map(render_workout)
        .collect::<Html>();

    html! {
        <div class="app">
            <div class="sidebar">
                <ul class="workouts" onclick={onlistclick}>
                    <EntryForm
                        form={form}
                        visible={*form_visible}
                        suppressed={*form_suppressed}
                        onsubmit={onsubmit}
                        onkindchange={onkindchange}
                    />
                    { entries }
                </ul>
                <button class="btn-secondary small reset" onclick={onreset}>
                    { "Reset workouts" }
                </button>
            </div>
            <div id="map"></div>
        </div>
    }
}

/// Entry point: initializes Yew renderer for the App component.
fn main() {
    // Set the panic hook to log detailed errors to the console
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
