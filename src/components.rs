//! Yew view components for the workout form and list.

use crate::hooks::WorkoutForm;
use log::warn;
use web_sys::HtmlInputElement;
use workout_map::{format_metric, Workout, WorkoutKind};
use yew::prelude::*;

/// One value with its icon and unit.
fn render_detail(icon: &str, value: String, unit: &str) -> Html {
    html! {
        <div class="workout__details">
            <span class="workout__icon">{ icon.to_string() }</span>
            <span class="workout__value">{ value }</span>
            <span class="workout__unit">{ unit.to_string() }</span>
        </div>
    }
}

/// Renders a single list entry. The `data-id` attribute is what list clicks
/// resolve back to a workout.
pub fn render_workout(workout: &Workout) -> Html {
    let kind = workout.kind();
    let metrics = match kind {
        WorkoutKind::Running => html! {
            <>
                { render_detail("⚡️", workout.pace().map(format_metric).unwrap_or_default(), "min/km") }
                { render_detail("🦶🏼", workout.cadence().map(|c| c.to_string()).unwrap_or_default(), "spm") }
            </>
        },
        WorkoutKind::Cycling => html! {
            <>
                { render_detail("⚡️", workout.speed().map(format_metric).unwrap_or_default(), "km/h") }
                { render_detail("⛰", workout.elevation_gain().map(|e| e.to_string()).unwrap_or_default(), "m") }
            </>
        },
    };

    html! {
        <li class={classes!("workout", format!("workout--{}", kind))}
            data-id={workout.id().to_string()}
            key={workout.id().to_string()}>
            <h2 class="workout__title">{ workout.description() }</h2>
            { render_detail(kind.icon(), workout.distance().to_string(), "km") }
            { render_detail("⏱", workout.duration().to_string(), "min") }
            { metrics }
        </li>
    }
}

/// Entry form shown after a map click.
#[derive(Properties, PartialEq)]
pub struct EntryFormProps {
    pub form: WorkoutForm,
    /// Whether the form is shown (`hidden` class removed).
    pub visible: bool,
    /// Forces `display: none` while the hide transition settles.
    pub suppressed: bool,
    pub onsubmit: Callback<SubmitEvent>,
    pub onkindchange: Callback<Event>,
}

#[function_component(EntryForm)]
pub fn entry_form(props: &EntryFormProps) -> Html {
    let distance_ref = use_node_ref();

    // Focus distance whenever the form opens
    {
        let distance_ref = distance_ref.clone();
        use_effect_with(props.visible, move |visible| {
            if *visible {
                if let Some(input) = distance_ref.cast::<HtmlInputElement>() {
                    if let Err(e) = input.focus() {
                        warn!("focus failed: {:?}", e);
                    }
                }
            }
            || ()
        });
    }

    let values = &props.form.values;
    let running = values.kind == WorkoutKind::Running;
    let row_class = |shown: bool| classes!("form__row", (!shown).then_some("form__row--hidden"));

    html! {
        <form class={classes!("form", (!props.visible).then_some("hidden"))}
            style={props.suppressed.then_some("display: none")}
            onsubmit={props.onsubmit.clone()}>
            <div class="form__row">
                <label class="form__label">{ "Type" }</label>
                <select class="form__input form__input--type" onchange={props.onkindchange.clone()}>
                    <option value="running" selected={running}>{ "Running" }</option>
                    <option value="cycling" selected={!running}>{ "Cycling" }</option>
                </select>
            </div>
            <div class="form__row">
                <label class="form__label">{ "Distance" }</label>
                <input class="form__input form__input--distance"
                    ref={distance_ref}
                    placeholder="km"
                    value={values.distance.clone()}
                    oninput={props.form.on_distance.clone()}
                />
            </div>
            <div class="form__row">
                <label class="form__label">{ "Duration" }</label>
                <input class="form__input form__input--duration"
                    placeholder="min"
                    value={values.duration.clone()}
                    oninput={props.form.on_duration.clone()}
                />
            </div>
            <div class={row_class(running)}>
                <label class="form__label">{ "Cadence" }</label>
                <input class="form__input form__input--cadence"
                    placeholder="step/min"
                    value={values.cadence.clone()}
                    oninput={props.form.on_cadence.clone()}
                />
            </div>
            <div class={row_class(!running)}>
                <label class="form__label">{ "Elev Gain" }</label>
                <input class="form__input form__input--elevation"
                    placeholder="meters"
                    value={values.elevation.clone()}
                    oninput={props.form.on_elevation.clone()}
                />
            </div>
            <button class="form__btn">{ "OK" }</button>
        </form>
    }
}
