use web_sys::HtmlInputElement;
use workout_map::{FormInput, WorkoutKind};
use yew::prelude::*;

/// Holds the entry form's text and the input callbacks for each field.
#[derive(Clone, PartialEq)]
pub struct WorkoutForm {
    /// Current text of every field.
    pub values: FormInput,
    pub on_distance: Callback<InputEvent>,
    pub on_duration: Callback<InputEvent>,
    pub on_cadence: Callback<InputEvent>,
    pub on_elevation: Callback<InputEvent>,
    /// Switch the discipline whose metric row is shown.
    pub set_kind: Callback<WorkoutKind>,
    /// Empty the numeric fields, keeping the discipline.
    pub clear: Callback<()>,
}

/// Build an `oninput` callback writing the input's text through `apply`.
fn field_input(
    form: &UseStateHandle<FormInput>,
    apply: fn(&mut FormInput, String),
) -> Callback<InputEvent> {
    let form = form.clone();
    Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let mut next = (*form).clone();
        apply(&mut next, input.value());
        form.set(next);
    })
}

/// Custom hook to manage the text state of the entry form.
#[hook]
pub fn use_workout_form() -> WorkoutForm {
    let form_handle: UseStateHandle<FormInput> = use_state(FormInput::default);

    let set_kind = {
        let form = form_handle.clone();
        Callback::from(move |kind: WorkoutKind| {
            let mut next = (*form).clone();
            next.kind = kind;
            form.set(next);
        })
    };

    let clear = {
        let form = form_handle.clone();
        Callback::from(move |_| {
            let mut next = (*form).clone();
            next.clear_values();
            form.set(next);
        })
    };

    WorkoutForm {
        values: (*form_handle).clone(),
        on_distance: field_input(&form_handle, |f, v| f.distance = v),
        on_duration: field_input(&form_handle, |f, v| f.duration = v),
        on_cadence: field_input(&form_handle, |f, v| f.cadence = v),
        on_elevation: field_input(&form_handle, |f, v| f.elevation = v),
        set_kind,
        clear,
    }
}
