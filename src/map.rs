//! JavaScript interop for the Leaflet map.
//! Provides Rust bindings to the map helper functions defined in map_helpers.js.

use log::warn;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use workout_map::config::PAN_DURATION_SEC;
use workout_map::{Coords, Marker};

#[wasm_bindgen(module = "/map_helpers.js")]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map(lat: f64, lng: f64, zoom: u8, on_click: &Closure<dyn FnMut(f64, f64)>);

    #[wasm_bindgen(js_name = addWorkoutMarker)]
    fn add_workout_marker(lat: f64, lng: f64, popup: JsValue);

    #[wasm_bindgen(js_name = panTo)]
    fn pan_map_to(lat: f64, lng: f64, zoom: u8, duration_sec: f64);
}

/// Popup options handed to `L.popup`, plus the popup text.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PopupOptions<'a> {
    max_width: u32,
    min_width: u32,
    auto_close: bool,
    close_on_click: bool,
    class_name: &'a str,
    content: &'a str,
}

/// Create the map centered on `center` and route clicks to `on_click`.
///
/// The click handler lives as long as the page.
pub fn show_map(center: Coords, zoom: u8, mut on_click: impl FnMut(Coords) + 'static) {
    let handler = Closure::<dyn FnMut(f64, f64)>::new(move |lat: f64, lng: f64| {
        on_click(Coords::new(lat, lng));
    });
    init_map(center.lat, center.lng, zoom, &handler);
    handler.forget();
}

/// Place a marker with an open popup that survives other clicks.
pub fn add_marker(marker: &Marker) {
    let options = PopupOptions {
        max_width: 250,
        min_width: 100,
        auto_close: false,
        close_on_click: false,
        class_name: &marker.class_name,
        content: &marker.label,
    };
    match serde_wasm_bindgen::to_value(&options) {
        Ok(popup) => add_workout_marker(marker.coords.lat, marker.coords.lng, popup),
        Err(e) => warn!("Failed to build popup options: {}", e),
    }
}

/// Re-center the map with an animated pan.
pub fn pan_to(coords: Coords, zoom: u8) {
    pan_map_to(coords.lat, coords.lng, zoom, PAN_DURATION_SEC);
}
