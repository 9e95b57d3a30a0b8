//! Browser geolocation as a future.

use futures::channel::oneshot;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{GeolocationPosition, GeolocationPositionError};
use workout_map::Coords;

#[derive(Debug)]
pub enum GeolocationError {
    /// The browser has no geolocation API.
    Unsupported,
    /// The user or the device refused to provide a position.
    Failed(String),
    /// The callbacks were dropped without firing.
    Cancelled,
}

impl fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeolocationError::Unsupported => write!(f, "Geolocation is not supported"),
            GeolocationError::Failed(msg) => write!(f, "Geolocation failed: {}", msg),
            GeolocationError::Cancelled => write!(f, "Geolocation request was cancelled"),
        }
    }
}

impl std::error::Error for GeolocationError {}

type Reply = Rc<RefCell<Option<oneshot::Sender<Result<Coords, GeolocationError>>>>>;

fn reply(slot: &Reply, value: Result<Coords, GeolocationError>) {
    if let Some(tx) = slot.borrow_mut().take() {
        let _ = tx.send(value);
    }
}

/// Ask the browser for the current position. Resolves once either callback
/// fires; there is no timeout and no retry.
pub async fn current_position() -> Result<Coords, GeolocationError> {
    let geolocation = gloo_utils::window()
        .navigator()
        .geolocation()
        .map_err(|_| GeolocationError::Unsupported)?;

    let (tx, rx) = oneshot::channel();
    let slot: Reply = Rc::new(RefCell::new(Some(tx)));

    let on_success: Closure<dyn FnMut(GeolocationPosition)> = {
        let slot = slot.clone();
        Closure::once(move |pos: GeolocationPosition| {
            let c = pos.coords();
            reply(&slot, Ok(Coords::new(c.latitude(), c.longitude())));
        })
    };
    let on_error: Closure<dyn FnMut(GeolocationPositionError)> = {
        let slot = slot.clone();
        Closure::once(move |err: GeolocationPositionError| {
            reply(&slot, Err(GeolocationError::Failed(err.message())));
        })
    };

    geolocation
        .get_current_position_with_error_callback(
            on_success.as_ref().unchecked_ref(),
            Some(on_error.as_ref().unchecked_ref()),
        );

    // Both closures must outlive the await.
    let result = rx.await.unwrap_or(Err(GeolocationError::Cancelled));
    drop(on_success);
    drop(on_error);
    result
}
