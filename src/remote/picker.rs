//! Dependent state list - follows the selected country
//!
//! The state list is disabled until a country is chosen. Choosing a country
//! clears the list and starts a new load tagged with a generation number;
//! a result only lands if its generation is still current, so a slow
//! response for a previous country can't overwrite the list for the new one.
//! In-flight requests are not cancelled, their results are just dropped.

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::{ControllerError, FormController};
use crate::forms::Registration;
use crate::remote::{Place, RemoteError, StateDirectory};

/// What the state control can currently offer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListState {
    /// No country selected
    #[default]
    Disabled,
    Loading,
    Ready(Vec<Place>),
    Failed(String),
}

impl ListState {
    pub fn places(&self) -> &[Place] {
        match self {
            ListState::Ready(places) => places,
            _ => &[],
        }
    }
}

/// A state list load for one country selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRequest {
    pub generation: u64,
    pub country: Place,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Choose a country before choosing a state")]
    NoCountry,

    #[error("States for {0} are still loading")]
    Loading(String),

    #[error("States for {country} could not be loaded: {reason}")]
    Unavailable { country: String, reason: String },

    #[error("'{state}' is not a state of {country}")]
    UnknownState { state: String, country: String },
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Controller(#[from] ControllerError),
}

/// Country selection plus the state list that depends on it
#[derive(Debug, Default)]
pub struct StatePicker {
    country: Option<Place>,
    generation: u64,
    states: ListState,
}

impl StatePicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(&self) -> Option<&Place> {
        self.country.as_ref()
    }

    pub fn states(&self) -> &ListState {
        &self.states
    }

    /// Whether the state control has anything to offer
    pub fn is_enabled(&self) -> bool {
        self.country.is_some()
    }

    /// Switch country: invalidate the current list and start a new load
    pub fn select_country(&mut self, country: Place) -> StateRequest {
        self.generation += 1;
        self.states = ListState::Loading;
        self.country = Some(country.clone());
        debug!(country = %country.code, generation = self.generation, "state list invalidated");
        StateRequest {
            generation: self.generation,
            country,
        }
    }

    pub fn clear_country(&mut self) {
        self.generation += 1;
        self.country = None;
        self.states = ListState::Disabled;
    }

    /// Apply a finished load. Returns false if the request was superseded.
    pub fn apply(&mut self, request: &StateRequest, result: Result<Vec<Place>, RemoteError>) -> bool {
        if request.generation != self.generation {
            debug!(
                country = %request.country.code,
                generation = request.generation,
                current = self.generation,
                "discarding stale state list"
            );
            return false;
        }

        self.states = match result {
            Ok(places) => ListState::Ready(places),
            Err(e) => {
                warn!(country = %request.country.code, error = %e, "state list failed");
                ListState::Failed(e.to_string())
            }
        };
        true
    }

    /// Select country and load its states in one step
    pub async fn load(&mut self, directory: &StateDirectory, country: Place) -> &ListState {
        let request = self.select_country(country);
        let result = directory.states(&request.country.code).await;
        self.apply(&request, result);
        &self.states
    }

    /// Resolve a state by name or code from the current list
    pub fn select_state(&self, query: &str) -> Result<&Place, SelectionError> {
        let country = self.country.as_ref().ok_or(SelectionError::NoCountry)?;

        match &self.states {
            ListState::Disabled => Err(SelectionError::NoCountry),
            ListState::Loading => Err(SelectionError::Loading(country.name.clone())),
            ListState::Failed(reason) => Err(SelectionError::Unavailable {
                country: country.name.clone(),
                reason: reason.clone(),
            }),
            ListState::Ready(places) => places.iter().find(|p| p.matches(query)).ok_or_else(|| {
                SelectionError::UnknownState {
                    state: query.to_string(),
                    country: country.name.clone(),
                }
            }),
        }
    }
}

/// Put a country into a registration and clear its now-meaningless state
pub fn choose_country(
    controller: &mut FormController<Registration>,
    picker: &mut StatePicker,
    country: Place,
) -> Result<StateRequest, ControllerError> {
    controller.set_str("country", &country.name)?;
    controller.set_str("state", "")?;
    Ok(picker.select_country(country))
}

/// Put a state into a registration, only if the picker offers it
pub fn choose_state(
    controller: &mut FormController<Registration>,
    picker: &StatePicker,
    query: &str,
) -> Result<Place, LocationError> {
    let place = picker.select_state(query)?.clone();
    controller.set_str("state", &place.name)?;
    Ok(place)
}
