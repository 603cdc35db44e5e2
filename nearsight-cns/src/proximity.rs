//! Distance to alert-state classification

use nearsight_core::{AlertState, Error, ProximityEvent, ProximityReading, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Shortens the repeat interval for readings closer than `below_meters`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalTier {
    pub below_meters: f32,
    pub multiplier: f32,
}

impl IntervalTier {
    pub fn new(below_meters: f32, multiplier: f32) -> Self {
        Self { below_meters, multiplier }
    }
}

/// Proximity alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Readings at or below this distance raise the alert (meters)
    pub threshold_meters: f32,

    /// Seconds of repeat interval per meter of distance
    pub interval_factor: f32,

    /// Multipliers applied close in, ascending by `below_meters`; the first match wins
    pub tiers: Vec<IntervalTier>,

    /// Extra distance past the threshold required to clear a raised alert (meters)
    pub deadband_meters: f32,

    /// Spoken once each time the alert is raised
    pub warning_text: String,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            threshold_meters: 1.0,
            interval_factor: 3.0,
            tiers: vec![IntervalTier::new(0.25, 0.2), IntervalTier::new(0.5, 0.5)],
            deadband_meters: 0.0,
            warning_text: "Object ahead".to_string(),
        }
    }
}

impl ProximityConfig {
    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.threshold_meters.is_finite() || self.threshold_meters <= 0.0 {
            return Err("Threshold must be a positive distance".to_string());
        }

        if !self.interval_factor.is_finite() || self.interval_factor <= 0.0 {
            return Err("Interval factor must be positive".to_string());
        }

        if !self.deadband_meters.is_finite() || self.deadband_meters < 0.0 {
            return Err("Deadband must be a non-negative distance".to_string());
        }

        for tier in &self.tiers {
            if !tier.below_meters.is_finite() || tier.below_meters <= 0.0 {
                return Err("Tier breakpoints must be positive distances".to_string());
            }
            if !tier.multiplier.is_finite() || tier.multiplier <= 0.0 {
                return Err("Tier multipliers must be positive".to_string());
            }
        }

        if self
            .tiers
            .windows(2)
            .any(|pair| pair[0].below_meters >= pair[1].below_meters)
        {
            return Err("Tiers must be sorted by strictly ascending breakpoint".to_string());
        }

        if self.warning_text.trim().is_empty() {
            return Err("Warning text cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Outcome of feeding one reading to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityUpdate {
    pub state: AlertState,
    pub events: Vec<ProximityEvent>,
    /// Repeat interval for the cue. `Some` only when a valid reading leaves the alert raised.
    pub interval_seconds: Option<f32>,
}

impl ProximityUpdate {
    fn unchanged(state: AlertState) -> Self {
        Self {
            state,
            events: Vec::new(),
            interval_seconds: None,
        }
    }
}

/// Reject NaN, infinite and negative distances.
pub fn check_distance(distance: f32) -> Result<f32> {
    if !distance.is_finite() {
        return Err(Error::SensorRead(format!("non-finite distance {}", distance)));
    }
    if distance < 0.0 {
        return Err(Error::SensorRead(format!("negative distance {}", distance)));
    }
    Ok(distance)
}

/// Classifies sampled distances and emits edge-triggered transitions.
///
/// Readings at or below the threshold raise the alert (`Imminent`); readings
/// past `threshold + deadband` clear it. Every transition into `Imminent`
/// emits `EnteredApproaching` exactly once, every transition out emits
/// `ExitedImminent`. Malformed readings leave the state untouched.
#[derive(Debug, Clone)]
pub struct ProximityStateMachine {
    config: ProximityConfig,
    state: AlertState,
    last_ordinal: Option<u64>,
}

impl ProximityStateMachine {
    pub fn new(config: ProximityConfig) -> Result<Self> {
        config.validate().map_err(Error::Configuration)?;
        Ok(Self {
            config,
            state: AlertState::Clear,
            last_ordinal: None,
        })
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Repeat interval for a distance: `distance * factor`, scaled by the first matching tier.
    pub fn interval_for(&self, distance: f32) -> f32 {
        let base = distance * self.config.interval_factor;
        self.config
            .tiers
            .iter()
            .find(|tier| distance < tier.below_meters)
            .map_or(base, |tier| base * tier.multiplier)
    }

    /// Feed a reading tagged with its arrival ordinal.
    ///
    /// Readings whose ordinal does not advance past the last accepted one are
    /// dropped without effect.
    pub fn observe(&mut self, reading: ProximityReading) -> ProximityUpdate {
        if let Some(last) = self.last_ordinal {
            if reading.timestamp_ordinal <= last {
                debug!(
                    ordinal = reading.timestamp_ordinal,
                    last, "dropping out-of-order reading"
                );
                return ProximityUpdate::unchanged(self.state);
            }
        }

        self.last_ordinal = Some(reading.timestamp_ordinal);
        self.update(reading.distance_meters)
    }

    /// Feed one distance in meters.
    pub fn update(&mut self, distance: f32) -> ProximityUpdate {
        let distance = match check_distance(distance) {
            Ok(d) => d,
            Err(e) => {
                warn!(state = %self.state, "{}", e);
                return ProximityUpdate::unchanged(self.state);
            }
        };

        let threshold = self.config.threshold_meters;
        let mut events = Vec::new();

        let next = if distance <= threshold {
            AlertState::Imminent
        } else if self.state == AlertState::Imminent
            && distance <= threshold + self.config.deadband_meters
        {
            // inside the deadband: hold the alert
            AlertState::Imminent
        } else {
            AlertState::Clear
        };

        match (self.state, next) {
            (AlertState::Imminent, AlertState::Imminent) => {}
            (_, AlertState::Imminent) => events.push(ProximityEvent::EnteredApproaching),
            (AlertState::Imminent, _) => events.push(ProximityEvent::ExitedImminent),
            _ => {}
        }

        if !events.is_empty() {
            debug!(from = %self.state, to = %next, distance, "proximity transition");
        }
        self.state = next;

        let interval_seconds = (next == AlertState::Imminent).then(|| self.interval_for(distance));

        ProximityUpdate {
            state: next,
            events,
            interval_seconds,
        }
    }
}
