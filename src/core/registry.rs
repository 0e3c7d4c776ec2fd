//! Registry owning every sensor.
//!
//! Sensors are kept in insertion order, which is the order used for listing
//! and bulk processing. A side index maps ids to positions for constant-time
//! lookup. Sensors are never removed; they live until the registry drops.

use crate::core::sensor::{ProcessSummary, Sensor, SensorDescription, SensorId, SensorKind};
use crate::error::SensorError;
use std::collections::HashMap;

/// Anything the registry can own: it only needs a stable id.
pub trait Registered {
    fn id(&self) -> &SensorId;
}

impl Registered for Sensor {
    fn id(&self) -> &SensorId {
        Sensor::id(self)
    }
}

/// Owning, insertion-ordered collection of sensors with unique ids.
#[derive(Debug)]
pub struct SensorRegistry<S: Registered = Sensor> {
    sensors: Vec<S>,
    index: HashMap<SensorId, usize>,
}

impl<S: Registered> SensorRegistry<S> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sensors: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Take ownership of a sensor.
    ///
    /// Fails with [`SensorError::DuplicateId`] if the id is taken; the
    /// rejected sensor is dropped and the registry is unchanged.
    pub fn insert(&mut self, sensor: S) -> Result<&mut S, SensorError> {
        let id = sensor.id().clone();
        if self.index.contains_key(&id) {
            return Err(SensorError::DuplicateId(id.to_string()));
        }

        let position = self.sensors.len();
        self.sensors.push(sensor);
        self.index.insert(id, position);
        Ok(&mut self.sensors[position])
    }

    /// Look a sensor up by id.
    pub fn find_by_name(&self, id: &str) -> Option<&S> {
        self.index.get(id).map(|&i| &self.sensors[i])
    }

    /// Look a sensor up by id for mutation.
    pub fn find_by_name_mut(&mut self, id: &str) -> Option<&mut S> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.sensors[i]),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Iterate over sensors in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.sensors.iter()
    }
}

impl SensorRegistry<Sensor> {
    /// Return the sensor with this id, creating one of `kind` if absent.
    ///
    /// The id is truncated like [`SensorId::new`]. An existing sensor of a
    /// different kind is never converted: the call fails with
    /// [`SensorError::KindMismatch`] and the sensor is left untouched.
    pub fn find_or_create(
        &mut self,
        kind: SensorKind,
        id: &str,
    ) -> Result<&mut Sensor, SensorError> {
        let id = SensorId::new(id);

        if let Some(&i) = self.index.get(&id) {
            let existing = self.sensors[i].kind();
            if existing != kind {
                return Err(SensorError::kind_mismatch(id.as_str(), existing, kind));
            }
            return Ok(&mut self.sensors[i]);
        }

        tracing::info!(sensor = %id, %kind, "sensor not registered, creating");
        self.insert(Sensor::new(kind, id))
    }

    /// Process every sensor in insertion order.
    pub fn process_all(&mut self) -> Vec<ProcessSummary> {
        tracing::debug!(sensors = self.sensors.len(), "processing all sensors");
        self.sensors.iter_mut().map(Sensor::process).collect()
    }

    /// Describe every sensor in insertion order.
    pub fn list_all(&self) -> Vec<SensorDescription> {
        self.sensors.iter().map(Sensor::describe).collect()
    }
}

impl<S: Registered> Default for SensorRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Registered> Drop for SensorRegistry<S> {
    fn drop(&mut self) {
        for sensor in &self.sensors {
            tracing::debug!(sensor = %sensor.id(), "releasing sensor");
        }
    }
}

impl<'a, S: Registered> IntoIterator for &'a SensorRegistry<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
