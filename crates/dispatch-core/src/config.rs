//! Drone capabilities and energy model.

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::models::ZoneId;

/// Configuration for a delivery drone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroneConfig {
    /// Energy available on a full charge
    pub battery_capacity: f64,
    /// Maximum total payload weight in grams
    pub payload_capacity: f64,
    /// Airframe weight added to the payload when computing drain
    pub empty_overhead: f64,
    /// Energy per kilometer per unit of (payload + overhead)
    pub drain_rate: f64,
    /// Zone every trip departs from
    pub home_zone: ZoneId,
    /// Charge the empty return leg back to `home_zone`
    pub return_to_home: bool,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            battery_capacity: 1.0,
            payload_capacity: 5_000.0,
            empty_overhead: 512.0,
            drain_rate: 1.0 / 36_739.0,
            home_zone: 0,
            return_to_home: false,
        }
    }
}

impl DroneConfig {
    /// Energy needed to fly `distance_km` carrying `load`.
    ///
    /// Strictly increasing in both distance and load, zero when the drone
    /// does not move.
    pub fn leg_energy(&self, distance_km: f64, load: f64) -> f64 {
        distance_km * (load + self.empty_overhead) * self.drain_rate
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("battery_capacity", self.battery_capacity, false),
            ("payload_capacity", self.payload_capacity, false),
            ("drain_rate", self.drain_rate, false),
            ("empty_overhead", self.empty_overhead, true),
        ];
        for (name, value, zero_ok) in checks {
            if !value.is_finite() {
                return Err(DispatchError::InvalidDrone(format!("{} is not finite", name)));
            }
            if value < 0.0 || (!zero_ok && value == 0.0) {
                return Err(DispatchError::InvalidDrone(format!(
                    "{} must be {}, got {}",
                    name,
                    if zero_ok { "non-negative" } else { "positive" },
                    value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leg_energy_is_zero_without_movement() {
        let config = DroneConfig::default();
        assert_eq!(config.leg_energy(0.0, 1_000.0), 0.0);
    }

    #[test]
    fn test_leg_energy_grows_with_distance_and_load() {
        let config = DroneConfig::default();
        let base = config.leg_energy(2.0, 100.0);
        assert!(config.leg_energy(3.0, 100.0) > base);
        assert!(config.leg_energy(2.0, 200.0) > base);
    }

    #[test]
    fn test_default_matches_reference_drain() {
        // 10 km with 10 g drains roughly 14% of a full charge.
        let config = DroneConfig::default();
        let used = config.leg_energy(10.0, 10.0);
        assert!((used - 0.1421).abs() < 0.001);
    }

    #[test]
    fn test_validate_rejects_zero_payload() {
        let config = DroneConfig {
            payload_capacity: 0.0,
            ..DroneConfig::default()
        };
        assert!(matches!(config.validate(), Err(DispatchError::InvalidDrone(_))));
    }

    #[test]
    fn test_validate_allows_zero_overhead() {
        let config = DroneConfig {
            empty_overhead: 0.0,
            ..DroneConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DroneConfig =
            serde_json::from_str(r#"{"battery_capacity": 100.0, "payload_capacity": 10.0}"#)
                .unwrap();
        assert_eq!(config.battery_capacity, 100.0);
        assert_eq!(config.home_zone, 0);
        assert_eq!(config.empty_overhead, 512.0);
    }
}
