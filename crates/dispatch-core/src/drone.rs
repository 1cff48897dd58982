//! Battery simulation and insertion search for a single drone.
//!
//! Everything here is a pure function of the drone configuration, the
//! distance table and the order sequence passed in. Calling the same
//! operation twice with the same inputs gives the same answer.

use serde::{Deserialize, Serialize};

use crate::config::DroneConfig;
use crate::error::Result;
use crate::models::{Order, ZoneId};
use crate::zones::ZoneDistanceTable;

/// Outcome of flying an ordered list of orders on a full battery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Battery stayed non-negative on every leg
    pub feasible: bool,
    /// Charge left when the simulation ended (negative if it died)
    pub final_battery: f64,
    /// Kilometers flown, including the leg that drained the battery
    pub total_distance: f64,
    /// Energy spent, `battery_capacity - final_battery`
    pub energy_used: f64,
    /// Orders delivered before the simulation ended
    pub legs_completed: usize,
}

/// A delivery drone with fixed capacities flying over a zone table.
#[derive(Debug, Clone)]
pub struct Drone<'a> {
    config: DroneConfig,
    zones: &'a ZoneDistanceTable,
}

impl<'a> Drone<'a> {
    /// Create a drone, validating its configuration against the table.
    pub fn new(config: DroneConfig, zones: &'a ZoneDistanceTable) -> Result<Self> {
        config.validate()?;
        zones.check_zone(config.home_zone)?;
        Ok(Self { config, zones })
    }

    pub fn config(&self) -> &DroneConfig {
        &self.config
    }

    pub fn zones(&self) -> &ZoneDistanceTable {
        self.zones
    }

    pub fn battery_capacity(&self) -> f64 {
        self.config.battery_capacity
    }

    pub fn payload_capacity(&self) -> f64 {
        self.config.payload_capacity
    }

    pub fn home_zone(&self) -> ZoneId {
        self.config.home_zone
    }

    /// Fly `orders` in exactly the given sequence starting from `start_zone`.
    ///
    /// Each leg is charged for the cumulative payload including the order
    /// being delivered on that leg. The first leg that takes the battery
    /// below zero ends the simulation as infeasible; later orders are not
    /// considered.
    pub fn simulate_trip(&self, orders: &[Order], start_zone: ZoneId) -> Result<SimulationResult> {
        let capacity = self.config.battery_capacity;
        let mut battery = capacity;
        let mut position = start_zone;
        let mut load = 0.0;
        let mut total_distance = 0.0;

        for (delivered, order) in orders.iter().enumerate() {
            let leg = self.zones.distance(position, order.zone)?;
            battery -= self.config.leg_energy(leg, load + order.weight);
            total_distance += leg;

            if battery < 0.0 {
                return Ok(SimulationResult {
                    feasible: false,
                    final_battery: battery,
                    total_distance,
                    energy_used: capacity - battery,
                    legs_completed: delivered,
                });
            }

            load += order.weight;
            position = order.zone;
        }

        if self.config.return_to_home && !orders.is_empty() {
            let leg = self.zones.distance(position, self.config.home_zone)?;
            battery -= self.config.leg_energy(leg, 0.0);
            total_distance += leg;
        }

        Ok(SimulationResult {
            feasible: battery >= 0.0,
            final_battery: battery,
            total_distance,
            energy_used: capacity - battery,
            legs_completed: orders.len(),
        })
    }

    /// Simulate `orders` departing from the drone's home zone.
    pub fn simulate_from_home(&self, orders: &[Order]) -> Result<SimulationResult> {
        self.simulate_trip(orders, self.config.home_zone)
    }

    /// Cheapest feasible position to insert `new_order` into `current_trip`.
    ///
    /// Every position `0..=len` is simulated in full, so a call costs
    /// O(n²) leg evaluations. Trips hold a handful of orders; an incremental
    /// per-position battery estimate would be needed for much larger trips.
    /// Exact cost ties go to the lowest index.
    pub fn find_best_insertion_position(
        &self,
        current_trip: &[Order],
        new_order: &Order,
    ) -> Result<Option<usize>> {
        let mut candidate: Vec<Order> = Vec::with_capacity(current_trip.len() + 1);
        let mut best: Option<(usize, f64)> = None;

        for position in 0..=current_trip.len() {
            candidate.clear();
            candidate.extend_from_slice(&current_trip[..position]);
            candidate.push(new_order.clone());
            candidate.extend_from_slice(&current_trip[position..]);

            let result = self.simulate_from_home(&candidate)?;
            if !result.feasible {
                continue;
            }
            let replace = best
                .map(|(_, cost)| result.energy_used < cost)
                .unwrap_or(true);
            if replace {
                best = Some((position, result.energy_used));
            }
        }

        Ok(best.map(|(position, _)| position))
    }

    /// Total weight stays within payload capacity with `new_order` added.
    pub fn fits_payload(&self, current_trip: &[Order], new_order: &Order) -> bool {
        total_weight(current_trip) + new_order.weight <= self.config.payload_capacity
    }

    /// `new_order` fits by weight and has a battery-feasible position.
    pub fn can_accept(&self, current_trip: &[Order], new_order: &Order) -> Result<bool> {
        if !self.fits_payload(current_trip, new_order) {
            return Ok(false);
        }
        Ok(self
            .find_best_insertion_position(current_trip, new_order)?
            .is_some())
    }
}

pub fn total_weight(orders: &[Order]) -> f64 {
    orders.iter().map(|order| order.weight).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_table() -> ZoneDistanceTable {
        // Zones on a line, 1 km apart.
        let rows = (0..4)
            .map(|i: i32| (0..4).map(|j: i32| (i - j).abs() as f64).collect())
            .collect();
        ZoneDistanceTable::new(4, rows).unwrap()
    }

    fn unit_config(battery_capacity: f64) -> DroneConfig {
        DroneConfig {
            battery_capacity,
            payload_capacity: 10.0,
            empty_overhead: 1.0,
            drain_rate: 1.0,
            home_zone: 0,
            return_to_home: false,
        }
    }

    #[test]
    fn test_simulation_charges_cumulative_load() {
        let table = line_table();
        let drone = Drone::new(unit_config(100.0), &table).unwrap();
        let orders = vec![Order::new(1, 0, 1, 2.0), Order::new(2, 0, 3, 3.0)];

        let result = drone.simulate_trip(&orders, 0).unwrap();
        // Leg 0->1: 1 km * (2 + 1). Leg 1->3: 2 km * (5 + 1).
        assert!(result.feasible);
        assert_eq!(result.energy_used, 15.0);
        assert_eq!(result.final_battery, 85.0);
        assert_eq!(result.total_distance, 3.0);
        assert_eq!(result.legs_completed, 2);
    }

    #[test]
    fn test_simulation_stops_at_first_dead_leg() {
        let table = line_table();
        let drone = Drone::new(unit_config(4.0), &table).unwrap();
        let orders = vec![
            Order::new(1, 0, 1, 2.0),
            Order::new(2, 0, 3, 3.0),
            Order::new(3, 0, 0, 1.0),
        ];

        let result = drone.simulate_trip(&orders, 0).unwrap();
        assert!(!result.feasible);
        assert_eq!(result.legs_completed, 1);
        assert_eq!(result.total_distance, 3.0);
        assert!(result.final_battery < 0.0);
    }

    #[test]
    fn test_return_leg_flies_empty() {
        let table = line_table();
        let config = DroneConfig {
            return_to_home: true,
            ..unit_config(100.0)
        };
        let drone = Drone::new(config, &table).unwrap();
        let orders = vec![Order::new(1, 0, 2, 4.0)];

        let result = drone.simulate_trip(&orders, 0).unwrap();
        // Out: 2 km * (4 + 1). Back: 2 km * (0 + 1).
        assert_eq!(result.energy_used, 12.0);
        assert_eq!(result.total_distance, 4.0);
    }

    #[test]
    fn test_empty_trip_costs_nothing() {
        let table = line_table();
        let drone = Drone::new(unit_config(1.0), &table).unwrap();
        let result = drone.simulate_trip(&[], 0).unwrap();
        assert!(result.feasible);
        assert_eq!(result.energy_used, 0.0);
    }

    #[test]
    fn test_simulation_rejects_unknown_zone() {
        let table = line_table();
        let drone = Drone::new(unit_config(100.0), &table).unwrap();
        assert!(drone
            .simulate_trip(&[Order::new(1, 0, 9, 1.0)], 0)
            .is_err());
    }

    #[test]
    fn test_best_insertion_prefers_cheapest_position() {
        let table = line_table();
        let drone = Drone::new(unit_config(100.0), &table).unwrap();
        let trip = vec![Order::new(1, 0, 1, 1.0), Order::new(2, 0, 3, 1.0)];
        let new_order = Order::new(3, 0, 2, 1.0);

        // Visiting zone 2 between zones 1 and 3 avoids backtracking.
        let position = drone.find_best_insertion_position(&trip, &new_order).unwrap();
        assert_eq!(position, Some(1));
    }

    #[test]
    fn test_best_insertion_breaks_ties_on_lowest_index() {
        let table = line_table();
        let drone = Drone::new(unit_config(100.0), &table).unwrap();
        let trip = vec![Order::new(1, 0, 0, 1.0)];
        let new_order = Order::new(2, 0, 0, 1.0);

        // Both positions cost zero energy.
        let position = drone.find_best_insertion_position(&trip, &new_order).unwrap();
        assert_eq!(position, Some(0));
    }

    #[test]
    fn test_best_insertion_is_idempotent() {
        let table = line_table();
        let drone = Drone::new(unit_config(100.0), &table).unwrap();
        let trip = vec![Order::new(1, 0, 3, 2.0), Order::new(2, 0, 1, 1.0)];
        let new_order = Order::new(3, 0, 2, 2.0);

        let first = drone.find_best_insertion_position(&trip, &new_order).unwrap();
        let second = drone.find_best_insertion_position(&trip, &new_order).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_insertion_when_battery_too_small() {
        let table = line_table();
        let drone = Drone::new(unit_config(1.0), &table).unwrap();
        let new_order = Order::new(1, 0, 3, 5.0);

        assert_eq!(
            drone.find_best_insertion_position(&[], &new_order).unwrap(),
            None
        );
        assert!(!drone.can_accept(&[], &new_order).unwrap());
    }

    #[test]
    fn test_can_accept_checks_payload_first() {
        let table = line_table();
        let drone = Drone::new(unit_config(1_000.0), &table).unwrap();
        let trip = vec![Order::new(1, 0, 1, 4.0)];

        assert!(drone.can_accept(&trip, &Order::new(2, 0, 1, 6.0)).unwrap());
        assert!(!drone.can_accept(&trip, &Order::new(3, 0, 1, 8.0)).unwrap());
    }

    #[test]
    fn test_home_zone_must_exist() {
        let table = line_table();
        let config = DroneConfig {
            home_zone: 7,
            ..unit_config(1.0)
        };
        assert!(Drone::new(config, &table).is_err());
    }
}
