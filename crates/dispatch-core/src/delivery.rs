//! Delivery simulation for packed trips.
//!
//! Trips are flown one after another by a single drone that is recharged
//! between flights. The first trip that runs the battery flat grounds the
//! drone; every later trip is reported as skipped.

use serde::{Deserialize, Serialize};

use crate::drone::Drone;
use crate::error::Result;
use crate::models::{DispatchPlan, OrderId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered { final_battery: f64 },
    /// Battery died after `delivered` orders were dropped off
    BatteryDepleted { delivered: usize },
    /// Not flown because an earlier trip failed
    Skipped,
}

/// Outcome of one trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub trip_index: usize,
    pub order_ids: Vec<OrderId>,
    pub status: DeliveryStatus,
}

impl DeliveryReport {
    pub fn is_delivered(&self) -> bool {
        matches!(self.status, DeliveryStatus::Delivered { .. })
    }
}

/// Fly every trip in `plan`, in order.
pub fn deliver(drone: &Drone<'_>, plan: &DispatchPlan) -> Result<Vec<DeliveryReport>> {
    let mut reports = Vec::with_capacity(plan.trips.len());
    let mut grounded = false;

    for (trip_index, trip) in plan.trips.iter().enumerate() {
        let order_ids = trip.order_ids();
        if grounded {
            reports.push(DeliveryReport {
                trip_index,
                order_ids,
                status: DeliveryStatus::Skipped,
            });
            continue;
        }

        tracing::info!(trip = trip_index, orders = trip.len(), "Headed out for delivery");
        for order in &trip.orders {
            tracing::debug!("Delivering {}", order);
        }

        // Fresh charge for every flight.
        let result = drone.simulate_from_home(&trip.orders)?;
        let status = if result.feasible {
            tracing::info!(
                trip = trip_index,
                final_battery = result.final_battery,
                "Trip complete"
            );
            DeliveryStatus::Delivered {
                final_battery: result.final_battery,
            }
        } else {
            tracing::warn!(
                trip = trip_index,
                delivered = result.legs_completed,
                "Drone battery died during trip"
            );
            grounded = true;
            DeliveryStatus::BatteryDepleted {
                delivered: result.legs_completed,
            }
        };

        reports.push(DeliveryReport {
            trip_index,
            order_ids,
            status,
        });
    }

    Ok(reports)
}
