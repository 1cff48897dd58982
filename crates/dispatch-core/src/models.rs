//! Core data models for the dispatch system.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::drone::SimulationResult;

pub type OrderId = u64;
pub type CustomerId = u64;
pub type ZoneId = usize;

/// A delivery order read from the backlog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Submission time; orders in a zone are handled oldest-first
    pub timestamp: u64,
    pub zone: ZoneId,
    /// Payload weight in grams
    pub weight: f64,
    #[serde(default)]
    pub customer_id: CustomerId,
    #[serde(default)]
    pub is_subscriber: bool,
    #[serde(default)]
    pub is_fragile: bool,
    #[serde(default)]
    pub is_hazardous: bool,
    #[serde(default)]
    pub is_perishable: bool,
}

impl Order {
    /// Create a plain order with no customer flags set.
    pub fn new(id: OrderId, timestamp: u64, zone: ZoneId, weight: f64) -> Self {
        Self {
            id,
            timestamp,
            zone,
            weight,
            customer_id: 0,
            is_subscriber: false,
            is_fragile: false,
            is_hazardous: false,
            is_perishable: false,
        }
    }

    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    pub fn subscriber(mut self) -> Self {
        self.is_subscriber = true;
        self
    }

    pub fn fragile(mut self) -> Self {
        self.is_fragile = true;
        self
    }

    pub fn hazardous(mut self) -> Self {
        self.is_hazardous = true;
        self
    }

    pub fn perishable(mut self) -> Self {
        self.is_perishable = true;
        self
    }

    /// Urgency rank, 0 is most urgent.
    ///
    /// Computed from the flags every time so it can never go stale.
    pub fn priority_score(&self) -> u8 {
        match (self.is_perishable, self.is_subscriber) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        }
    }

    /// True when this order may not share a trip with `other`.
    pub fn conflicts_with(&self, other: &Order) -> bool {
        (self.is_fragile && other.is_hazardous) || (self.is_hazardous && other.is_fragile)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order {} at {} to {} ({}g)",
            self.id, self.timestamp, self.zone, self.weight
        )
    }
}

/// A packed drone flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    /// Orders in visiting order
    pub orders: Vec<Order>,
    pub total_weight: f64,
    /// Simulation of `orders` from the drone's home zone
    pub simulation: SimulationResult,
}

impl Trip {
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn estimated_battery_use(&self) -> f64 {
        self.simulation.energy_used
    }

    pub fn order_ids(&self) -> Vec<OrderId> {
        self.orders.iter().map(|order| order.id).collect()
    }

    pub fn has_fragile(&self) -> bool {
        self.orders.iter().any(|order| order.is_fragile)
    }

    pub fn has_hazardous(&self) -> bool {
        self.orders.iter().any(|order| order.is_hazardous)
    }

    /// Fragile and hazardous cargo on the same flight.
    pub fn violates_handling(&self) -> bool {
        self.has_fragile() && self.has_hazardous()
    }
}

/// Why an order could not join a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Fragile and hazardous cargo would share the trip
    HandlingConflict,
    /// Total weight would exceed payload capacity
    ExceedsPayload,
    /// No insertion position keeps the battery non-negative
    ExceedsRange,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::HandlingConflict => "fragile/hazardous conflict",
            Rejection::ExceedsPayload => "exceeds payload capacity",
            Rejection::ExceedsRange => "exceeds battery range",
        };
        f.write_str(text)
    }
}

/// An order that no trip could take during a planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnplacedOrder {
    pub order: Order,
    pub reason: Rejection,
}

/// Packing strategy used by the planner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Oldest-first within a zone, then heaviest-first fill
    #[default]
    ZoneBatched,
    /// Priority score first, same-customer co-shipment
    PriorityBatched,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::ZoneBatched, Strategy::PriorityBatched];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::ZoneBatched => "zone-batched",
            Strategy::PriorityBatched => "priority-batched",
        }
    }
}

/// Output of one planning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchPlan {
    pub strategy: Strategy,
    pub trips: Vec<Trip>,
    pub unplaced: Vec<UnplacedOrder>,
}

impl DispatchPlan {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            trips: Vec::new(),
            unplaced: Vec::new(),
        }
    }

    pub fn placed_count(&self) -> usize {
        self.trips.iter().map(Trip::len).sum()
    }

    /// Index of the trip carrying `order_id`, if any.
    pub fn trip_index_of(&self, order_id: OrderId) -> Option<usize> {
        self.trips
            .iter()
            .position(|trip| trip.orders.iter().any(|order| order.id == order_id))
    }
}
