//! Trip packing.
//!
//! Two strategies share the same feasibility primitives from [`Drone`]:
//!
//! - **Zone-batched**: one zone at a time, oldest orders first.
//! - **Priority-batched**: most urgent orders first, preferring orders from
//!   customers already on the trip.
//!
//! Both close a trip as soon as the next candidate is rejected and then top
//! it up with the heaviest remaining orders that still fit.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use crate::drone::{total_weight, Drone};
use crate::error::{DispatchError, Result};
use crate::models::{
    CustomerId, DispatchPlan, Order, OrderId, Rejection, Strategy, Trip, UnplacedOrder, ZoneId,
};

/// Result of testing one order against the open trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fit {
    At(usize),
    Rejected(Rejection),
}

/// A trip still being packed.
#[derive(Debug, Default)]
struct OpenTrip {
    orders: Vec<Order>,
    customers: BTreeSet<CustomerId>,
}

impl OpenTrip {
    fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn admits_handling(&self, order: &Order) -> bool {
        !self.orders.iter().any(|existing| existing.conflicts_with(order))
    }

    fn insert(&mut self, position: usize, order: Order) {
        self.customers.insert(order.customer_id);
        self.orders.insert(position, order);
    }

    fn close(self, drone: &Drone<'_>) -> Result<Trip> {
        let simulation = drone.simulate_from_home(&self.orders)?;
        Ok(Trip {
            total_weight: total_weight(&self.orders),
            orders: self.orders,
            simulation,
        })
    }
}

/// Packs a backlog of orders into drone trips.
pub struct TripPlanner<'d, 'z> {
    drone: &'d Drone<'z>,
}

impl<'d, 'z> TripPlanner<'d, 'z> {
    pub fn new(drone: &'d Drone<'z>) -> Self {
        Self { drone }
    }

    pub fn drone(&self) -> &Drone<'z> {
        self.drone
    }

    /// Plan `backlog` with the given strategy.
    pub fn plan(&self, strategy: Strategy, backlog: &[Order]) -> Result<DispatchPlan> {
        match strategy {
            Strategy::ZoneBatched => self.plan_zone_batched(backlog),
            Strategy::PriorityBatched => self.plan_priority_batched(backlog),
        }
    }

    /// Check every order against the distance table before planning.
    pub fn validate_backlog(&self, backlog: &[Order]) -> Result<()> {
        let mut seen = HashSet::with_capacity(backlog.len());
        for order in backlog {
            self.drone.zones().check_zone(order.zone)?;
            if !order.weight.is_finite() || order.weight <= 0.0 {
                return Err(DispatchError::InvalidOrder {
                    id: order.id,
                    reason: format!("weight must be positive, got {}", order.weight),
                });
            }
            if !seen.insert(order.id) {
                return Err(DispatchError::DuplicateOrderId(order.id));
            }
        }
        Ok(())
    }

    /// Zone-by-zone packing, oldest orders first.
    pub fn plan_zone_batched(&self, backlog: &[Order]) -> Result<DispatchPlan> {
        self.validate_backlog(backlog)?;
        tracing::info!(orders = backlog.len(), "Planning zone-batched trips");

        let mut remaining = backlog.to_vec();
        remaining.sort_by(by_age);
        let mut plan = DispatchPlan::new(Strategy::ZoneBatched);
        let mut carry_zone: Option<ZoneId> = None;

        while let Some(oldest) = remaining.first() {
            let zone = carry_zone
                .take()
                .filter(|zone| remaining.iter().any(|order| order.zone == *zone))
                .unwrap_or(oldest.zone);

            let zone_orders: Vec<Order> = remaining
                .iter()
                .filter(|order| order.zone == zone)
                .cloned()
                .collect();

            let mut trip = OpenTrip::default();
            for order in zone_orders {
                match self.assess(&trip, &order)? {
                    Fit::At(position) => {
                        take(&mut remaining, order.id);
                        trip.insert(position, order);
                    }
                    Fit::Rejected(reason) if trip.is_empty() => {
                        take(&mut remaining, order.id);
                        mark_unplaced(&mut plan, order, reason);
                    }
                    Fit::Rejected(_) => {
                        // This order seeds the next trip.
                        carry_zone = Some(zone);
                        break;
                    }
                }
            }

            if trip.is_empty() {
                continue;
            }
            self.fill_by_weight(&mut trip, &mut remaining)?;
            self.close_trip(&mut plan, trip)?;
        }

        Ok(plan)
    }

    /// Priority-first packing with same-customer co-shipment.
    pub fn plan_priority_batched(&self, backlog: &[Order]) -> Result<DispatchPlan> {
        self.validate_backlog(backlog)?;
        tracing::info!(orders = backlog.len(), "Planning priority-batched trips");

        let mut remaining = backlog.to_vec();
        remaining.sort_by(by_priority);
        let mut plan = DispatchPlan::new(Strategy::PriorityBatched);

        while !remaining.is_empty() {
            let mut trip = OpenTrip::default();

            loop {
                if let Some((index, position)) = self.same_customer_candidate(&trip, &remaining)? {
                    let order = remaining.remove(index);
                    trip.insert(position, order);
                    continue;
                }

                let Some(head) = remaining.first() else {
                    break;
                };
                match self.assess(&trip, head)? {
                    Fit::At(position) => {
                        let order = remaining.remove(0);
                        trip.insert(position, order);
                    }
                    Fit::Rejected(reason) if trip.is_empty() => {
                        let order = remaining.remove(0);
                        mark_unplaced(&mut plan, order, reason);
                    }
                    Fit::Rejected(_) => break,
                }
            }

            if trip.is_empty() {
                continue;
            }
            self.fill_by_weight(&mut trip, &mut remaining)?;
            self.close_trip(&mut plan, trip)?;
        }

        Ok(plan)
    }

    /// Test `order` against the open trip.
    ///
    /// The fragile/hazardous rule is checked before weight and battery.
    fn assess(&self, trip: &OpenTrip, order: &Order) -> Result<Fit> {
        if !trip.admits_handling(order) {
            return Ok(Fit::Rejected(Rejection::HandlingConflict));
        }
        if !self.drone.fits_payload(&trip.orders, order) {
            return Ok(Fit::Rejected(Rejection::ExceedsPayload));
        }
        Ok(match self.drone.find_best_insertion_position(&trip.orders, order)? {
            Some(position) => Fit::At(position),
            None => Fit::Rejected(Rejection::ExceedsRange),
        })
    }

    /// Highest-priority remaining order from a customer already on the trip
    /// that the trip can still take.
    fn same_customer_candidate(
        &self,
        trip: &OpenTrip,
        remaining: &[Order],
    ) -> Result<Option<(usize, usize)>> {
        if trip.is_empty() {
            return Ok(None);
        }
        for (index, order) in remaining.iter().enumerate() {
            if !trip.customers.contains(&order.customer_id) {
                continue;
            }
            if let Fit::At(position) = self.assess(trip, order)? {
                return Ok(Some((index, position)));
            }
        }
        Ok(None)
    }

    /// Top up a trip with the heaviest remaining orders.
    ///
    /// Stops at the first candidate that is too heavy, whatever else is
    /// wrong with it; lighter candidates rejected for handling or range are
    /// skipped.
    fn fill_by_weight(&self, trip: &mut OpenTrip, remaining: &mut Vec<Order>) -> Result<()> {
        if total_weight(&trip.orders) >= self.drone.payload_capacity() {
            return Ok(());
        }

        let mut candidates = remaining.clone();
        candidates.sort_by(by_weight_desc);

        for order in candidates {
            if !self.drone.fits_payload(&trip.orders, &order) {
                break;
            }
            if let Fit::At(position) = self.assess(trip, &order)? {
                take(remaining, order.id);
                trip.insert(position, order);
            }
        }
        Ok(())
    }

    fn close_trip(&self, plan: &mut DispatchPlan, trip: OpenTrip) -> Result<()> {
        let trip = trip.close(self.drone)?;
        tracing::debug!(
            trip = plan.trips.len(),
            orders = trip.len(),
            weight = trip.total_weight,
            battery_use = trip.estimated_battery_use(),
            "Closed trip"
        );
        plan.trips.push(trip);
        Ok(())
    }
}

fn mark_unplaced(plan: &mut DispatchPlan, order: Order, reason: Rejection) {
    tracing::warn!("Cannot place {}: {}", order, reason);
    plan.unplaced.push(UnplacedOrder { order, reason });
}

/// Remove the order with `id` from `orders`, keeping the rest in order.
fn take(orders: &mut Vec<Order>, id: OrderId) {
    if let Some(index) = orders.iter().position(|order| order.id == id) {
        orders.remove(index);
    }
}

fn by_age(a: &Order, b: &Order) -> Ordering {
    a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id))
}

fn by_priority(a: &Order, b: &Order) -> Ordering {
    a.priority_score()
        .cmp(&b.priority_score())
        .then_with(|| by_age(a, b))
}

fn by_weight_desc(a: &Order, b: &Order) -> Ordering {
    b.weight.total_cmp(&a.weight).then_with(|| by_age(a, b))
}
