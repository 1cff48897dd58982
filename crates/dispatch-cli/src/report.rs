//! Plan reports for the terminal, JSON and CSV.

use anyhow::Result;
use chrono::{DateTime, Utc};
use dispatch_core::{
    DeliveryReport, DeliveryStatus, DispatchPlan, DroneConfig, OrderId, Rejection,
    SimulationResult, Strategy, StrategyComparison,
};
use serde::Serialize;
use std::fmt;
use std::io::Write;

#[derive(Debug, Clone, Serialize)]
pub struct TripSummary {
    pub index: usize,
    pub order_ids: Vec<OrderId>,
    pub zones: Vec<usize>,
    pub total_weight: f64,
    pub simulation: SimulationResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnplacedSummary {
    pub order_id: OrderId,
    pub zone: usize,
    pub weight: f64,
    pub reason: Rejection,
}

/// Everything one planning run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub strategy: Strategy,
    pub generated_at: DateTime<Utc>,
    pub drone: DroneConfig,
    pub trips: Vec<TripSummary>,
    pub unplaced: Vec<UnplacedSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliveries: Option<Vec<DeliveryReport>>,
}

impl PlanReport {
    pub fn new(
        drone: &DroneConfig,
        plan: &DispatchPlan,
        deliveries: Option<Vec<DeliveryReport>>,
    ) -> Self {
        let trips = plan
            .trips
            .iter()
            .enumerate()
            .map(|(index, trip)| TripSummary {
                index,
                order_ids: trip.order_ids(),
                zones: trip.orders.iter().map(|order| order.zone).collect(),
                total_weight: trip.total_weight,
                simulation: trip.simulation,
            })
            .collect();
        let unplaced = plan
            .unplaced
            .iter()
            .map(|entry| UnplacedSummary {
                order_id: entry.order.id,
                zone: entry.order.zone,
                weight: entry.order.weight,
                reason: entry.reason,
            })
            .collect();

        Self {
            strategy: plan.strategy,
            generated_at: Utc::now(),
            drone: drone.clone(),
            trips,
            unplaced,
            deliveries,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PlanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} plan: {} trips, {} unplaced",
            self.strategy.label(),
            self.trips.len(),
            self.unplaced.len()
        )?;
        for trip in &self.trips {
            writeln!(
                f,
                "  Trip {}: orders {:?} zones {:?} weight {} battery used {:.4} ({:.1} km)",
                trip.index,
                trip.order_ids,
                trip.zones,
                trip.total_weight,
                trip.simulation.energy_used,
                trip.simulation.total_distance
            )?;
        }
        for entry in &self.unplaced {
            writeln!(
                f,
                "  Unplaced order {} (zone {}, {}g): {}",
                entry.order_id, entry.zone, entry.weight, entry.reason
            )?;
        }
        for delivery in self.deliveries.iter().flatten() {
            write!(f, "  Delivery {}: ", delivery.trip_index)?;
            match delivery.status {
                DeliveryStatus::Delivered { final_battery } => {
                    writeln!(f, "complete, {:.4} battery left", final_battery)?
                }
                DeliveryStatus::BatteryDepleted { delivered } => {
                    writeln!(f, "battery died after {} deliveries", delivered)?
                }
                DeliveryStatus::Skipped => writeln!(f, "skipped")?,
            }
        }
        Ok(())
    }
}

/// Write one CSV row per dataset and strategy, dataset name first.
pub fn write_comparison_csv<W: Write>(
    output: W,
    comparisons: &[StrategyComparison],
) -> Result<()> {
    let mut out = csv::Writer::from_writer(output);
    for row in comparisons.iter().flat_map(|comparison| &comparison.rows) {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}
