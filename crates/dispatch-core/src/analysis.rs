//! Plan metrics and strategy comparison.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::DroneConfig;
use crate::drone::Drone;
use crate::error::Result;
use crate::models::{DispatchPlan, Order, Strategy, Trip};
use crate::planner::TripPlanner;
use crate::synthetic::SyntheticBacklog;

/// Summary statistics for one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMetrics {
    /// Name of the backlog the plan was built from
    pub dataset: String,
    pub strategy: Strategy,
    pub total_trips: usize,
    /// Kilometers flown, including each return leg to the home zone
    pub total_distance_km: f64,
    pub avg_orders_per_trip: f64,
    pub min_orders_per_trip: usize,
    pub max_orders_per_trip: usize,
    pub avg_battery_used_pct: f64,
    /// Trips carrying fragile and hazardous cargo together
    pub handling_violations: usize,
    pub unplaced_orders: usize,
    pub runtime_ms: f64,
}

impl PlanMetrics {
    pub fn from_plan(
        dataset: &str,
        drone: &Drone<'_>,
        plan: &DispatchPlan,
        runtime: Duration,
    ) -> Result<Self> {
        let total_trips = plan.trips.len();
        let counts: Vec<usize> = plan.trips.iter().map(Trip::len).collect();

        let mut total_distance_km = 0.0;
        for trip in &plan.trips {
            total_distance_km += round_trip_distance(drone, trip)?;
        }

        let (avg_orders_per_trip, avg_battery_used_pct) = if total_trips == 0 {
            (0.0, 0.0)
        } else {
            let battery_used: f64 = plan
                .trips
                .iter()
                .map(|trip| trip.estimated_battery_use() / drone.battery_capacity())
                .sum();
            (
                counts.iter().sum::<usize>() as f64 / total_trips as f64,
                battery_used / total_trips as f64 * 100.0,
            )
        };

        Ok(Self {
            dataset: dataset.to_string(),
            strategy: plan.strategy,
            total_trips,
            total_distance_km,
            avg_orders_per_trip,
            min_orders_per_trip: counts.iter().copied().min().unwrap_or(0),
            max_orders_per_trip: counts.iter().copied().max().unwrap_or(0),
            avg_battery_used_pct,
            handling_violations: plan.trips.iter().filter(|t| t.violates_handling()).count(),
            unplaced_orders: plan.unplaced.len(),
            runtime_ms: runtime.as_secs_f64() * 1000.0,
        })
    }
}

/// Distance flown from home through every stop and back home.
fn round_trip_distance(drone: &Drone<'_>, trip: &Trip) -> Result<f64> {
    let zones = drone.zones();
    let home = drone.home_zone();
    let mut position = home;
    let mut distance = 0.0;
    for order in &trip.orders {
        distance += zones.distance(position, order.zone)?;
        position = order.zone;
    }
    distance += zones.distance(position, home)?;
    Ok(distance)
}

/// Metrics for every strategy on the same backlog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub dataset: String,
    pub rows: Vec<PlanMetrics>,
}

impl StrategyComparison {
    pub fn get(&self, strategy: Strategy) -> Option<&PlanMetrics> {
        self.rows.iter().find(|row| row.strategy == strategy)
    }
}

/// Plan `backlog` with each strategy and collect metrics under `dataset`.
pub fn compare(
    drone: &Drone<'_>,
    dataset: &str,
    backlog: &[Order],
) -> Result<StrategyComparison> {
    let planner = TripPlanner::new(drone);
    let mut rows = Vec::with_capacity(Strategy::ALL.len());

    for strategy in Strategy::ALL {
        let started = Instant::now();
        let plan = planner.plan(strategy, backlog)?;
        let metrics = PlanMetrics::from_plan(dataset, drone, &plan, started.elapsed())?;
        tracing::info!(
            dataset,
            strategy = strategy.label(),
            trips = metrics.total_trips,
            distance_km = metrics.total_distance_km,
            runtime_ms = metrics.runtime_ms,
            violations = metrics.handling_violations,
            "Strategy compared"
        );
        rows.push(metrics);
    }

    Ok(StrategyComparison {
        dataset: dataset.to_string(),
        rows,
    })
}

/// Generate each synthetic dataset and compare strategies on it.
///
/// Every dataset gets its own distance table, so the drone is rebuilt per
/// dataset from the same `config`.
pub fn sweep(
    config: &DroneConfig,
    datasets: &[SyntheticBacklog],
) -> Result<Vec<StrategyComparison>> {
    let mut comparisons = Vec::with_capacity(datasets.len());
    for params in datasets {
        let (table, backlog) = params.generate()?;
        let drone = Drone::new(config.clone(), &table)?;
        comparisons.push(compare(&drone, &params.label(), &backlog)?);
    }
    Ok(comparisons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DroneConfig;
    use crate::zones::ZoneDistanceTable;

    #[test]
    fn test_metrics_count_return_leg() {
        let table = ZoneDistanceTable::new(2, vec![vec![0.0, 5.0], vec![5.0, 0.0]]).unwrap();
        let config = DroneConfig {
            battery_capacity: 100.0,
            payload_capacity: 10.0,
            empty_overhead: 1.0,
            drain_rate: 1.0,
            ..DroneConfig::default()
        };
        let drone = Drone::new(config, &table).unwrap();
        let backlog = vec![Order::new(1, 1, 1, 4.0), Order::new(2, 2, 1, 8.0)];
        let plan = TripPlanner::new(&drone)
            .plan_zone_batched(&backlog)
            .unwrap();

        let metrics = PlanMetrics::from_plan("two-zone", &drone, &plan, Duration::ZERO).unwrap();
        assert_eq!(metrics.dataset, "two-zone");
        assert_eq!(metrics.total_trips, 2);
        assert_eq!(metrics.total_distance_km, 20.0);
        assert_eq!(metrics.avg_orders_per_trip, 1.0);
        assert_eq!(metrics.min_orders_per_trip, 1);
        assert_eq!(metrics.max_orders_per_trip, 1);
        // 5 * (4 + 1) and 5 * (8 + 1) out of 100.
        assert!((metrics.avg_battery_used_pct - 35.0).abs() < 1e-9);
        assert_eq!(metrics.handling_violations, 0);
    }

    #[test]
    fn test_empty_plan_metrics_are_zero() {
        let table = ZoneDistanceTable::new(1, vec![vec![0.0]]).unwrap();
        let drone = Drone::new(DroneConfig::default(), &table).unwrap();
        let plan = DispatchPlan::new(Strategy::PriorityBatched);

        let metrics = PlanMetrics::from_plan("empty", &drone, &plan, Duration::ZERO).unwrap();
        assert_eq!(metrics.total_trips, 0);
        assert_eq!(metrics.avg_orders_per_trip, 0.0);
        assert_eq!(metrics.min_orders_per_trip, 0);
    }

    #[test]
    fn test_compare_covers_every_strategy() {
        let table = ZoneDistanceTable::new(2, vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let drone = Drone::new(DroneConfig::default(), &table).unwrap();
        let backlog = vec![
            Order::new(1, 1, 1, 300.0),
            Order::new(2, 2, 0, 200.0).perishable(),
        ];

        let comparison = compare(&drone, "pair", &backlog).unwrap();
        assert_eq!(comparison.dataset, "pair");
        assert_eq!(comparison.rows.len(), 2);
        assert!(comparison.rows.iter().all(|row| row.dataset == "pair"));
        assert!(comparison.get(Strategy::ZoneBatched).is_some());
        assert!(comparison.get(Strategy::PriorityBatched).is_some());
    }

    #[test]
    fn test_sweep_labels_each_dataset() {
        let datasets: Vec<SyntheticBacklog> = [10, 25]
            .into_iter()
            .map(|orders| SyntheticBacklog {
                zones: 4,
                orders,
                ..SyntheticBacklog::default()
            })
            .collect();

        let comparisons = sweep(&DroneConfig::default(), &datasets).unwrap();
        assert_eq!(comparisons.len(), 2);
        assert_eq!(comparisons[0].dataset, "synthetic-10x4-s42");
        assert_eq!(comparisons[1].dataset, "synthetic-25x4-s42");
        for comparison in &comparisons {
            assert_eq!(comparison.rows.len(), Strategy::ALL.len());
            assert!(comparison
                .rows
                .iter()
                .all(|row| row.dataset == comparison.dataset));
        }
    }
}
