//! Seeded synthetic backlogs for benchmarks and property tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Order;
use crate::zones::ZoneDistanceTable;

/// Parameters for a generated dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticBacklog {
    pub zones: usize,
    pub orders: usize,
    pub seed: u64,
    pub max_distance_km: f64,
    pub max_weight: f64,
    pub customers: u64,
}

impl Default for SyntheticBacklog {
    fn default() -> Self {
        Self {
            zones: 12,
            orders: 100,
            seed: 42,
            max_distance_km: 12.0,
            max_weight: 2_000.0,
            customers: 40,
        }
    }
}

impl SyntheticBacklog {
    /// Dataset name used in comparison output, e.g. `synthetic-100x12-s42`.
    pub fn label(&self) -> String {
        format!("synthetic-{}x{}-s{}", self.orders, self.zones, self.seed)
    }

    /// Generate a distance table and backlog. The same parameters always
    /// produce the same output.
    pub fn generate(&self) -> Result<(ZoneDistanceTable, Vec<Order>)> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let zones = self.zones.max(1);

        let rows: Vec<Vec<f64>> = (0..zones)
            .map(|origin| {
                (0..zones)
                    .map(|destination| {
                        if origin == destination {
                            0.0
                        } else {
                            rng.random_range(1.0..=self.max_distance_km.max(1.0)).round()
                        }
                    })
                    .collect()
            })
            .collect();
        let table = ZoneDistanceTable::new(zones, rows)?;

        let mut timestamp = 0;
        let orders = (0..self.orders as u64)
            .map(|id| {
                timestamp += rng.random_range(1..=30);
                Order {
                    id,
                    timestamp,
                    zone: rng.random_range(0..zones),
                    weight: rng.random_range(1.0..=self.max_weight.max(1.0)).round(),
                    customer_id: rng.random_range(0..self.customers.max(1)),
                    is_subscriber: rng.random_bool(0.3),
                    is_fragile: rng.random_bool(0.15),
                    is_hazardous: rng.random_bool(0.1),
                    is_perishable: rng.random_bool(0.2),
                }
            })
            .collect();

        Ok((table, orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_dataset() {
        let params = SyntheticBacklog::default();
        let (table_a, orders_a) = params.generate().unwrap();
        let (table_b, orders_b) = params.generate().unwrap();
        assert_eq!(table_a, table_b);
        assert_eq!(orders_a, orders_b);
    }

    #[test]
    fn test_orders_reference_valid_zones() {
        let params = SyntheticBacklog {
            zones: 3,
            orders: 50,
            ..SyntheticBacklog::default()
        };
        let (table, orders) = params.generate().unwrap();
        assert_eq!(orders.len(), 50);
        assert!(orders.iter().all(|order| table.contains(order.zone)));
        assert!(orders.iter().all(|order| order.weight >= 1.0));
    }
}
