pub mod analysis;
pub mod config;
pub mod delivery;
pub mod drone;
pub mod error;
pub mod models;
pub mod planner;
pub mod synthetic;
pub mod zones;

pub use analysis::{compare, sweep, PlanMetrics, StrategyComparison};
pub use config::DroneConfig;
pub use delivery::{deliver, DeliveryReport, DeliveryStatus};
pub use drone::{Drone, SimulationResult};
pub use error::DispatchError;
pub use models::{
    CustomerId, DispatchPlan, Order, OrderId, Rejection, Strategy, Trip, UnplacedOrder, ZoneId,
};
pub use planner::TripPlanner;
pub use synthetic::SyntheticBacklog;
pub use zones::ZoneDistanceTable;
