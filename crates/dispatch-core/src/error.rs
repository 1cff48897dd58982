//! Configuration errors raised before planning starts.
//!
//! Orders that cannot be placed are not errors: they end up in
//! [`DispatchPlan::unplaced`](crate::models::DispatchPlan) with a reason.

use crate::models::{OrderId, ZoneId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("malformed distance table: {0}")]
    MalformedTable(String),
    #[error("distance table declares {declared} zones but has {rows} data rows")]
    ZoneCountMismatch { declared: usize, rows: usize },
    #[error("zone {zone} is outside the distance table (0..{zone_count})")]
    OutOfRangeZone { zone: ZoneId, zone_count: usize },
    #[error("order {id} is invalid: {reason}")]
    InvalidOrder { id: OrderId, reason: String },
    #[error("order id {0} appears more than once in the backlog")]
    DuplicateOrderId(OrderId),
    #[error("invalid drone configuration: {0}")]
    InvalidDrone(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
