//! Zone-to-zone distance lookup.

use serde::Serialize;

use crate::error::{DispatchError, Result};
use crate::models::ZoneId;

/// Square matrix of travel distances between delivery zones, in kilometers.
///
/// Entry `(i, j)` is the distance flown from zone `i` to zone `j`. The table
/// is treated as directed; nothing assumes `(i, j) == (j, i)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDistanceTable {
    zone_count: usize,
    /// Row-major, `zone_count * zone_count` entries
    distances: Vec<f64>,
}

impl ZoneDistanceTable {
    /// Build a table from a declared zone count and its data rows.
    ///
    /// # Errors
    /// * `ZoneCountMismatch` - row count differs from `zone_count`
    /// * `MalformedTable` - a row has the wrong width or a bad entry
    pub fn new(zone_count: usize, rows: Vec<Vec<f64>>) -> Result<Self> {
        if zone_count == 0 {
            return Err(DispatchError::MalformedTable(
                "table must declare at least one zone".to_string(),
            ));
        }
        if rows.len() != zone_count {
            return Err(DispatchError::ZoneCountMismatch {
                declared: zone_count,
                rows: rows.len(),
            });
        }

        let mut distances = Vec::with_capacity(zone_count * zone_count);
        for (origin, row) in rows.into_iter().enumerate() {
            if row.len() != zone_count {
                return Err(DispatchError::MalformedTable(format!(
                    "row {} has {} entries, expected {}",
                    origin,
                    row.len(),
                    zone_count
                )));
            }
            if let Some(destination) = row.iter().position(|d| !d.is_finite() || *d < 0.0) {
                return Err(DispatchError::MalformedTable(format!(
                    "distance from zone {} to zone {} is {}",
                    origin, destination, row[destination]
                )));
            }
            distances.extend(row);
        }

        Ok(Self {
            zone_count,
            distances,
        })
    }

    pub fn zone_count(&self) -> usize {
        self.zone_count
    }

    pub fn contains(&self, zone: ZoneId) -> bool {
        zone < self.zone_count
    }

    /// Distance in kilometers from `origin` to `destination`.
    pub fn distance(&self, origin: ZoneId, destination: ZoneId) -> Result<f64> {
        self.check_zone(origin)?;
        self.check_zone(destination)?;
        Ok(self.distances[origin * self.zone_count + destination])
    }

    /// Fail with `OutOfRangeZone` unless `zone` indexes this table.
    pub fn check_zone(&self, zone: ZoneId) -> Result<()> {
        if self.contains(zone) {
            Ok(())
        } else {
            Err(DispatchError::OutOfRangeZone {
                zone,
                zone_count: self.zone_count,
            })
        }
    }

    /// Copy of the matrix as rows, in the same layout `new` accepts.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.distances
            .chunks(self.zone_count)
            .map(|row| row.to_vec())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directed_lookup() {
        let table = ZoneDistanceTable::new(2, vec![vec![0.0, 5.0], vec![7.0, 0.0]]).unwrap();
        assert_eq!(table.distance(0, 1).unwrap(), 5.0);
        assert_eq!(table.distance(1, 0).unwrap(), 7.0);
        assert_eq!(table.distance(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_out_of_range_zone() {
        let table = ZoneDistanceTable::new(2, vec![vec![0.0, 5.0], vec![5.0, 0.0]]).unwrap();
        let err = table.distance(0, 2).unwrap_err();
        assert_eq!(
            err,
            DispatchError::OutOfRangeZone {
                zone: 2,
                zone_count: 2
            }
        );
    }

    #[test]
    fn test_row_count_must_match_declared_zones() {
        let err = ZoneDistanceTable::new(3, vec![vec![0.0, 1.0, 2.0]]).unwrap_err();
        assert_eq!(
            err,
            DispatchError::ZoneCountMismatch {
                declared: 3,
                rows: 1
            }
        );
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let err = ZoneDistanceTable::new(2, vec![vec![0.0, 5.0], vec![5.0]]).unwrap_err();
        assert!(matches!(err, DispatchError::MalformedTable(_)));
    }

    #[test]
    fn test_negative_distance_is_malformed() {
        let err = ZoneDistanceTable::new(2, vec![vec![0.0, -1.0], vec![5.0, 0.0]]).unwrap_err();
        assert!(matches!(err, DispatchError::MalformedTable(_)));
    }

    #[test]
    fn test_rows_round_trip_layout() {
        let rows = vec![vec![0.0, 2.0], vec![3.0, 0.0]];
        let table = ZoneDistanceTable::new(2, rows.clone()).unwrap();
        assert_eq!(table.rows(), rows);
    }
}
