//! Readings — one on-demand snapshot of a collection's utilization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MalformedReading, QueryError};

/// UTC instant a reading was taken at.
pub type Timestamp = DateTime<Utc>;

/// One result row of the aggregate count query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub count: u64,
}

/// Utilization of the collection at the moment the query ran.
///
/// Readings are never cached: every call to the sensor produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Number of documents in the collection.
    pub count: u64,
    /// `count / limit`. Not clamped, so values above `1.0` are possible.
    pub usage: f64,
    /// Limit the usage was computed against.
    pub limit: u64,
    pub taken_at: Timestamp,
}

impl Reading {
    /// Build a reading from a count and the limit active for the same call.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(count: u64, limit: u64) -> Self {
        Self {
            count,
            usage: count as f64 / limit as f64,
            limit,
            taken_at: Utc::now(),
        }
    }

    /// A reading reported by someone else, taken as-is.
    ///
    /// `usage` is not recomputed from `count` and `limit`, so it can be
    /// checked with [`checked_usage`](Self::checked_usage) like any other.
    #[must_use]
    pub fn observed(count: u64, usage: f64, limit: u64) -> Self {
        Self {
            count,
            usage,
            limit,
            taken_at: Utc::now(),
        }
    }

    /// Build a reading from the rows returned by the count query.
    ///
    /// Only the first row is used; the aggregation is expected to produce
    /// exactly one.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyResult`] when `rows` is empty. A single row
    /// with a zero count is a valid reading.
    pub fn from_rows(rows: &[CountRow], limit: u64) -> Result<Self, QueryError> {
        let row = rows.first().ok_or(QueryError::EmptyResult)?;
        Ok(Self::new(row.count, limit))
    }

    /// Usage, after checking it is a finite number.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedReading::NonFiniteUsage`] for NaN or infinite values.
    pub fn checked_usage(&self) -> Result<f64, MalformedReading> {
        if self.usage.is_finite() {
            Ok(self.usage)
        } else {
            Err(MalformedReading::NonFiniteUsage(self.usage))
        }
    }
}
