// In crates/core-types/src/series.rs

use crate::{Error, PricePoint, Result};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// A sliding window of price samples.
///
/// Holds at most `capacity` samples; pushing past capacity evicts the oldest.
/// Timestamps must be strictly increasing.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    points: VecDeque<PricePoint>,
    capacity: usize,
}

impl PriceSeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Builds a window from samples in chronological order.
    pub fn from_points(capacity: usize, points: impl IntoIterator<Item = PricePoint>) -> Result<Self> {
        let mut series = Self::new(capacity);
        for point in points {
            series.push(point)?;
        }
        Ok(series)
    }

    /// Appends a sample, returning the evicted one if the window was full.
    pub fn push(&mut self, point: PricePoint) -> Result<Option<PricePoint>> {
        if !point.price.is_finite() {
            return Err(Error::InvalidPrice(point.price));
        }
        if let Some(last) = self.points.back() {
            if point.timestamp <= last.timestamp {
                return Err(Error::NonMonotonicTimestamp {
                    last: last.timestamp,
                    next: point.timestamp,
                });
            }
        }

        self.points.push_back(point);
        if self.points.len() > self.capacity {
            return Ok(self.points.pop_front());
        }
        Ok(None)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    pub fn oldest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.front().map(|p| p.timestamp)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    /// The bare prices, oldest first.
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}
