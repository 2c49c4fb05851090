/// Point cloud coordinate bounds tracking and normalisation
use crate::point::PointRecord;
use constants::projection::DEGENERATE_AXIS_MIDPOINT;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Points per chunk when reducing bounds in parallel
const BOUNDS_CHUNK_SIZE: usize = 25_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointCloudBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for PointCloudBounds {
    fn default() -> Self {
        Self::new()
    }
}

impl PointCloudBounds {
    /// Create new bounds initialised to infinity values
    pub fn new() -> Self {
        Self {
            min_x: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            min_y: f32::INFINITY,
            max_y: f32::NEG_INFINITY,
            min_z: f32::INFINITY,
            max_z: f32::NEG_INFINITY,
        }
    }

    /// A zero-sized box at the origin, used for empty clouds
    pub fn zero() -> Self {
        Self {
            min_x: 0.0,
            max_x: 0.0,
            min_y: 0.0,
            max_y: 0.0,
            min_z: 0.0,
            max_z: 0.0,
        }
    }

    /// Compute bounds over all points using chunked parallel reduction.
    pub fn from_points(points: &[PointRecord]) -> Self {
        if points.is_empty() {
            return Self::zero();
        }

        points
            .par_chunks(BOUNDS_CHUNK_SIZE)
            .map(|chunk| {
                let mut local_bounds = Self::new();
                for point in chunk {
                    local_bounds.update(point.x, point.y, point.z);
                }
                local_bounds
            })
            .reduce_with(Self::merge)
            .unwrap_or_else(Self::zero)
    }

    /// Update bounds with a new point
    pub fn update(&mut self, x: f32, y: f32, z: f32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        self.min_z = self.min_z.min(z);
        self.max_z = self.max_z.max(z);
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
        self.min_z = self.min_z.min(other.min_z);
        self.max_z = self.max_z.max(other.max_z);
        self
    }

    /// Clamp every axis into `[-limit, limit]`
    pub fn clamped(&self, limit: f32) -> Self {
        let c = |v: f32| v.clamp(-limit, limit);
        Self {
            min_x: c(self.min_x),
            max_x: c(self.max_x),
            min_y: c(self.min_y),
            max_y: c(self.max_y),
            min_z: c(self.min_z),
            max_z: c(self.max_z),
        }
    }

    pub fn dimensions(&self) -> (f32, f32, f32) {
        (
            self.max_x - self.min_x,
            self.max_y - self.min_y,
            self.max_z - self.min_z,
        )
    }

    /// Normalise X coordinate to the -1..1 range
    pub fn normalize_x(&self, x: f32) -> f32 {
        normalize(x, self.min_x, self.max_x)
    }

    /// Normalise Y coordinate to the -1..1 range
    pub fn normalize_y(&self, y: f32) -> f32 {
        normalize(y, self.min_y, self.max_y)
    }

    /// Normalise Z coordinate to the -1..1 range
    pub fn normalize_z(&self, z: f32) -> f32 {
        normalize(z, self.min_z, self.max_z)
    }
}

fn normalize(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    let unit = if range > 0.0 {
        (value - min) / range
    } else {
        DEGENERATE_AXIS_MIDPOINT
    };
    (unit * 2.0 - 1.0).clamp(-1.0, 1.0)
}
