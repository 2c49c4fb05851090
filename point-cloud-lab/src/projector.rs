/// Oblique 3-D to 2-D projection with bounds-aware scaling and centering
///
/// Each axis is normalised into `[-1, 1]` against the (clamped) bounding box of
/// the cloud, then
///
/// ```text
/// screen_x = center_x + nx * base_scale - nz * z_scale
/// screen_y = center_y - ny * base_scale - nz * z_scale * 0.5
/// ```
///
/// so Z pulls points along the negative X / negative Y diagonal, with half the
/// vertical weight it has horizontally.
use crate::bounds::PointCloudBounds;
use crate::point::{PointRecord, ScreenPoint};
use constants::projection::{AXIS_CLAMP_LIMIT, Z_VERTICAL_FACTOR, Z_WEIGHT};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Rectangle of the surface the cloud is fitted into, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawArea {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DrawArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// The area left inside a `width × height` surface after `padding` on all sides.
    pub fn inset(width: u32, height: u32, padding: u32) -> Self {
        Self {
            left: padding as f32,
            top: padding as f32,
            width: width.saturating_sub(padding.saturating_mul(2)) as f32,
            height: height.saturating_sub(padding.saturating_mul(2)) as f32,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Per-frame projection parameters. Derived fresh from the current cloud on
/// every render and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawingParameters {
    /// Bounding box with every axis clamped to the sane range
    pub bounds: PointCloudBounds,
    pub base_scale: f32,
    pub final_z_scale: f32,
    pub draw_center_x: f32,
    pub draw_center_y: f32,
}

/// End points of the three axes drawn from the bounding-box origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisEndpoints {
    pub origin: ScreenPoint,
    pub x_end: ScreenPoint,
    pub y_end: ScreenPoint,
    pub z_end: ScreenPoint,
}

impl AxisEndpoints {
    pub fn is_finite(&self) -> bool {
        [self.origin, self.x_end, self.y_end, self.z_end]
            .iter()
            .all(ScreenPoint::is_finite)
    }
}

pub fn compute_parameters(
    points: &[PointRecord],
    draw_width: f32,
    draw_height: f32,
) -> DrawingParameters {
    compute_parameters_in(points, DrawArea::new(draw_width, draw_height))
}

pub fn compute_parameters_in(points: &[PointRecord], area: DrawArea) -> DrawingParameters {
    let bounds = PointCloudBounds::from_points(points).clamped(AXIS_CLAMP_LIMIT);
    let (range_x, range_y, range_z) = bounds.dimensions();

    let base_scale = axis_scale(area.width, range_x).min(axis_scale(area.height, range_y));
    let final_z_scale = axis_scale(area.height, range_z) * Z_WEIGHT;

    // The normalised cube projects symmetrically about the origin, so centering
    // it on the area center centers the whole cloud.
    let (draw_center_x, draw_center_y) = area.center();

    DrawingParameters {
        bounds,
        base_scale,
        final_z_scale,
        draw_center_x,
        draw_center_y,
    }
}

fn axis_scale(extent: f32, range: f32) -> f32 {
    if range > 0.0 { extent / range } else { 1.0 }
}

impl DrawingParameters {
    pub fn project(&self, point: &PointRecord) -> ScreenPoint {
        self.project_normalized(
            self.bounds.normalize_x(point.x),
            self.bounds.normalize_y(point.y),
            self.bounds.normalize_z(point.z),
        )
    }

    fn project_normalized(&self, nx: f32, ny: f32, nz: f32) -> ScreenPoint {
        let z_offset = nz * self.final_z_scale;
        ScreenPoint::new(
            self.draw_center_x + nx * self.base_scale - z_offset,
            self.draw_center_y - ny * self.base_scale - z_offset * Z_VERTICAL_FACTOR,
        )
    }

    pub fn axes(&self) -> AxisEndpoints {
        AxisEndpoints {
            origin: self.project_normalized(-1.0, -1.0, -1.0),
            x_end: self.project_normalized(1.0, -1.0, -1.0),
            y_end: self.project_normalized(-1.0, 1.0, -1.0),
            z_end: self.project_normalized(-1.0, -1.0, 1.0),
        }
    }
}

/// Project every point; `output[i]` always corresponds to `points[i]`.
pub fn transform(points: &[PointRecord], parameters: &DrawingParameters) -> Vec<ScreenPoint> {
    points.par_iter().map(|p| parameters.project(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn repeated_point_gives_finite_parameters() {
        let points = vec![PointRecord::new(3.0, -2.0, 7.0); 5];
        let params = compute_parameters(&points, 720.0, 520.0);

        assert_eq!(params.base_scale, 1.0);
        assert_eq!(params.final_z_scale, Z_WEIGHT);
        assert!(params.draw_center_x.is_finite() && params.draw_center_y.is_finite());

        for p in transform(&points, &params) {
            assert_relative_eq!(p.x, 360.0);
            assert_relative_eq!(p.y, 260.0);
        }
    }

    #[test]
    fn padding_larger_than_surface_leaves_nothing() {
        let area = DrawArea::inset(800, 600, u32::MAX);
        assert_eq!((area.width, area.height), (0.0, 0.0));

        let area = DrawArea::inset(800, 600, 40);
        assert_eq!((area.left, area.width, area.height), (40.0, 720.0, 520.0));
    }

    #[test]
    fn empty_cloud_still_has_parameters() {
        let params = compute_parameters(&[], 100.0, 100.0);
        assert!(params.base_scale.is_finite());
        assert!(transform(&[], &params).is_empty());
    }

    #[test]
    fn scales_follow_bounding_box() {
        let points = [PointRecord::new(0.0, 0.0, 0.0), PointRecord::new(4.0, 2.0, 10.0)];
        let params = compute_parameters(&points, 800.0, 600.0);

        // min(800 / 4, 600 / 2)
        assert_relative_eq!(params.base_scale, 200.0);
        assert_relative_eq!(params.final_z_scale, 600.0 / 10.0 * Z_WEIGHT);
        assert_relative_eq!(params.draw_center_x, 400.0);
        assert_relative_eq!(params.draw_center_y, 300.0);

        let top = params.project(&points[1]);
        assert_relative_eq!(top.x, 400.0 + 200.0 - 90.0);
        assert_relative_eq!(top.y, 300.0 - 200.0 - 45.0);
    }

    #[test]
    fn outliers_are_clamped() {
        let points = [PointRecord::new(-1e6, 0.0, 0.0), PointRecord::new(100.0, 1.0, 1.0)];
        let params = compute_parameters(&points, 400.0, 400.0);

        assert_eq!(params.bounds.min_x, -AXIS_CLAMP_LIMIT);
        assert_relative_eq!(params.base_scale, 2.0);
        assert!(transform(&points, &params).iter().all(ScreenPoint::is_finite));
    }

    #[test]
    fn preserves_input_order() {
        let points: Vec<_> = (0..500)
            .map(|i| {
                let t = i as f32 * 0.1;
                PointRecord::new(t.cos() * 10.0, t.sin() * 10.0, t)
            })
            .collect();
        let params = compute_parameters(&points, 640.0, 480.0);
        let projected = transform(&points, &params);

        assert_eq!(projected.len(), points.len());
        for (point, screen) in points.iter().zip(&projected) {
            assert_eq!(*screen, params.project(point));
        }
    }

    #[test]
    fn collinear_points_stay_collinear() {
        let points = [
            PointRecord::new(0.0, 0.0, 0.0),
            PointRecord::new(1.0, 1.0, 1.0),
            PointRecord::new(2.0, 2.0, 2.0),
        ];
        let params = compute_parameters(&points, 500.0, 300.0);
        let p = transform(&points, &params);

        let (ax, ay) = (p[1].x - p[0].x, p[1].y - p[0].y);
        let (bx, by) = (p[2].x - p[1].x, p[2].y - p[1].y);
        assert_relative_eq!(ax * by - ay * bx, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn axes_start_at_bounding_box_origin() {
        let points = [PointRecord::new(-2.0, -2.0, 0.0), PointRecord::new(2.0, 2.0, 8.0)];
        let params = compute_parameters_in(&points, DrawArea::inset(800, 600, 40));
        let axes = params.axes();

        assert!(axes.is_finite());
        assert_eq!(axes.origin, params.project(&PointRecord::new(-2.0, -2.0, 0.0)));
        assert_eq!(axes.x_end, params.project(&PointRecord::new(2.0, -2.0, 0.0)));
        assert_eq!(axes.z_end, params.project(&PointRecord::new(-2.0, -2.0, 8.0)));
        assert!(axes.x_end.x > axes.origin.x);
        assert!(axes.y_end.y < axes.origin.y);
    }
}
