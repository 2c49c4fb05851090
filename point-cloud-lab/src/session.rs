/// Compute, read back and render, in that order
use crate::coordinator::{ComputeCoordinator, RunSummary};
use crate::error::LabError;
use crate::grid::ComputeJobSpec;
use crate::point::PointRecord;
use crate::progress::ProgressListener;
use crate::renderer::{FrameSlot, Renderer};
use crate::store::ResultStore;
use crate::surface::SurfaceFunction;
use image::RgbImage;
use std::sync::Arc;

/// The entry points a front end drives. Reading and rendering only ever happen
/// after `run_computation` has returned, i.e. after every worker has joined.
pub struct LabSession {
    coordinator: Arc<ComputeCoordinator>,
    renderer: Renderer,
    frame: FrameSlot,
}

impl LabSession {
    pub fn new(store: Arc<ResultStore>, surface: Arc<dyn SurfaceFunction>, step: f32) -> Self {
        Self {
            coordinator: Arc::new(ComputeCoordinator::new(store, surface).with_step(step)),
            renderer: Renderer::default(),
            frame: FrameSlot::default(),
        }
    }

    /// Shared handle for cancelling from another thread.
    pub fn coordinator(&self) -> Arc<ComputeCoordinator> {
        Arc::clone(&self.coordinator)
    }

    /// Blocks until all workers finish or are cancelled.
    pub fn run_computation(
        &self,
        spec: &ComputeJobSpec,
        on_progress: &dyn ProgressListener,
    ) -> Result<RunSummary, LabError> {
        self.coordinator.run(spec, on_progress)
    }

    pub fn load_points(&self) -> Result<Vec<PointRecord>, LabError> {
        Ok(self.coordinator.store().read_all()?)
    }

    /// Render `points` and present the frame. On failure the previous frame
    /// stays current.
    pub fn render(
        &mut self,
        points: &[PointRecord],
        width: u32,
        height: u32,
    ) -> Result<&RgbImage, LabError> {
        let result = self.renderer.render_points(points, width, height);
        Ok(self.frame.present(result)?)
    }

    pub fn frame(&self) -> Option<&RgbImage> {
        self.frame.current()
    }

    pub fn cancel(&self) {
        self.coordinator.cancel();
    }
}
