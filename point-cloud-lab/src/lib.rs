pub mod bounds;
pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod grid;
pub mod point;
pub mod progress;
pub mod projector;
pub mod renderer;
pub mod session;
pub mod store;
pub mod surface;
pub mod worker;

pub use coordinator::{ComputeCoordinator, RunSummary};
pub use error::LabError;
pub use grid::ComputeJobSpec;
pub use point::{PointRecord, ScreenPoint};
pub use projector::{DrawingParameters, compute_parameters, transform};
pub use session::LabSession;
pub use store::ResultStore;
