/// Target functions `z = f(x, y)` sampled by the compute workers
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Any total function from two floats to one. Workers only ever call
/// `evaluate`, from several threads at once.
pub trait SurfaceFunction: Send + Sync {
    fn evaluate(&self, x: f32, y: f32) -> f32;
}

impl<F> SurfaceFunction for F
where
    F: Fn(f32, f32) -> f32 + Send + Sync,
{
    fn evaluate(&self, x: f32, y: f32) -> f32 {
        self(x, y)
    }
}

/// Built-in surfaces selectable from the command line or config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// z = x² + y²
    #[default]
    Paraboloid,
    /// z = x² - y²
    Saddle,
    /// z = 10·sin(√(x² + y²))
    Ripple,
    /// z = x·y
    Product,
}

impl SurfaceFunction for Surface {
    fn evaluate(&self, x: f32, y: f32) -> f32 {
        match self {
            Surface::Paraboloid => x * x + y * y,
            Surface::Saddle => x * x - y * y,
            Surface::Ripple => 10.0 * (x * x + y * y).sqrt().sin(),
            Surface::Product => x * y,
        }
    }
}
