/// Every bounding-box axis is clamped into `[-AXIS_CLAMP_LIMIT, AXIS_CLAMP_LIMIT]`
/// before scales are derived, so a single outlier cannot flatten the plot
pub const AXIS_CLAMP_LIMIT: f32 = 100.0;

/// Visual emphasis applied to the Z axis scale (must stay above 1)
pub const Z_WEIGHT: f32 = 1.5;

/// Share of the Z displacement applied vertically relative to horizontally
pub const Z_VERTICAL_FACTOR: f32 = 0.5;

/// Normalised position used for an axis whose range collapses to zero
pub const DEGENERATE_AXIS_MIDPOINT: f32 = 0.5;
