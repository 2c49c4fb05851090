/// Blank margin kept around the drawing area (pixels)
pub const SURFACE_PADDING: u32 = 40;

pub const DEFAULT_SURFACE_WIDTH: u32 = 800;
pub const DEFAULT_SURFACE_HEIGHT: u32 = 600;

pub const BACKGROUND_COLOUR: [u8; 3] = [255, 255, 255];
pub const AXIS_COLOUR: [u8; 3] = [0, 0, 0];
pub const POLYLINE_COLOUR: [u8; 3] = [0, 0, 255];
pub const MARKER_COLOUR: [u8; 3] = [255, 0, 0];

pub const AXIS_LINE_WIDTH: u32 = 2;
pub const POLYLINE_WIDTH: u32 = 2;

/// Radius of the ring drawn around every projected sample (pixels)
pub const MARKER_RADIUS: i32 = 3;

/// Label offsets relative to the axis end point, (dx, dy) in pixels
pub const X_LABEL_OFFSET: (i32, i32) = (5, -15);
pub const Y_LABEL_OFFSET: (i32, i32) = (-15, -5);
pub const Z_LABEL_OFFSET: (i32, i32) = (-15, -15);
