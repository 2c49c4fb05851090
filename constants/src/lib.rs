pub mod projection;
pub mod render_settings;
pub mod sampling;
