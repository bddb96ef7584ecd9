mod clip;
mod composite;
mod flush;
/// The graphics backend and its drawing entry points.
pub mod graphics;
/// Window-system-free platform implementations.
pub mod headless;
/// Interfaces to the surrounding toolkit.
pub mod platform;
mod surface;
mod xor;
