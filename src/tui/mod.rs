pub mod app;
pub mod renderer;

pub use app::{App, Flow};
