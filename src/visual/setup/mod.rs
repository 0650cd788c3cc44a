pub mod scene;

pub use scene::{init_simulation, setup_scene};
