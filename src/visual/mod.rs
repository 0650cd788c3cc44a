pub mod components;
pub mod interactions;
pub mod physics;
pub mod plugin;
pub mod ropes;
pub mod setup;
pub mod utils;
