pub mod descent;
pub mod pop;

pub use descent::{AnchorDescent, descend_anchor, queue_descent};
pub use pop::{animate_pops, tap_balloons};
