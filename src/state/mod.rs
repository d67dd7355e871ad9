pub mod touch;

pub use touch::{GestureEvent, TouchTracker};
