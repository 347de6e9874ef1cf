//! One module per add-on event.

pub mod attachment;
pub mod hello;
pub mod pool;
pub mod showcase;
pub mod weather;
