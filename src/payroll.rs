//! Pay week and compensation rules
//!
//! Everything in here is synchronous and side-effect free. Handlers fetch rows,
//! pass them through these functions and persist whatever comes back.

mod compensation;
mod cycle;
mod hours;
mod week;

pub use compensation::*;
pub use cycle::*;
pub use hours::*;
pub use week::*;
