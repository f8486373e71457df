pub mod control;
pub mod emission;
pub mod stoch;
pub mod units;

pub use control::*;
pub use emission::*;
pub use stoch::*;
pub use units::*;
