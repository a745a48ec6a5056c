//! Priority-tiered delivery schedulers.
//!
//! One driver type, constructed once per tier. The source platform ran
//! three near-identical copies of this loop; here a single driver is
//! parameterized by its `Priority` so the state machine exists exactly
//! once.

mod driver;

pub use driver::DeliveryScheduler;
