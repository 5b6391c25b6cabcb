//! Repository methods, all implemented as `impl RollService`.

pub mod attendance;
pub mod audit;
pub mod class;
pub mod teacher;
