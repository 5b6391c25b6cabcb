//! Entity structs for the Rollcall domain objects.
//!
//! Each entity maps 1:1 to a table in the libSQL database. All structs derive
//! `Serialize`/`Deserialize` for JSON roundtrip at the API boundary.

mod attendance;
mod audit;
mod class;
mod teacher;

pub use attendance::AttendanceRecord;
pub use audit::{ACTOR_SYSTEM, AuditRecord, NewAuditRecord, RequestMeta};
pub use class::{Class, SubjectAssignment};
pub use teacher::Teacher;
