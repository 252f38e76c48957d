//! Business logic services
//!
//! Services borrow a [`ServiceContext`] and are cheap to construct per call.

pub mod activity_check;
pub mod ban;
pub mod context;
pub mod error;

pub use activity_check::{ActivityCheckService, CheckReport, EvaluationSummary, Outcome};
pub use ban::{BanOutcome, BanService, BanTarget, JoinOutcome, RoleAction, UnbanOutcome};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
