//! # warden-service
//!
//! Application layer: blacklist enforcement, activity check scheduling and
//! evaluation, and the timer that drives evaluation.

pub mod services;
pub mod ticker;

pub use services::{
    ActivityCheckService, BanOutcome, BanService, BanTarget, CheckReport, EvaluationSummary,
    JoinOutcome, Outcome, RoleAction, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, UnbanOutcome,
};
pub use ticker::EvaluationTicker;
