//! Application layer: orchestration of the reconciliation loop.

pub mod convergence_controller;

pub use convergence_controller::{
    ControllerConfig, ConvergenceController, LoopOutcome, LoopReport, ReconcileReport, RunMode,
    StallReason,
};
