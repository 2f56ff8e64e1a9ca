//! `sprintlens-recon`: per-discipline estimate reconciliation engine.
//!
//! Pure engine crate: receives a pre-loaded ticket table and a discipline
//! schema, returns classified counts, totals and deviation scores.
//! No CLI or IO dependencies.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod deviation;
pub mod engine;
pub mod error;
pub mod missing;
pub mod model;
pub mod summary;

pub use config::{DisciplineMapping, DisciplineSchema, InputConfig, ReconConfig, RunPolicy, TotalsMode};
pub use engine::{analyze_discipline, run};
pub use error::{ErrorKind, ReconError};
pub use model::{Cell, DisciplineResult, MissingDetail, ReconResult, TicketRow, TicketTable};
