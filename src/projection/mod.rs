//! Projection engine for cohort-component population projections

mod state;
mod engine;
mod output;

pub use state::{ProjectionState, FEMALE_BIRTH_SHARE, MALE_BIRTH_SHARE};
pub use engine::{project, ProjectionConfig, ProjectionEngine, SLIDER_STEP};
pub use output::{ProjectionOutput, ProjectionRow, ProjectionSummary};
