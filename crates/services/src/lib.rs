#![forbid(unsafe_code)]

pub mod error;
pub mod generator;
pub mod overview;
pub mod practice;
pub mod request;
pub mod seed;

pub use math_core::Clock;

pub use error::{OverviewError, PracticeError, SeedError};
pub use generator::ProblemGenerator;
pub use overview::{DashboardOverview, LevelProgressItem, OverviewService};
pub use practice::{CompletionOutcome, PracticeResponse, PracticeService, SubmissionOutcome};
pub use request::{CompleteLevel, PracticeRequest, RequestError, SubmitAnswer};
pub use seed::{SeedReport, SeedService};
