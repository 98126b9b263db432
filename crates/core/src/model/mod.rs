mod attempt;
mod grade;
mod ids;
mod level;
mod problem;
mod progress;
mod user;

pub use ids::{LevelId, ParseIdError, ProblemId, UserId};

pub use attempt::AttemptRecord;
pub use grade::{Grade, GradeError, InputMode};
pub use level::{Level, LevelError};
pub use problem::{Problem, ProblemError, ProblemKind};
pub use progress::{ProgressError, ProgressRecord};
pub use user::{User, UserError};
