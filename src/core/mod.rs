pub mod client;
pub mod config;
pub mod drivers;
pub mod error;
pub mod flow;
pub mod progress;
pub mod project;
pub mod stack;
pub mod stackbuilder;
pub mod types;

pub use client::{BuildRequest, BuildSummary, EnvironmentInfo};
pub use drivers::{Driver, DriverContext, DriverOutput, DriverRegistry};
pub use error::{AppError, DefaultErrorReporter, ErrorReporter};
pub use flow::{Flow, FlowStep};
pub use progress::{NoopProgress, ProgressReporter, TerminalProgress};
pub use stack::Stack;
pub use stackbuilder::{new_environments, Environments, EnvironmentsError, StackBuilder};
pub use types::*;
