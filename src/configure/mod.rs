//! Configuration transactions and the configure phase.
//!
//! - [`transaction`] - running one tool's configuration routine in isolation
//! - [`session`] - option files, callbacks and the rebuild decider
//! - [`project`] - configuring everything a `confprobe.yml` lists

pub mod project;
pub mod session;
pub mod transaction;

pub use project::{configure_project, ProjectReport};
pub use session::{ConfigureSession, OPTIONS_VAR, OPTION_FILES};
pub use transaction::{run_config, run_transaction, Outcome};
