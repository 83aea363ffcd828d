//! Clone, try, commit or roll back.
//!
//! [`run_transaction`] runs one tool's configuration routine against a scratch
//! copy of the active settings and reports what happened; [`run_config`]
//! layers the required/optional failure policy on top.

use crate::env::Environment;
use crate::error::{ConfprobeError, Result};
use crate::probe::{Args, ProbeContext};

/// What happened to one configuration attempt.
#[derive(Debug)]
pub enum Outcome {
    /// The routine succeeded; its changes were kept and the tool enabled.
    Committed,
    /// The routine reported failure; its changes were discarded.
    Declined,
    /// The routine returned an error; its changes were discarded.
    Failed(ConfprobeError),
    /// No configuration method is registered for the tool.
    Unavailable,
}

impl Outcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed)
    }
}

/// Run `tool`'s configuration routine in isolation.
///
/// The active settings are swapped for a clone before the routine runs. On
/// [`Outcome::Committed`] the clone stays active; on every other outcome the
/// original settings are put back unchanged and header defines registered
/// by the routine are dropped.
pub fn run_transaction(env: &mut Environment, tool: &str, args: &Args) -> Outcome {
    let Some(method) = env.config_method(tool) else {
        return Outcome::Unavailable;
    };

    tracing::debug!("Configuring {}", tool);
    let scratch = env.settings().clone();
    let original = env.swap_settings(scratch);
    let defs_len = env.config_defs().len();

    let result = {
        let mut ctx = ProbeContext::new(env);
        method(&mut ctx, args)
    };

    match result {
        Ok(true) => {
            env.enable_tool(tool);
            tracing::info!("Configured {}", tool);
            Outcome::Committed
        }
        Ok(false) => {
            env.swap_settings(original);
            env.truncate_config_defs(defs_len);
            tracing::debug!("Rolled back {}", tool);
            Outcome::Declined
        }
        Err(e) => {
            env.swap_settings(original);
            env.truncate_config_defs(defs_len);
            tracing::debug!("Rolled back {}: {}", tool, e);
            Outcome::Failed(e)
        }
    }
}

/// Configure `tool`, applying the required/optional policy.
///
/// Returns `Ok(true)` when the configuration was committed. When `required`
/// is false every failure is reported as a status message and turned into
/// `Ok(false)`; when it is true failures become errors.
pub fn run_config(env: &mut Environment, tool: &str, required: bool, args: &Args) -> Result<bool> {
    match run_transaction(env, tool, args) {
        Outcome::Committed => Ok(true),
        Outcome::Unavailable if required => Err(ConfprobeError::NoConfigMethod {
            tool: tool.to_string(),
        }),
        Outcome::Unavailable => {
            tracing::debug!("No config method for optional tool {}", tool);
            Ok(false)
        }
        Outcome::Declined if required => Err(ConfprobeError::ConfigurationFailed {
            tool: tool.to_string(),
        }),
        Outcome::Declined => Ok(false),
        Outcome::Failed(e) if required => Err(e),
        Outcome::Failed(e) => {
            env.report(format!("{}: {}", tool, e));
            Ok(false)
        }
    }
}
