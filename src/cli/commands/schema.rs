//! Schema command implementation.
//!
//! Prints the JSON schema for `tool.yml` manifests.

use schemars::schema_for;

use crate::error::{ConfprobeError, Result};
use crate::tools::ToolManifest;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

pub struct SchemaCommand;

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let schema = schema_for!(ToolManifest);
        let json =
            serde_json::to_string_pretty(&schema).map_err(|e| ConfprobeError::Other(e.into()))?;
        ui.output(&json);
        Ok(CommandResult::success())
    }
}
