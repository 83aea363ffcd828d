//! Decide command implementation.
//!
//! Prints `changed` or `unchanged` for one dependency/target pair.

use crate::cli::args::DecideArgs;
use crate::decider::ContentSignatureDecider;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

pub struct DecideCommand {
    args: DecideArgs,
}

impl DecideCommand {
    pub fn new(args: DecideArgs) -> Self {
        Self { args }
    }
}

impl Command for DecideCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut decider = ContentSignatureDecider::new();
        let decision = decider.decide(&self.args.dep, &self.args.target, self.args.prev.as_deref())?;

        ui.output(&decision.to_string());
        if ui.output_mode().shows_detail() {
            for record in decider.records() {
                ui.show_key_value(&record.path.display().to_string(), &record.signature);
            }
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decider::content_signature;
    use crate::ui::{MockUI, OutputMode};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fixture(temp: &TempDir) -> (PathBuf, PathBuf) {
        let dep = temp.path().join("input.c");
        let target = temp.path().join("input.o");
        fs::write(&dep, "int main() { return 0; }").unwrap();
        fs::write(&target, "obj").unwrap();
        (dep, target)
    }

    #[test]
    fn no_previous_signature_is_changed() {
        let temp = TempDir::new().unwrap();
        let (dep, target) = fixture(&temp);

        let mut ui = MockUI::new();
        DecideCommand::new(DecideArgs {
            dep,
            target,
            prev: None,
        })
        .execute(&mut ui)
        .unwrap();

        assert_eq!(ui.outputs(), ["changed"]);
    }

    #[test]
    fn matching_signature_is_unchanged() {
        let temp = TempDir::new().unwrap();
        let (dep, target) = fixture(&temp);
        let prev = content_signature(&dep).unwrap();

        let mut ui = MockUI::with_mode(OutputMode::Verbose);
        DecideCommand::new(DecideArgs {
            dep: dep.clone(),
            target,
            prev: Some(prev.clone()),
        })
        .execute(&mut ui)
        .unwrap();

        assert_eq!(ui.outputs(), ["unchanged"]);
        assert_eq!(ui.value_of(&dep.display().to_string()), Some(prev.as_str()));
    }
}
