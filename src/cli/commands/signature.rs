//! Signature command implementation.

use crate::cli::args::SignatureArgs;
use crate::decider::content_signature;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

pub struct SignatureCommand {
    args: SignatureArgs,
}

impl SignatureCommand {
    pub fn new(args: SignatureArgs) -> Self {
        Self { args }
    }
}

impl Command for SignatureCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let signature = content_signature(&self.args.file)?;
        ui.output(&signature);
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn prints_sha256_of_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("empty");
        fs::write(&file, "").unwrap();

        let mut ui = MockUI::new();
        SignatureCommand::new(SignatureArgs { file })
            .execute(&mut ui)
            .unwrap();

        assert_eq!(
            ui.outputs(),
            ["e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"]
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("absent");
        assert!(SignatureCommand::new(SignatureArgs { file })
            .execute(&mut MockUI::new())
            .is_err());
    }
}
