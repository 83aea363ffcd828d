//! Download command implementation.

use crate::cli::args::DownloadArgs;
use crate::error::Result;
use crate::fetch::Downloader;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

pub struct DownloadCommand {
    args: DownloadArgs,
}

impl DownloadCommand {
    pub fn new(args: DownloadArgs) -> Self {
        Self { args }
    }
}

impl Command for DownloadCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let show_progress = ui.is_interactive() && ui.output_mode().shows_status();
        let downloader = Downloader::new()?.show_progress(show_progress);

        let written = downloader.download(&self.args.url, &self.args.target)?;
        ui.success(&format!(
            "Downloaded {} bytes to {}",
            written,
            self.args.target.display()
        ));

        Ok(CommandResult::success())
    }
}
