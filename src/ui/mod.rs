//! Terminal output for the `confprobe` binary.
//!
//! Library code reports through `tracing`; the commands print their results
//! through [`UserInterface`] so tests can capture them with [`MockUI`].

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, Theme};

/// Output sink used by the CLI commands.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Change the output mode.
    fn set_output_mode(&mut self, mode: OutputMode);

    /// Print a plain status line.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Print an error. Errors are shown in every mode.
    fn error(&mut self, msg: &str);

    fn show_header(&mut self, title: &str);

    /// Print a `key: value` line.
    fn show_key_value(&mut self, key: &str, value: &str);

    /// Print command output verbatim, regardless of mode.
    ///
    /// Used for machine-readable results such as JSON or signatures.
    fn output(&mut self, text: &str);

    /// Whether stdout is a terminal.
    fn is_interactive(&self) -> bool;
}

/// Create the UI for the current process.
pub fn create_ui(mode: OutputMode) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode))
}
