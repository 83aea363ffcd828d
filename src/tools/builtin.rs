//! Tools embedded at compile time.

use crate::env::Environment;
use crate::error::{ConfprobeError, Result};
use crate::probe::check_osx_framework;
use include_dir::{include_dir, Dir};

use super::manifest::{ManifestTool, ToolManifest, ENTRY_POINT};
use super::Tool;

/// Embedded tools directory.
static TOOLS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/tools");

/// Tools shipped inside the binary, consulted after every search path.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTools;

impl BuiltinTools {
    /// The built-in tool called `name`, if there is one.
    pub fn get(&self, name: &str) -> Result<Option<Box<dyn Tool>>> {
        if name == OsxTool::NAME {
            return Ok(Some(Box::new(OsxTool)));
        }

        let path = format!("{}/{}", name, ENTRY_POINT);
        let Some(file) = TOOLS_DIR.get_file(&path) else {
            return Ok(None);
        };

        let content = file
            .contents_utf8()
            .ok_or_else(|| ConfprobeError::ManifestParse {
                path: file.path().to_path_buf(),
                message: "Invalid UTF-8".to_string(),
            })?;
        let manifest = ToolManifest::parse(content, file.path())?;
        Ok(Some(Box::new(ManifestTool::new(manifest))))
    }

    /// Names of every built-in tool, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = TOOLS_DIR
            .dirs()
            .filter(|dir| dir.get_file(dir.path().join(ENTRY_POINT)).is_some())
            .filter_map(|dir| dir.path().file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        names.push(OsxTool::NAME.to_string());
        names.sort();
        names
    }
}

/// Registers the `check_osx_framework` probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsxTool;

impl OsxTool {
    pub const NAME: &'static str = "osx";
}

impl Tool for OsxTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn generate(&self, env: &mut Environment) -> Result<()> {
        env.add_probe("check_osx_framework", |ctx, args| {
            let framework = args.expect_arg(0, "check_osx_framework")?;
            Ok(check_osx_framework(ctx, framework)?.into())
        });
        Ok(())
    }
}
