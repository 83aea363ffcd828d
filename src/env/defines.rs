//! Generated preprocessor defines header.

use crate::error::Result;
use std::fs;
use std::path::Path;

/// Render the defines header.
pub fn render_defines(defines: &[String]) -> String {
    let mut out = String::from("// Autogenerated file\n#pragma once\n\n");
    for name in defines {
        out.push_str(&format!("#define {}\n", name));
    }
    out
}

/// Write the defines header to `path`, creating parent directories.
pub fn write_defines(path: &Path, defines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, render_defines(defines))?;
    tracing::debug!("Wrote {} define(s) to {}", defines.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn renders_marker_guard_and_defines() {
        let out = render_defines(&["HAVE_ZLIB".into(), "HAVE_PTHREAD".into()]);
        insta::assert_snapshot!(out.trim_end(), @r"
        // Autogenerated file
        #pragma once

        #define HAVE_ZLIB
        #define HAVE_PTHREAD
        ");
    }

    #[test]
    fn empty_defines_still_have_header() {
        let out = render_defines(&[]);
        assert_eq!(out, "// Autogenerated file\n#pragma once\n\n");
    }

    #[test]
    fn creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build").join("gen").join("config.h");

        write_defines(&path, &["DEBUG".into()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("#define DEBUG\n"));
    }
}
