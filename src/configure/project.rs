//! Configuring a project from its `confprobe.yml`.

use crate::config::ProjectConfig;
use crate::decider::ContentSignatureDecider;
use crate::env::{BuildEnv, Environment};
use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::session::ConfigureSession;

/// Result of configuring a project.
#[derive(Debug, Serialize)]
pub struct ProjectReport {
    pub name: String,
    /// Tools whose configuration was committed, in order.
    pub configured: Vec<String>,
    /// Optional tools that could not be configured.
    pub skipped: Vec<String>,
    pub option_files: Vec<PathBuf>,
    pub messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_header: Option<PathBuf>,
    pub settings: BuildEnv,
    #[serde(skip)]
    pub decider: ContentSignatureDecider,
}

/// Load the project's tools, run the configure phase and configure each
/// listed tool in order.
///
/// `extra_tool_paths` are searched after the project's own `tool_paths`.
pub fn configure_project(
    env: &mut Environment,
    project: &ProjectConfig,
    root: &Path,
    extra_tool_paths: &[PathBuf],
) -> Result<ProjectReport> {
    let mut paths = project.resolved_tool_paths(root);
    paths.extend(extra_tool_paths.iter().cloned());

    env.add_variables(project.variables.iter().cloned());
    env.define(project.defines.iter().cloned());
    env.config_def(project.config_defs.iter().cloned());

    env.load_tools(&project.tools, &paths)?;
    for entry in &project.configure {
        env.load_tool_from(entry.tool(), &paths)?;
    }

    let session = ConfigureSession::begin(env, root)?;
    let option_files = session.option_files().to_vec();
    if !env.variables().is_empty() {
        tracing::debug!("Variables:{}", session.help());
    }

    let mut configured = Vec::new();
    let mut skipped = Vec::new();
    for entry in &project.configure {
        if env.run_config(entry.tool(), entry.required(), &entry.args())? {
            configured.push(entry.tool().to_string());
        } else {
            skipped.push(entry.tool().to_string());
        }
    }

    let config_header = match &project.config_header {
        Some(header) => {
            let path = root.join(header);
            env.write_defines(&path)?;
            tracing::info!("Wrote {}", path.display());
            Some(path)
        }
        None => None,
    };

    let decider = session.finish(env)?;

    Ok(ProjectReport {
        name: project.display_name(root),
        configured,
        skipped,
        option_files,
        messages: env.messages().to_vec(),
        config_header,
        settings: env.settings().clone(),
        decider,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_project;
    use crate::env::{keys, MapVars};
    use crate::probe::MockBackend;
    use crate::tools::ToolLoader;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn project_env(root: &Path, vars: MapVars, backend: MockBackend) -> Environment {
        Environment::new("test")
            .with_vars(vars)
            .with_backend(Arc::new(backend))
            .with_loader(ToolLoader::new(root).with_engine_dir(None))
    }

    #[test]
    fn configures_builtin_tools_and_writes_header() {
        let temp = TempDir::new().unwrap();
        let project = parse_project(
            "name: widget\nconfigure:\n  - zlib\n  - { tool: pthread, required: false }\nconfig_defs: [WIDGET]\nconfig_header: build/config.h\n",
            Path::new("confprobe.yml"),
        )
        .unwrap();

        let backend = MockBackend::new().with_header("zlib.h").with_lib("z");
        let mut env = project_env(temp.path(), MapVars::new(), backend);
        let report = configure_project(&mut env, &project, temp.path(), &[]).unwrap();

        assert_eq!(report.name, "widget");
        assert_eq!(report.configured, ["zlib"]);
        assert_eq!(report.skipped, ["pthread"]);
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.settings.list(keys::LIBS), ["z"]);

        let header = fs::read_to_string(temp.path().join("build/config.h")).unwrap();
        assert!(header.contains("#define WIDGET\n"));
        assert!(header.contains("#define HAVE_ZLIB\n"));
        assert!(!header.contains("HAVE_PTHREAD"));
    }

    #[test]
    fn required_failure_aborts() {
        let temp = TempDir::new().unwrap();
        let project = parse_project("configure: [zlib]\n", Path::new("confprobe.yml")).unwrap();

        let mut env = project_env(temp.path(), MapVars::new(), MockBackend::new());
        let err = configure_project(&mut env, &project, temp.path(), &[]).unwrap_err();
        assert_eq!(err.to_string(), "Missing C header: zlib.h");
    }

    #[test]
    fn project_tool_paths_are_searched() {
        let temp = TempDir::new().unwrap();
        let tool_dir = temp.path().join("cfg").join("local");
        fs::create_dir_all(&tool_dir).unwrap();
        fs::write(
            tool_dir.join("tool.yml"),
            "name: local\nconfigure:\n  - define: [LOCAL]\n",
        )
        .unwrap();

        let project = parse_project(
            "tool_paths: [cfg]\nconfigure: [local]\n",
            Path::new("confprobe.yml"),
        )
        .unwrap();
        let mut env = project_env(temp.path(), MapVars::new(), MockBackend::new());
        let report = configure_project(&mut env, &project, temp.path(), &[]).unwrap();

        assert_eq!(report.configured, ["local"]);
        assert_eq!(report.settings.list(keys::CPPDEFINES), ["LOCAL"]);
    }

    #[test]
    fn variables_come_from_option_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("options.yml"), "mode: debug\n").unwrap();
        let project = parse_project(
            "variables:\n  - name: mode\n    default: release\n",
            Path::new("confprobe.yml"),
        )
        .unwrap();

        let mut env = project_env(temp.path(), MapVars::new(), MockBackend::new());
        let report = configure_project(&mut env, &project, temp.path(), &[]).unwrap();

        assert_eq!(report.option_files, [temp.path().join("options.yml")]);
        assert_eq!(report.settings.get_text("mode"), Some("debug"));
    }
}
