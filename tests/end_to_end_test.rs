//! End-to-end configuration of a tool that needs `DEMO_HOME`.

use confprobe::config::parse_project;
use confprobe::configure::configure_project;
use confprobe::env::{keys, Environment, MapVars};
use confprobe::probe::{Args, MockBackend};
use confprobe::tools::ToolLoader;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const DEMO_TOOL: &str = "name: demo\nconfigure:\n  - require_home: demo\n";

struct Fixture {
    temp: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let tool_dir = temp.path().join("tools").join("demo");
        fs::create_dir_all(&tool_dir).unwrap();
        fs::write(tool_dir.join("tool.yml"), DEMO_TOOL).unwrap();
        Self { temp }
    }

    fn tools(&self) -> PathBuf {
        self.temp.path().join("tools")
    }

    /// A `DEMO_HOME` whose `include` directory exists.
    fn demo_home(&self) -> String {
        let home = self.temp.path().join("opt").join("demo");
        fs::create_dir_all(home.join("include")).unwrap();
        home.display().to_string()
    }

    fn env(&self, vars: MapVars) -> Environment {
        Environment::new("e2e")
            .with_vars(vars)
            .with_backend(Arc::new(MockBackend::new()))
            .with_loader(ToolLoader::new(self.temp.path()).with_engine_dir(None))
    }
}

#[test]
fn unset_home_aborts_required_configuration() {
    let fixture = Fixture::new();
    let mut env = fixture.env(MapVars::new());
    env.load_tool_from("demo", &[fixture.tools()]).unwrap();

    let err = env.run_config("demo", true, &Args::new()).unwrap_err();
    assert!(err.to_string().contains("DEMO_HOME"), "{}", err);
    assert!(env.settings().list(keys::CPPPATH).is_empty());
    assert!(!env.is_enabled("demo"));
}

#[test]
fn unset_home_is_skipped_when_optional() {
    let fixture = Fixture::new();
    let mut env = fixture.env(MapVars::new());
    env.load_tool_from("demo", &[fixture.tools()]).unwrap();

    assert!(!env.run_config("demo", false, &Args::new()).unwrap());
    assert!(env.messages()[0].contains("DEMO_HOME"));
}

#[test]
fn home_include_directory_is_added_once() {
    let fixture = Fixture::new();
    let home = fixture.demo_home();
    let include = format!("{}/include", home);

    let mut env = fixture.env(MapVars::new().with("DEMO_HOME", home.as_str()));
    env.settings_mut().append(keys::CPPPATH, [include.clone()]);
    env.load_tool_from("demo", &[fixture.tools()]).unwrap();

    assert!(env.run_config("demo", true, &Args::new()).unwrap());
    assert!(env.run_config("demo", true, &Args::new()).unwrap());

    let cpppath = env.settings().list(keys::CPPPATH);
    assert_eq!(cpppath.iter().filter(|p| **p == include).count(), 1);
    assert!(env.is_enabled("demo"));
}

#[test]
fn include_override_wins_over_home() {
    let fixture = Fixture::new();
    let home = fixture.demo_home();
    let custom = fixture.temp.path().join("custom-include");
    fs::create_dir_all(&custom).unwrap();

    let vars = MapVars::new()
        .with("DEMO_HOME", home.as_str())
        .with("DEMO_INCLUDE", custom.display().to_string());
    let mut env = fixture.env(vars);
    env.load_tool_from("demo", &[fixture.tools()]).unwrap();

    assert!(env.run_config("demo", true, &Args::new()).unwrap());
    assert_eq!(
        env.settings().list(keys::CPPPATH),
        [custom.display().to_string()]
    );
}

#[test]
fn include_override_makes_home_optional() {
    let fixture = Fixture::new();
    let custom = fixture.temp.path().join("custom-include");
    fs::create_dir_all(&custom).unwrap();

    let vars = MapVars::new().with("DEMO_INCLUDE", custom.display().to_string());
    let mut env = fixture.env(vars);
    env.load_tool_from("demo", &[fixture.tools()]).unwrap();

    assert!(env.run_config("demo", true, &Args::new()).unwrap());
}

#[test]
fn project_file_drives_the_same_scenario() {
    let fixture = Fixture::new();
    let home = fixture.demo_home();
    let root = fixture.temp.path();
    let project = parse_project(
        "name: e2e\ntool_paths: [tools]\nconfigure: [demo]\nconfig_defs: [HAVE_DEMO]\nconfig_header: config.h\n",
        Path::new("confprobe.yml"),
    )
    .unwrap();

    let mut env = fixture.env(MapVars::new().with("DEMO_HOME", home.as_str()));
    let report = configure_project(&mut env, &project, root, &[]).unwrap();

    assert_eq!(report.configured, ["demo"]);
    assert_eq!(
        report.settings.list(keys::CPPPATH),
        [format!("{}/include", home)]
    );
    insta::assert_snapshot!(fs::read_to_string(root.join("config.h")).unwrap(), @r"
    // Autogenerated file
    #pragma once

    #define HAVE_DEMO
    ");
}
