//! Integration tests for tool loading.

use confprobe::env::{Environment, MapVars};
use confprobe::probe::{Args, MockBackend};
use confprobe::tools::{Tool, ToolFactory, ToolLoader};
use confprobe::{ConfprobeError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn env_with(loader: ToolLoader, vars: MapVars) -> Environment {
    Environment::new("test")
        .with_vars(vars)
        .with_backend(Arc::new(MockBackend::new()))
        .with_loader(loader)
}

fn write_tool(dir: &Path, name: &str, body: &str) {
    let tool_dir = dir.join(name);
    fs::create_dir_all(&tool_dir).unwrap();
    fs::write(tool_dir.join("tool.yml"), format!("name: {}\n{}", name, body)).unwrap();
}

/// A code-defined tool that counts how often it is generated.
#[derive(Debug)]
struct CountedTool {
    generated: Arc<AtomicUsize>,
}

impl Tool for CountedTool {
    fn name(&self) -> &str {
        "counted"
    }

    fn generate(&self, env: &mut Environment) -> Result<()> {
        self.generated.fetch_add(1, Ordering::SeqCst);
        env.add_config_method("counted", |_, _| Ok(true));
        Ok(())
    }
}

#[derive(Debug)]
struct CountedFactory {
    generated: Arc<AtomicUsize>,
}

impl ToolFactory for CountedFactory {
    fn locate(&self, name: &str, _dir: &Path) -> Result<Option<Box<dyn Tool>>> {
        if name != "counted" {
            return Ok(None);
        }
        Ok(Some(Box::new(CountedTool {
            generated: Arc::clone(&self.generated),
        })))
    }
}

#[test]
fn loading_twice_generates_once() {
    let generated = Arc::new(AtomicUsize::new(0));
    let loader = ToolLoader::empty("/project").with_factory(CountedFactory {
        generated: Arc::clone(&generated),
    });
    let mut env = env_with(loader, MapVars::new());

    assert!(env.load_tool("counted").unwrap());
    assert!(env.load_tool("counted").unwrap());
    assert_eq!(generated.load(Ordering::SeqCst), 1);
    assert!(env.run_config("counted", true, &Args::new()).unwrap());
}

#[test]
fn explicit_paths_beat_project_config() {
    let temp = TempDir::new().unwrap();
    let explicit = temp.path().join("explicit");
    write_tool(&explicit, "demo", "configure:\n  - define: [FROM_EXPLICIT]\n");
    write_tool(
        &temp.path().join("config"),
        "demo",
        "configure:\n  - define: [FROM_PROJECT]\n",
    );

    let loader = ToolLoader::new(temp.path()).with_engine_dir(None);
    let mut env = env_with(loader, MapVars::new());
    env.load_tool_from("demo", &[explicit]).unwrap();
    env.run_config("demo", true, &Args::new()).unwrap();

    assert_eq!(
        env.settings().list(confprobe::env::keys::CPPDEFINES),
        ["FROM_EXPLICIT"]
    );
}

#[test]
fn home_variable_adds_a_search_directory() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("demo-home");
    write_tool(&home.join("config"), "demo", "configure: []\n");

    let loader = ToolLoader::new(temp.path().join("project")).with_engine_dir(None);
    let vars = MapVars::new().with("DEMO_HOME", home.display().to_string());
    let mut env = env_with(loader, vars);

    assert!(env.load_tool("demo").unwrap());
    assert!(env.has_config_method("demo"));
}

#[test]
fn unresolvable_tool_lists_every_candidate() {
    let temp = TempDir::new().unwrap();
    let explicit = temp.path().join("extra");
    let loader = ToolLoader::new(temp.path()).with_engine_dir(None);
    let mut env = env_with(loader, MapVars::new());

    let err = env.load_tool_from("missing", &[explicit.clone()]).unwrap_err();
    match &err {
        ConfprobeError::ToolResolution {
            searched, hint, ..
        } => {
            assert_eq!(*searched, vec![explicit, temp.path().join("config")]);
            assert_eq!(hint.as_deref(), Some("Have you set MISSING_HOME?"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().contains("Have you set MISSING_HOME?"));
    assert!(!env.is_loaded("missing"));
}

#[test]
fn hint_is_omitted_when_home_is_set() {
    let temp = TempDir::new().unwrap();
    let loader = ToolLoader::new(temp.path()).with_engine_dir(None);
    let vars = MapVars::new().with("MISSING_HOME", "/nowhere");
    let mut env = env_with(loader, vars);

    match env.load_tool("missing").unwrap_err() {
        ConfprobeError::ToolResolution { searched, hint, .. } => {
            assert!(hint.is_none());
            assert!(searched.contains(&PathBuf::from("/nowhere/config")));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn sub_tools_resolve_next_to_their_parent() {
    let temp = TempDir::new().unwrap();
    let vendor = temp.path().join("vendor");
    write_tool(&vendor, "parent", "tools: [child]\n");
    write_tool(&vendor, "child", "configure:\n  - define: [CHILD]\n");

    let loader = ToolLoader::new(temp.path()).with_engine_dir(None);
    let mut env = env_with(loader, MapVars::new());
    env.load_tool_from("parent", &[vendor]).unwrap();

    assert!(env.is_loaded("parent"));
    assert!(env.is_loaded("child"));
    assert!(env.search_paths().is_empty());
}

#[test]
fn builtin_tools_need_no_search_path() {
    let temp = TempDir::new().unwrap();
    let loader = ToolLoader::new(temp.path()).with_engine_dir(None);
    let mut env = env_with(loader, MapVars::new());

    env.load_tools(&["zlib pthread"], &[]).unwrap();
    assert!(env.has_config_method("zlib"));
    assert!(env.has_config_method("pthread"));
}
