//! macOS framework detection.

use crate::env::keys;
use crate::error::Result;

use super::backend::{Lang, MAIN_PROGRAM};
use super::context::ProbeContext;
use super::Probe;

/// Check whether `framework` links on macOS.
///
/// The framework is added to `FRAMEWORKS` for the test link and stays there
/// when the link succeeds; on failure the previous value is restored. On any
/// other platform the probe is unsatisfied and the settings are untouched.
pub fn check_osx_framework(ctx: &mut ProbeContext<'_>, framework: &str) -> Result<Probe<()>> {
    if !cfg!(target_os = "macos") {
        tracing::debug!("Skipping framework {} outside macOS", framework);
        return Ok(Probe::Unsatisfied);
    }

    ctx.message(&format!("Checking for framework {}...", framework));

    let saved = ctx.settings().get(keys::FRAMEWORKS).cloned();
    ctx.settings_mut()
        .prepend_unique(keys::FRAMEWORKS, [framework]);

    let backend = ctx.env().backend();
    let found = backend.try_link(&ctx.backend_settings(), MAIN_PROGRAM, Lang::C)?;
    ctx.result(found);

    if !found {
        match saved {
            Some(value) => ctx.settings_mut().set(keys::FRAMEWORKS, value),
            None => {
                ctx.settings_mut().remove(keys::FRAMEWORKS);
            }
        }
    }

    Ok(found.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Environment, MapVars};
    use crate::probe::MockBackend;
    use std::sync::Arc;

    fn test_env(links: bool) -> Environment {
        Environment::new("test")
            .with_vars(MapVars::new())
            .with_backend(Arc::new(MockBackend::new().linking(links)))
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn framework_kept_when_link_succeeds() {
        let mut env = test_env(true);
        let found = check_osx_framework(&mut env.context(), "CoreFoundation").unwrap();
        assert!(found.is_satisfied());
        assert_eq!(env.settings().list(keys::FRAMEWORKS), ["CoreFoundation"]);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn framework_restored_when_link_fails() {
        let mut env = test_env(false);
        env.settings_mut().append(keys::FRAMEWORKS, ["Cocoa"]);

        let found = check_osx_framework(&mut env.context(), "Missing").unwrap();
        assert!(!found.is_satisfied());
        assert_eq!(env.settings().list(keys::FRAMEWORKS), ["Cocoa"]);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn framework_key_removed_when_it_was_unset() {
        let mut env = test_env(false);
        check_osx_framework(&mut env.context(), "Missing").unwrap();
        assert!(env.settings().get(keys::FRAMEWORKS).is_none());
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn framework_unsatisfied_elsewhere() {
        let mut env = test_env(true);
        let found = check_osx_framework(&mut env.context(), "CoreFoundation").unwrap();
        assert!(!found.is_satisfied());
        assert!(env.settings().get(keys::FRAMEWORKS).is_none());
    }
}
