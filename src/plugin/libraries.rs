use std::process::{Command, Stdio};

use crate::error::{MindError, Result};
use crate::model::config::LibrariesConfig;

/// The environment's package mechanism for third-party libraries.
pub trait LibraryEnvironment {
    fn is_available(&self, library: &str) -> bool;

    fn install(&self, library: &str) -> Result<()>;
}

/// Runs the configured probe/install commands with the library name appended.
#[derive(Debug, Clone)]
pub struct CommandEnvironment {
    probe: Vec<String>,
    install: Vec<String>,
}

impl CommandEnvironment {
    pub fn new(config: &LibrariesConfig) -> Self {
        Self {
            probe: config.probe.clone(),
            install: config.install.clone(),
        }
    }

    fn command(template: &[String], library: &str) -> Option<Command> {
        let (program, args) = template.split_first()?;
        let mut command = Command::new(program);
        command.args(args).arg(library);
        Some(command)
    }
}

impl LibraryEnvironment for CommandEnvironment {
    fn is_available(&self, library: &str) -> bool {
        let Some(mut command) = Self::command(&self.probe, library) else {
            return false;
        };

        command
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn install(&self, library: &str) -> Result<()> {
        let fail = |reason: String| MindError::LibraryInstallFailed {
            library: library.to_string(),
            reason,
        };

        let mut command = Self::command(&self.install, library)
            .ok_or_else(|| fail("no install command configured".to_string()))?;

        tracing::info!("installing library {library}");
        let status = command.status().map_err(|err| fail(err.to_string()))?;
        if !status.success() {
            return Err(fail(format!("installer exited with {status}")));
        }

        Ok(())
    }
}
