//! The Python interpreter used for installs, linting and the version probe.

use std::path::Path;
use std::process::Command;

use crate::ParserError;

const VERSION_PROBE: &str = "import sys; print('.'.join(map(str, sys.version_info[:3])))";

/// A Python interpreter reachable as `executable`.
#[derive(Debug, Clone)]
pub struct PythonRuntime {
    executable: String,
}

impl PythonRuntime {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// `major.minor.micro` of the interpreter.
    pub fn version(&self) -> Result<String, ParserError> {
        let output = Command::new(&self.executable)
            .args(["-c", VERSION_PROBE])
            .output()?;
        if !output.status.success() {
            return Err(ParserError::Io(std::io::Error::other(format!(
                "{} exited with {}",
                self.executable, output.status
            ))));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Installs a package into the interpreter's environment.
pub trait Installer {
    fn install(&self, package_path: &Path, extras: &[String]) -> Result<(), ParserError>;
}

/// `python -m pip install PATH[extra1,extra2]`
#[derive(Debug, Clone)]
pub struct PipInstaller {
    runtime: PythonRuntime,
}

impl PipInstaller {
    #[must_use]
    pub const fn new(runtime: PythonRuntime) -> Self {
        Self { runtime }
    }
}

/// Requirement spec for `pip install`.
#[must_use]
pub fn install_target(package_path: &Path, extras: &[String]) -> String {
    let path = package_path.display();
    if extras.is_empty() {
        path.to_string()
    } else {
        format!("{path}[{}]", extras.join(","))
    }
}

impl Installer for PipInstaller {
    fn install(&self, package_path: &Path, extras: &[String]) -> Result<(), ParserError> {
        let target = install_target(package_path, extras);
        tracing::info!(target, "installing package");
        let output = Command::new(self.runtime.executable())
            .args(["-m", "pip", "install", &target])
            .output()
            .map_err(|e| ParserError::Install(format!("{}: {e}", self.runtime.executable())))?;
        if !output.status.success() {
            return Err(ParserError::Install(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}
