use std::path::PathBuf;

use apistub_config::ApistubConfig;
use clap::Parser;

/// Command-line parser for the `apistub` binary.
///
/// Flags override values loaded from `apistub.toml` and `APISTUB_*` variables.
#[derive(Debug, Parser)]
#[command(
    name = "apistub",
    version,
    about = "Parses a Python package and generates a JSON token file for consumption by the APIView tool."
)]
pub struct Cli {
    /// Path to the package source root, WHL, ZIP, or TAR file
    #[arg(long, value_name = "PATH", required_unless_present = "print_schema")]
    pub pkg_path: Option<PathBuf>,

    /// Extract archives under this directory (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    pub temp_path: Option<PathBuf>,

    /// Directory or `.json` file path for the generated token file
    #[arg(long, value_name = "PATH")]
    pub out_path: Option<PathBuf>,

    /// `apiview_mapping_python.json` file supplying cross-language ids
    #[arg(long, value_name = "FILE")]
    pub mapping_path: Option<PathBuf>,

    /// Generate APIView only for this namespace
    #[arg(long, value_name = "NAMESPACE")]
    pub filter_namespace: Option<String>,

    /// URL of the pull request that contains the source
    #[arg(long, value_name = "URL")]
    pub source_url: Option<String>,

    /// Skip running pylint on the package
    #[arg(long)]
    pub skip_pylint: bool,

    /// Also write a markdown rendering next to the JSON file
    #[arg(long)]
    pub md: bool,

    /// Install the package and its extras before parsing
    #[arg(long)]
    pub install: bool,

    /// Python interpreter for pylint, pip and the version probe
    #[arg(long, value_name = "EXE")]
    pub python: Option<String>,

    /// Python version shown in the review header (probed when omitted)
    #[arg(long, value_name = "VERSION")]
    pub python_version: Option<String>,

    /// Config file used instead of `./apistub.toml`
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the JSON schema of the token file and exit
    #[arg(long)]
    pub print_schema: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut ApistubConfig) {
        let package = &mut config.package;
        if let Some(path) = &self.pkg_path {
            package.path = Some(path.clone());
        }
        if let Some(path) = &self.temp_path {
            package.temp_path = Some(path.clone());
        }
        if let Some(path) = &self.mapping_path {
            package.mapping_path = Some(path.clone());
        }
        if let Some(namespace) = &self.filter_namespace {
            package.filter_namespace = Some(namespace.clone());
        }
        if let Some(url) = &self.source_url {
            package.source_url = Some(url.clone());
        }
        if let Some(path) = &self.out_path {
            config.output.out_path = path.clone();
        }
        if let Some(python) = &self.python {
            config.python.executable = python.clone();
        }
        if let Some(version) = &self.python_version {
            config.python.version = Some(version.clone());
        }
        config.output.markdown |= self.md;
        config.linter.skip |= self.skip_pylint;
        config.install.enabled |= self.install;
    }
}
