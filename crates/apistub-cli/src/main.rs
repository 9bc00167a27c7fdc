use anyhow::Context;
use clap::Parser;

use apistub_config::ApistubConfig;
use apistub_core::ApiView;
use apistub_parser::{GenerateOptions, PipInstaller, PylintRunner, PythonRuntime, StubGenerator};

mod cli;
mod output;

fn main() {
    if let Err(error) = run() {
        eprintln!("apistub error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    if cli.print_schema {
        println!("{}", output::schema_json()?);
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => ApistubConfig::load_from(path),
        None => ApistubConfig::load(),
    }
    .context("failed to load configuration")?;
    cli.apply(&mut config);
    config.validate()?;

    let view = generate(&config)?;
    for path in output::write(&view, &config.output)? {
        tracing::info!(path = %path.display(), "wrote output");
    }
    Ok(())
}

fn generate(config: &ApistubConfig) -> anyhow::Result<ApiView> {
    let package_path = config
        .package
        .path
        .clone()
        .context("no package path given")?;
    let runtime = PythonRuntime::new(config.python.executable.as_str());
    let python_version = config.python.version.clone().or_else(|| {
        runtime
            .version()
            .inspect_err(|error| tracing::warn!(%error, "could not probe the python version"))
            .ok()
    });

    let options = GenerateOptions {
        package_path: package_path.clone(),
        temp_path: config.package.temp_path.clone(),
        mapping_path: config.package.mapping_path.clone(),
        filter_namespace: config.package.filter_namespace.clone(),
        source_url: config.package.source_url.clone(),
        python_version,
        install: config.install.enabled,
        skip_lint: config.linter.skip,
    };
    let linter =
        PylintRunner::new(runtime.executable()).with_extra_args(config.linter.extra_args.clone());
    StubGenerator::new(options)
        .with_linter(Box::new(linter))
        .with_installer(Box::new(PipInstaller::new(runtime)))
        .generate()
        .with_context(|| format!("failed to generate API view for {}", package_path.display()))
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("APISTUB_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
