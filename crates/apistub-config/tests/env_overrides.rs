use apistub_config::ApistubConfig;
use figment::Jail;
use std::path::PathBuf;

#[test]
fn env_vars_override_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "apistub.toml",
            r#"
[linter]
skip = false

[python]
executable = "python3"
"#,
        )?;
        jail.set_env("APISTUB_LINTER__SKIP", "true");
        jail.set_env("APISTUB_PYTHON__EXECUTABLE", "/opt/py/bin/python");

        let config = ApistubConfig::load().expect("config loads");
        assert!(config.linter.skip);
        assert_eq!(config.python.executable, "/opt/py/bin/python");
        Ok(())
    });
}

#[test]
fn env_vars_fill_nested_paths() {
    Jail::expect_with(|jail| {
        jail.set_env("APISTUB_PACKAGE__PATH", "/tmp/azure_fake-1.0.0-py3-none-any.whl");
        jail.set_env("APISTUB_OUTPUT__MARKDOWN", "true");

        let config = ApistubConfig::load().expect("config loads");
        assert_eq!(
            config.package.path,
            Some(PathBuf::from("/tmp/azure_fake-1.0.0-py3-none-any.whl"))
        );
        assert!(config.output.markdown);
        Ok(())
    });
}
