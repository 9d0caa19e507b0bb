use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, instrument};

use crate::application::Script;
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::config::Settings;
use crate::parser::Command;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };
    let settings = load_settings(cli)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(command, &settings, &mut out)?;
    out.flush().map_err(|e| CliError::io("flush stdout", e))
}

/// Settings from config layers, with `--keys` taking precedence.
pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(kind) = cli.key_kind {
        settings.key_kind = kind;
    }
    debug!("effective settings: {:?}", settings);
    Ok(settings)
}

pub fn run_command<W: Write>(command: &Commands, settings: &Settings, out: &mut W) -> CliResult<()> {
    match command {
        Commands::Build { keys } => _build(settings, keys, out),
        Commands::Stats { keys } => _stats(settings, keys, out),
        Commands::Tree { keys } => _tree(settings, keys, out),
        Commands::Run { script } => _run(settings, script, out),
    }
}

/// Runs `script` on a fresh tree typed by `settings.key_kind`.
fn run_script<W: Write>(settings: &Settings, script: &Script, out: &mut W) -> CliResult<()> {
    debug!("executing {} steps", script.steps().len());
    script.execute(settings, out)?;
    Ok(())
}

fn run_commands<W: Write>(
    settings: &Settings,
    commands: impl IntoIterator<Item = Command>,
    out: &mut W,
) -> CliResult<()> {
    run_script(settings, &Script::from_commands(commands), out)
}

#[instrument(skip(settings, out))]
fn _build<W: Write>(settings: &Settings, keys: &[String], out: &mut W) -> CliResult<()> {
    run_commands(settings, [Command::Insert(keys.to_vec()), Command::Print], out)
}

#[instrument(skip(settings, out))]
fn _stats<W: Write>(settings: &Settings, keys: &[String], out: &mut W) -> CliResult<()> {
    run_commands(
        settings,
        [
            Command::Insert(keys.to_vec()),
            Command::Len,
            Command::Height,
            Command::Min,
            Command::Max,
            Command::Empty,
        ],
        out,
    )
}

#[instrument(skip(settings, out))]
fn _tree<W: Write>(settings: &Settings, keys: &[String], out: &mut W) -> CliResult<()> {
    run_commands(settings, [Command::Insert(keys.to_vec()), Command::Tree], out)
}

#[instrument(skip(settings, out))]
fn _run<W: Write>(settings: &Settings, script: &Path, out: &mut W) -> CliResult<()> {
    run_script(settings, &Script::from_file(script)?, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyKind;

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|k| k.to_string()).collect()
    }

    fn run(command: Commands, settings: &Settings) -> CliResult<String> {
        let mut out = Vec::new();
        run_command(&command, settings, &mut out)?;
        Ok(String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn test_build_prints_sorted_keys() {
        let output = run(
            Commands::Build {
                keys: keys(&["5", "3", "2", "1", "6", "10", "9", "5"]),
            },
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(output, "1 2 3 5 6 9 10\n");
    }

    #[test]
    fn test_stats_for_increasing_keys() {
        let output = run(
            Commands::Stats {
                keys: keys(&["1", "2", "3", "4", "5"]),
            },
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(
            output,
            "len: 5\nheight: 5\nmin: 1\nmax: 5\nempty: false\n"
        );
    }

    #[test]
    fn test_build_with_float_keys() {
        let settings = Settings {
            key_kind: KeyKind::Float,
            ..Settings::default()
        };
        let output = run(
            Commands::Build {
                keys: keys(&["115.0", "5.5", "6", "155.9", "115.62"]),
            },
            &settings,
        )
        .unwrap();
        assert_eq!(output, "5.5 6 115 115.62 155.9\n");
    }

    #[test]
    fn test_tree_renders_shape() {
        let output = run(
            Commands::Tree {
                keys: keys(&["2", "1", "3"]),
            },
            &Settings::default(),
        )
        .unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "2");
        assert!(lines[1].ends_with("L: 1"));
        assert!(lines[2].ends_with("R: 3"));
    }

    #[test]
    fn test_build_with_show_tree_appends_shape() {
        let settings = Settings {
            show_tree: true,
            ..Settings::default()
        };
        let output = run(
            Commands::Build {
                keys: keys(&["2", "1"]),
            },
            &settings,
        )
        .unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "1 2");
        assert_eq!(lines[1], "2");
        assert!(lines[2].ends_with("L: 1"));
    }

    #[test]
    fn test_invalid_int_key_is_data_error() {
        let err = run(
            Commands::Build {
                keys: keys(&["1", "two"]),
            },
            &Settings::default(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn test_run_reports_script_line_of_bad_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bst");
        std::fs::write(&path, "insert 1\n\n# comment\ninsert 2 x\n").unwrap();

        let err = run(Commands::Run { script: path }, &Settings::default()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Application(crate::application::ApplicationError::InvalidKey { line: 4, .. })
        ));
    }

    #[test]
    fn test_missing_script_is_noinput() {
        let err = run(
            Commands::Run {
                script: "does/not/exist.bst".into(),
            },
            &Settings::default(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }
}
