//! riotfmt: decode, print and re-encode BIN documents and WAD archives.

use std::io;
use std::process;

use clap::Parser;
use riot_cli::logging::{init_logging, LogConfig, LogFormat};
use riot_cli::{run, Mode, RunOptions};
use tracing::info;

mod cli;

use crate::cli::{Cli, LogFormatArg, ModeArg};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        process::exit(1);
    }

    let options = RunOptions {
        mode: match cli.mode {
            ModeArg::Wad => Mode::Wad,
            ModeArg::Inibin => Mode::Inibin,
        },
        src: cli.src,
        dst: cli.dst,
        print: !cli.no_print,
        verify: cli.verify,
    };

    let stdout = io::stdout();
    let exit_code = match run(&options, &mut stdout.lock()) {
        Ok(report) => {
            info!(
                input = report.input_len,
                output = report.output_len,
                verified = report.verified,
                "done"
            );
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    process::exit(exit_code);
}

/// Explicit -v/-q flags take precedence over RUST_LOG.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    LogConfig {
        use_env_filter: !cli.verbosity.is_present(),
        ..LogConfig::default()
    }
    .with_level_filter(cli.verbosity.tracing_level_filter())
    .with_format(format)
}
