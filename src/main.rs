use anyhow::Context;
use autoready::config::{AppConfig, FunctionConfig};
use autoready::{function, telemetry};
use serde_json::Value;
use std::fs;
use std::io::Read;

enum CliCommand {
    Run {
        input: Option<String>,
        config_path: Option<String>,
    },
    Validate {
        configs: Vec<String>,
    },
    Help,
}

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise telemetry")?;

    match parse_cli_args()? {
        CliCommand::Run { input, config_path } => run_command(input, config_path),
        CliCommand::Validate { configs } => validate_command(configs),
        CliCommand::Help => {
            print_help();
            Ok(())
        }
    }
}

fn parse_cli_args() -> anyhow::Result<CliCommand> {
    let mut args = std::env::args().skip(1);
    let Some(first) = args.next() else {
        return Ok(CliCommand::Run {
            input: None,
            config_path: None,
        });
    };

    if first == "validate" {
        return Ok(CliCommand::Validate {
            configs: args.collect(),
        });
    }

    let mut input = None;
    let mut config_path = None;
    let mut pending = Some(first);

    loop {
        let arg = match pending.take() {
            Some(value) => value,
            None => match args.next() {
                Some(value) => value,
                None => break,
            },
        };

        match arg.as_str() {
            "-c" | "--config" => {
                if config_path.is_some() {
                    anyhow::bail!("function config path specified multiple times");
                }
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("expected path after {arg}"))?;
                config_path = Some(value);
            }
            "-i" | "--input" => {
                if input.is_some() {
                    anyhow::bail!("request input path specified multiple times");
                }
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("expected path after {arg}"))?;
                input = Some(value);
            }
            "-h" | "--help" | "help" => return Ok(CliCommand::Help),
            other => anyhow::bail!("unrecognised argument: {other}"),
        }
    }

    Ok(CliCommand::Run { input, config_path })
}

fn run_command(input: Option<String>, config_path: Option<String>) -> anyhow::Result<()> {
    let app = AppConfig::load().context("failed to load configuration")?;
    let config = match config_path.or(app.function_config_path) {
        Some(path) => FunctionConfig::from_path(&path)
            .with_context(|| format!("failed to load function config from {path}"))?,
        None => FunctionConfig::default(),
    };

    let raw = match input {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read request document from {path}"))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read request document from stdin")?;
            buffer
        }
    };

    let request: Value =
        serde_json::from_str(&raw).context("request document is not valid JSON")?;
    let response = function::handle(request, &config).context("function run failed")?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn validate_command(configs: Vec<String>) -> anyhow::Result<()> {
    if configs.is_empty() {
        anyhow::bail!("validate requires at least one function config path");
    }

    let mut failed = false;
    for path in configs {
        match FunctionConfig::from_path(&path) {
            Ok(config) => println!("ok: {path} (policy: {})", config.policy.as_str()),
            Err(err) => {
                failed = true;
                eprintln!("error: {path}: {err}");
            }
        }
    }

    if failed {
        anyhow::bail!("one or more function config files failed validation");
    }
    Ok(())
}

fn print_help() {
    println!("autoready - readiness aggregation for composed resources");
    println!();
    println!("Usage:");
    println!("  autoready [-i <request.json>] [-c <config.yaml>]");
    println!("      Read a request document (stdin by default), evaluate readiness and");
    println!("      print the response document.");
    println!("  autoready validate <config.yaml> [...]");
    println!("      Validate function config files.");
    println!("  autoready help");
    println!();
    println!("Environment:");
    println!("  AUTOREADY__FUNCTION_CONFIG_PATH   default function config path");
    println!("  RUST_LOG                          tracing filter (default autoready=info)");
}
