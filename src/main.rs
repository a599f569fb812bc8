mod cli;

use mp3wav::config;
use mp3wav_av::{check_decoder, Converter};
use mp3wav_core::{ConversionRequest, ConversionResult};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use serde_json::json;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mp3wav=trace,mp3wav_av=trace,mp3wav_core=debug".to_string()
        } else {
            "mp3wav=info,mp3wav_av=warn,mp3wav_core=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            postfix,
            params,
            json,
            keep_decoder,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert_files(
                &inputs,
                output,
                postfix,
                &params,
                cli.config.as_deref(),
                json,
                keep_decoder,
            ))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("mp3wav {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn convert_files(
    inputs: &[PathBuf],
    output: Option<PathBuf>,
    postfix: Option<String>,
    params: &[String],
    config_path: Option<&Path>,
    json: bool,
    keep_decoder: bool,
) -> Result<()> {
    if output.is_some() && inputs.len() > 1 {
        anyhow::bail!("--output can only be used with a single input");
    }

    let config = config::load_config_or_default(config_path)?;
    let converter = Converter::from_config(&config);
    let postfix = postfix.unwrap_or_else(|| config.output.postfix.clone());

    let mut failed = 0usize;
    for input in inputs {
        let mut request = ConversionRequest::new(input)
            .parameters(params)
            .output_postfix(postfix.as_str());
        if let Some(ref path) = output {
            request = request.output_path(path);
        }

        let result = converter.run(&request).await;
        if result.is_err() {
            failed += 1;
        }
        print_result(input, &result, json)?;
    }

    if keep_decoder {
        if let Some(path) = converter.keep_decoder().await? {
            tracing::info!("Staged decoder left at {}", path.display());
        }
    } else {
        converter.cleanup().await?;
    }

    if failed > 0 {
        anyhow::bail!("{} of {} conversions failed", failed, inputs.len());
    }

    Ok(())
}

fn print_result(input: &Path, result: &ConversionResult, json: bool) -> Result<()> {
    if json {
        let value = match result {
            Ok(report) => json!({
                "input": input,
                "error": null,
                "report": report,
            }),
            Err(failure) => json!({
                "input": input,
                "error": { "kind": failure.kind(), "message": failure.to_string() },
                "report": failure.report,
            }),
        };
        println!("{}", serde_json::to_string(&value)?);
        return Ok(());
    }

    match result {
        Ok(report) => {
            println!(
                "✓ {} -> {} ({} bytes)",
                input.display(),
                report.output_file.display(),
                report.size
            );
        }
        Err(failure) => {
            println!("✗ {}: {}", input.display(), failure);
            if !failure.report.command_line.is_empty() {
                println!("  command: {}", failure.report.command_line);
            }
            for line in failure.report.stderr.lines() {
                println!("  stderr: {}", line);
            }
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking decoder...\n");

    let info = check_decoder(&config.decoder);
    let status = if info.available { "✓" } else { "✗" };

    print!("{} mpg123", status);
    if let Some(ref version) = info.version {
        print!(" ({})", version);
    }
    println!(" - {}", info.path.display());

    if config.decoder.stage {
        println!(
            "  staged into {} before each run",
            config.decoder.staging_dir().display()
        );
    }

    println!();
    if info.available {
        println!("Decoder is available!");
        Ok(())
    } else {
        anyhow::bail!("Decoder not found. Set decoder.bundled_path or install mpg123.")
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_summary(&config);
            for warning in config.validate() {
                println!("  warning: {}", warning);
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            print_summary(&config);
        }
    }

    Ok(())
}

fn print_summary(config: &config::Config) {
    match config.decoder.bundled_path {
        Some(ref p) => println!("  Decoder: {}", p.display()),
        None => println!("  Decoder: bin/mpg123 next to the executable, then PATH"),
    }
    println!("  Stage decoder: {}", config.decoder.stage);
    println!("  Staging dir: {}", config.decoder.staging_dir().display());
    match config.decoder.timeout_secs {
        Some(secs) => println!("  Timeout: {}s", secs),
        None => println!("  Timeout: none"),
    }
    println!("  Output postfix: {}", config.output.postfix);
    println!("  Output dir: {}", config.output.dir().display());
}
