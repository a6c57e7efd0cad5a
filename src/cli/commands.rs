use crate::cli::args::{BuildArgs, EnvironmentsArgs};
use crate::core::client::{self, BuildRequest};
use crate::core::config::{ConfigLoader, ConfigValidator, DevxConfig};
use crate::core::progress::{NoopProgress, ProgressReporter, TerminalProgress};
use crate::Result;
use anyhow::Context;
use std::env;
use std::path::{Path, PathBuf};

pub fn build(args: BuildArgs) -> Result<()> {
    let config_dir = resolve_config_dir(args.config_dir.as_deref())?;
    let mut config = ConfigLoader::load_from_dir(&config_dir)?;
    if let Some(stack_path) = args.stack_path {
        config.project.stack_path = stack_path;
    }
    if let Some(builders_path) = args.builders_path {
        config.project.builders_path = builders_path;
    }
    if let Some(output_dir) = args.output_dir {
        config.output.dir = output_dir;
    }
    ConfigValidator::validate(&config)?;

    println!(
        "Transforming stack for the {} environment...",
        args.environment
    );

    let request = BuildRequest {
        environment: args.environment,
        config_dir,
        config,
    };
    let mut progress: Box<dyn ProgressReporter> = if args.no_progress {
        Box::new(NoopProgress)
    } else {
        Box::new(TerminalProgress::new())
    };
    let summary = client::run(&request, progress.as_mut())?;

    println!(
        "Built {} components for {}: {}",
        summary.components.len(),
        summary.environment,
        summary.components.join(", ")
    );
    for file in summary.files() {
        println!("  wrote {}", file.display());
    }
    Ok(())
}

pub fn environments(args: EnvironmentsArgs) -> Result<()> {
    let config_dir = resolve_config_dir(args.config_dir.as_deref())?;
    let mut config: DevxConfig = ConfigLoader::load_from_dir(&config_dir)?;
    if let Some(builders_path) = args.builders_path {
        config.project.builders_path = builders_path;
    }
    ConfigValidator::validate(&config)?;

    let environments = client::list_environments(&config_dir, &config)?;
    if environments.is_empty() {
        println!("No environments declared under {}", config.project.builders_path);
        return Ok(());
    }
    for environment in environments {
        let drivers = if environment.drivers.is_empty() {
            "-".to_string()
        } else {
            environment.drivers.join(", ")
        };
        println!(
            "{}\tflows: {}\tdrivers: {}",
            environment.name, environment.flows, drivers
        );
    }
    Ok(())
}

fn resolve_config_dir(configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(dir) => Ok(dir.to_path_buf()),
        None => env::current_dir().context("failed to resolve current directory"),
    }
}
