pub mod args;
pub mod commands;

pub use args::{BuildArgs, EnvironmentsArgs};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
BUILD COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "devx")]
#[command(version = crate::VERSION)]
#[command(about = "Transform a stack of components into per-environment build artifacts")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: list environments, then build one into the output directory."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Transform the stack for an environment and run its drivers",
        long_about = "Build loads the project, applies the environment's flows to every component in dependency order, checks that every component is concrete, then lets each driver write its files.",
        after_help = "Example:\n    devx build dev --config-dir ./project"
    )]
    Build(BuildArgs),
    #[command(
        about = "List the environments a project declares",
        long_about = "Environments prints every builder under the builders path with its flow count and configured drivers.",
        after_help = "Example:\n    devx environments --config-dir ./project"
    )]
    Environments(EnvironmentsArgs),
}

pub fn run(args: Args) -> crate::Result<()> {
    match args.command {
        Command::Build(build_args) => commands::build(build_args),
        Command::Environments(env_args) => commands::environments(env_args),
    }
}
