use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Environment to build, as named under the builders path
    #[arg(value_name = "ENVIRONMENT")]
    pub environment: String,

    /// Project directory holding devx.toml and the YAML/JSON sources (default: current directory)
    #[arg(long, value_name = "DIR", help_heading = "Configuration")]
    pub config_dir: Option<PathBuf>,

    /// Value path of the stack definition (default: stack)
    #[arg(long, value_name = "PATH", help_heading = "Configuration")]
    pub stack_path: Option<String>,

    /// Value path of the environment builders (default: builders)
    #[arg(long, value_name = "PATH", help_heading = "Configuration")]
    pub builders_path: Option<String>,

    /// Directory drivers write into (default: build, relative to the project directory)
    #[arg(long, value_name = "DIR", help_heading = "Output Options")]
    pub output_dir: Option<PathBuf>,

    /// Disable the terminal progress bar
    #[arg(long, help_heading = "Output Options")]
    pub no_progress: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EnvironmentsArgs {
    /// Project directory holding devx.toml and the YAML/JSON sources (default: current directory)
    #[arg(long, value_name = "DIR", help_heading = "Configuration")]
    pub config_dir: Option<PathBuf>,

    /// Value path of the environment builders (default: builders)
    #[arg(long, value_name = "PATH", help_heading = "Configuration")]
    pub builders_path: Option<String>,
}
