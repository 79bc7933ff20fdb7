use crate::pipeline::{BuildPayload, BuildRequest};
use crate::stack::Stage;
use crate::strategies::OptionMap;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

/// Build Function Compute sources with the toolchain their runtime needs
#[derive(Parser, Debug)]
#[command(
    name = "fc-builders",
    about = "Build Function Compute sources with the toolchain their runtime needs",
    version,
    author,
    long_about = "fc-builders picks a build strategy (npm, pip, Maven, Composer, .NET or a \
                  plain copy) from the function runtime and the manifests found in the source \
                  directory, then runs the requested stages into an artifact directory. An \
                  inline command or a script file can replace detection entirely."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Stream build tool output and enable debug logging"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Build a function",
        long_about = "Detects the build strategy for the runtime and source directory and runs \
                      the requested stages, or runs an inline command / script file instead.\n\n\
                      Examples:\n  \
                      fc-builders build --function hello --runtime nodejs14 --artifact-dir .fc/build/hello\n  \
                      fc-builders build --function hello --runtime custom --artifact-dir out --command 'make dist'\n  \
                      fc-builders build --function hello --runtime python3 --artifact-dir out --option index_url=https://pypi.example/simple"
    )]
    Build(BuildArgs),

    #[command(
        about = "Show which strategy a source directory would be built with",
        long_about = "Runs strategy detection only, without building.\n\n\
                      Examples:\n  \
                      fc-builders detect --runtime custom\n  \
                      fc-builders detect --runtime nodejs14 --source-dir ./code --format json"
    )]
    Detect(DetectArgs),

    #[command(about = "List registered runtimes and their candidate strategies")]
    Runtimes(RuntimesArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(long, value_name = "NAME", default_value = "default", help = "Service name")]
    pub service: String,

    #[arg(long, value_name = "NAME", help = "Function name")]
    pub function: String,

    #[arg(short = 'r', long, value_name = "RUNTIME", help = "Function runtime, e.g. nodejs14")]
    pub runtime: String,

    #[arg(
        short = 's',
        long,
        value_name = "DIR",
        default_value = ".",
        help = "Function source directory"
    )]
    pub source_dir: PathBuf,

    #[arg(short = 'a', long, value_name = "DIR", help = "Where build output is written")]
    pub artifact_dir: PathBuf,

    #[arg(
        long,
        value_name = "STAGES",
        help = "Comma separated stages to run (default: FC_BUILDERS_STAGES or install,build)"
    )]
    pub stages: Option<String>,

    #[arg(
        long,
        value_name = "COMMAND",
        conflicts_with = "script_file",
        help = "Run this shell command in the artifact directory instead of a strategy"
    )]
    pub command: Option<String>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Run this script in the artifact directory instead of a strategy"
    )]
    pub script_file: Option<PathBuf>,

    #[arg(
        short = 'o',
        long = "option",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Strategy option, may be repeated (e.g. registry=https://registry.npmmirror.com)"
    )]
    pub options: Vec<(String, String)>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

impl BuildArgs {
    /// Request for these arguments; `default_stages` applies when `--stages` is absent.
    pub fn to_request(&self, default_stages: &[Stage], verbose: bool) -> BuildRequest {
        let stages = match &self.stages {
            Some(list) => Stage::parse_list(list),
            None => default_stages.to_vec(),
        };

        BuildRequest::new(
            self.service.clone(),
            self.function.clone(),
            self.source_dir.clone(),
            self.runtime.as_str(),
            self.artifact_dir.clone(),
        )
        .with_verbose(verbose)
        .with_stages(stages)
        .with_payload(self.payload())
    }

    fn payload(&self) -> BuildPayload {
        if let Some(command) = self.command.as_ref().filter(|c| !c.trim().is_empty()) {
            return BuildPayload::Command(command.clone());
        }
        if let Some(script) = self
            .script_file
            .as_ref()
            .filter(|s| !s.as_os_str().is_empty())
        {
            return BuildPayload::ScriptFile(script.clone());
        }

        let options: OptionMap = self
            .options
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect();
        BuildPayload::StrategyOptions(options)
    }
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(short = 'r', long, value_name = "RUNTIME", help = "Function runtime")]
    pub runtime: String,

    #[arg(
        short = 's',
        long,
        value_name = "DIR",
        default_value = ".",
        help = "Function source directory"
    )]
    pub source_dir: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct RuntimesArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("Invalid option '{}': expected KEY=VALUE", s)),
    }
}
