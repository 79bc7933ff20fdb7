use fc_builders::cli::commands::{BuildArgs, CliArgs, Commands, DetectArgs, RuntimesArgs};
use fc_builders::cli::output::{
    runtime_reports, BuildReport, DetectionReport, FailureReport, OutputFormat, OutputFormatter,
};
use fc_builders::cli::{EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE};
use fc_builders::util::logging::{init_logging, parse_level, LoggingConfig};
use fc_builders::{
    BuildOrchestrator, BuilderConfig, CommandExecutor, LoggingHandler, ManifestDetector,
    RuntimeId, StrategyDetector, StrategyRegistry, NAME, VERSION,
};

use clap::Parser;
use std::process;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let config = BuilderConfig::default();
    init_logging_from_args(&args, &config);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your FC_BUILDERS_* environment variables.");
        process::exit(EXIT_USAGE);
    }

    let exit_code = match &args.command {
        Commands::Build(build_args) => {
            handle_build(build_args, &config, args.quiet, args.verbose).await
        }
        Commands::Detect(detect_args) => handle_detect(detect_args, &config, args.quiet),
        Commands::Runtimes(runtimes_args) => handle_runtimes(runtimes_args, &config),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs, config: &BuilderConfig) {
    let mut logging = LoggingConfig::from_builder_config(config);
    logging.level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        logging.level
    };
    init_logging(logging);
}

fn load_registry(config: &BuilderConfig) -> Result<StrategyRegistry, i32> {
    config.load_registry().map_err(|e| {
        error!("Configuration error: {}", e);
        EXIT_USAGE
    })
}

fn print(formatter: &OutputFormatter, rendered: anyhow::Result<String>) -> i32 {
    match rendered {
        Ok(text) => {
            if formatter.format() == OutputFormat::Human {
                print!("{}", text);
            } else {
                println!("{}", text);
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            EXIT_FAILURE
        }
    }
}

async fn handle_build(args: &BuildArgs, config: &BuilderConfig, quiet: bool, verbose: bool) -> i32 {
    let registry = match load_registry(config) {
        Ok(registry) => registry,
        Err(code) => return code,
    };

    let executor: Arc<dyn CommandExecutor> = Arc::new(config.executor());
    let mut orchestrator = BuildOrchestrator::from_registry(Arc::new(registry), executor);
    if !quiet {
        orchestrator = orchestrator.with_progress(Arc::new(LoggingHandler));
    }

    let request = args.to_request(&config.stages, verbose);
    let formatter = OutputFormatter::new(args.format.into());
    let start = Instant::now();

    match orchestrator.build(&request).await {
        Ok(outcome) => {
            info!(function = %request.function_name, "Build succeeded");
            if quiet && formatter.format() == OutputFormat::Human {
                return EXIT_SUCCESS;
            }
            let report = BuildReport::new(&request, outcome, start.elapsed());
            print(&formatter, formatter.format_build(&report))
        }
        Err(e) => {
            error!(phase = ?e.phase(), "{}", e);
            let report = FailureReport::new(&request, &e);
            match formatter.format_failure(&report) {
                Ok(text) if formatter.format() == OutputFormat::Human => eprint!("{}", text),
                Ok(text) => println!("{}", text),
                Err(err) => error!("Failed to format output: {:#}", err),
            }
            EXIT_FAILURE
        }
    }
}

fn handle_detect(args: &DetectArgs, config: &BuilderConfig, quiet: bool) -> i32 {
    let registry = match load_registry(config) {
        Ok(registry) => Arc::new(registry),
        Err(code) => return code,
    };

    let runtime = RuntimeId::from(args.runtime.as_str());
    let detector = ManifestDetector::new(Arc::clone(&registry));

    let strategy = match detector.detect(&runtime, &args.source_dir) {
        Ok(strategy) => strategy,
        Err(e) => {
            error!("Detection failed: {}", e);
            return EXIT_FAILURE;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    if quiet && formatter.format() == OutputFormat::Human {
        println!("{}", strategy);
        return EXIT_SUCCESS;
    }

    let report = DetectionReport::new(&registry, &runtime, &args.source_dir, strategy);
    print(&formatter, formatter.format_detection(&report))
}

fn handle_runtimes(args: &RuntimesArgs, config: &BuilderConfig) -> i32 {
    let registry = match load_registry(config) {
        Ok(registry) => registry,
        Err(code) => return code,
    };

    let formatter = OutputFormatter::new(args.format.into());
    print(&formatter, formatter.format_runtimes(&runtime_reports(&registry)))
}
