use clap::{Parser, Subcommand};
use mapreduce_framework::app::{handle_fatal_error, init_logging, AppConfig};
use mapreduce_framework::generate::{
    describe_plan, generate, GenerateOptions, PlanFormat, DEFAULT_CONFIG_PATH,
    DEFAULT_OUTPUT_PATH,
};
use std::path::PathBuf;
use tracing::debug;

/// Generate parallel map-reduce kernels from a pipeline description
#[derive(Parser)]
#[command(name = "generate-framework")]
#[command(about = "Generate a parallel map-reduce kernel from a pipeline config", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the kernel source for a pipeline config (default command)
    Generate {
        /// Pipeline config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Output file name
        #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        /// Template to render instead of the built-in kernel skeleton
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Run the result through gofmt
        #[arg(long)]
        gofmt: bool,
    },
    /// Print the planned channel topology without rendering
    Plan {
        /// Pipeline config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = PlanFormat::Json)]
        format: PlanFormat,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let app_config = match AppConfig::new(cli.verbose) {
        Ok(config) => config,
        Err(e) => handle_fatal_error(e, cli.verbose),
    };
    init_logging(&app_config);

    if let Err(e) = run(cli.command, &app_config).await {
        handle_fatal_error(e, app_config.verbose);
    }
}

async fn run(command: Option<Commands>, app_config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Some(Commands::Generate {
            config,
            output,
            template,
            gofmt,
        }) => {
            let options = GenerateOptions {
                config_path: app_config.resolve(&config),
                output_path: app_config.resolve(&output),
                template_path: template.map(|path| app_config.resolve(&path)),
                gofmt,
            };
            run_generate(options).await
        }
        Some(Commands::Plan { config, format }) => {
            let plan = describe_plan(&app_config.resolve(&config), format).await?;
            println!("{}", plan.trim_end());
            Ok(())
        }
        None => {
            // Default to generate with the conventional file names
            let options = GenerateOptions {
                config_path: app_config.resolve(&PathBuf::from(DEFAULT_CONFIG_PATH)),
                output_path: app_config.resolve(&PathBuf::from(DEFAULT_OUTPUT_PATH)),
                ..GenerateOptions::default()
            };
            run_generate(options).await
        }
    }
}

async fn run_generate(options: GenerateOptions) -> anyhow::Result<()> {
    debug!("Generating with {:?}", options);
    let report = generate(&options).await?;
    println!(
        "Generated {} ({} lanes, final channel c{})",
        report.output_path.display(),
        report.topology.lane_count,
        report.topology.last_index
    );
    Ok(())
}
