mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{debug, info};
use microgame_core::kernel::constants;
use microgame_core::stage_manager::parse_stages;
use microgame_core::storage::ConfigFormat;
use microgame_core::{Application, HostEngine, KernelError, PlayReport, RuntimeConfig, Stage};

/// Microgame: plays transition stage sequences on a headless engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (.json, .yaml, .yml or .toml). Defaults to
    /// `microgame.toml` in the working directory when present.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the stage kinds a sequence can contain
    Stages,
    /// Play a stage sequence and print its lifecycle events
    Play {
        /// Stage names, in order
        #[arg(required = true, num_args = 1..)]
        stages: Vec<String>,

        /// Transition to trigger
        #[arg(short, long, default_value = constants::DEFAULT_TRANSITION)]
        transition: String,

        /// Give up after this many frames
        #[arg(long)]
        max_frames: Option<u64>,

        /// Pace frames at the configured frame rate instead of running flat out
        #[arg(long)]
        realtime: bool,
    },
    /// Print the effective configuration
    Config {
        /// Output format: json, yaml or toml
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env = env_logger::Env::default().default_filter_or(level);
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        eprintln!("Failed to initialize env_logger: {}", e);
    }
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig, KernelError> {
    match path {
        Some(path) => Ok(RuntimeConfig::load(path)?),
        None => {
            let fallback = Path::new(constants::DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                info!("Using {}", fallback.display());
                Ok(RuntimeConfig::load(fallback)?)
            } else {
                debug!("No config file, using defaults");
                Ok(RuntimeConfig::default())
            }
        }
    }
}

async fn play_realtime(app: &mut Application, transition: &str, stages: &[Stage]) -> Result<PlayReport, KernelError> {
    let recorder = app.start(transition, stages)?;
    let started_at = app.engine().time();
    let mut interval = tokio::time::interval(Duration::from_secs_f32(app.config().engine.frame_time()));
    let mut events = Vec::new();
    let mut frames = 0;

    loop {
        for event in recorder.drain() {
            println!("{}", cli::event_line(frames, &event));
            events.push(event);
        }
        if recorder.is_finished() {
            break;
        }
        if frames >= app.config().engine.max_frames {
            return Err(KernelError::RunStalled {
                transition: transition.to_string(),
                frames,
                stage: app.transition(transition)?.controller().current_stage(),
            });
        }
        interval.tick().await;
        app.step();
        frames += 1;
    }

    Ok(PlayReport {
        frames,
        elapsed: app.engine().time() - started_at,
        events,
    })
}

async fn run(args: CliArgs) -> Result<(), KernelError> {
    let Some(command) = args.command else {
        println!("{} v{}", constants::APP_NAME, constants::APP_VERSION);
        println!("No command specified, try `play prep win` or `--help`.");
        return Ok(());
    };

    match command {
        Commands::Stages => {
            for stage in Stage::ALL {
                println!("{}", cli::stage_line(stage));
            }
        }
        Commands::Config { format } => {
            let format = ConfigFormat::from_name(&format)
                .ok_or_else(|| KernelError::Other(format!("Unsupported config format '{}'", format)))?;
            let config = load_config(args.config.as_deref())?;
            print!("{}", config.serialize(format)?);
        }
        Commands::Play {
            stages,
            transition,
            max_frames,
            realtime,
        } => {
            let stages = parse_stages(&stages)?;
            let mut config = load_config(args.config.as_deref())?;
            if let Some(max_frames) = max_frames {
                config.engine.max_frames = max_frames;
            }
            let mut app = Application::new(config)?;

            let report = if realtime {
                play_realtime(&mut app, &transition, &stages).await?
            } else {
                app.play(&transition, &stages, |frame, event| {
                    println!("{}", cli::event_line(frame, &event));
                })?
            };
            for line in cli::summary_lines(&transition, &report, &app.session().snapshot()) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Handle simple ping command
    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
