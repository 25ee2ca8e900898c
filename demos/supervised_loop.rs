use clap::Parser;
use process_control::{
    load_config, Controller, ControllerAware, NullController, SignalSpec, TracingLogger,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A toy worker loop that checks its controller once per iteration.
///
/// Try `kill -TSTP <pid>` / `kill -CONT <pid>` to pause and resume,
/// `kill <pid>` or `touch STOP` to stop.
#[derive(Parser, Debug)]
#[command(name = "supervised-loop", version, about)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "control.toml")]
    config: PathBuf,

    /// Stop after this many iterations
    #[arg(short = 'n', long, default_value_t = 100)]
    max_iterations: u32,

    /// Milliseconds of simulated work per iteration
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    /// Extra stop signals (name or number, overrides config)
    #[arg(long = "stop")]
    stop: Vec<SignalSpec>,

    /// Validate config and print resolved settings, don't run
    #[arg(long)]
    dry_run: bool,
}

struct Worker {
    controller: Arc<dyn Controller>,
    interval: Duration,
}

impl Worker {
    fn new(interval: Duration) -> Self {
        Self {
            controller: Arc::new(NullController),
            interval,
        }
    }

    fn run(&self, max_iterations: u32) -> u32 {
        let mut completed = 0;
        while completed < max_iterations {
            if self.controller.should_stop() {
                tracing::info!(completed, "stop requested, leaving loop");
                break;
            }
            if self.controller.should_pause() {
                tracing::debug!("paused");
                std::thread::sleep(Duration::from_millis(200));
                continue;
            }
            std::thread::sleep(self.interval);
            completed += 1;
            tracing::info!(iteration = completed, "iteration complete");
        }
        completed
    }
}

impl ControllerAware for Worker {
    fn set_controller(&mut self, controller: Arc<dyn Controller>) {
        self.controller = controller;
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let mut config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if !cli.stop.is_empty() {
        config.signals.stop = cli.stop.clone();
    }

    if cli.dry_run {
        println!("{config:#?}");
        return;
    }

    let controller = match config.build_controller(Arc::new(TracingLogger)) {
        Ok(chain) => chain,
        Err(e) => {
            eprintln!("invalid controller configuration: {e}");
            std::process::exit(1);
        }
    };

    let mut worker = Worker::new(Duration::from_millis(cli.interval_ms));
    worker.set_controller(Arc::new(controller));

    tracing::info!(pid = std::process::id(), "worker loop starting");
    let completed = worker.run(cli.max_iterations);
    tracing::info!(completed, "worker loop finished");
}
