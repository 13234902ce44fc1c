//! Occupancy Dashboard CLI
//!
//! Terminal front end for the live and history views:
//! - Live counter, badge and trend chart, refreshed on timers
//! - Day-by-day history browsing from stdin
//! - Default config generation

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use occupancy_dashboard::{
    ChartRenderer, ChartStyle, Clock, Config, HistoryController, HistoryPanel, HttpDataSource,
    LiveController, LivePanel, LoggingConfig, RefreshOutcome, SvgChartRenderer, SystemClock,
    TerminalChartRenderer,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "occupancy-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live occupancy counter and hourly history for a monitored area")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overriding the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the live view until Ctrl-C
    Live {
        /// Refresh each channel once and exit
        #[arg(long)]
        once: bool,
        /// Write the trend chart to live.svg instead of the terminal
        #[arg(long)]
        svg: bool,
    },

    /// Browse hourly averages day by day (p = previous, n = next, q = quit)
    History {
        /// Day to open (YYYY-MM-DD, default: yesterday)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Load the day and exit
        #[arg(long)]
        once: bool,
        /// Write the chart to history.svg instead of the terminal
        #[arg(long)]
        svg: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = occupancy_dashboard::config::generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing config to {:?}", path))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = cli.base_url {
        config.backend.base_url = url;
    }
    config.validate()?;

    init_logging(&config.logging)?;
    tracing::info!("Occupancy Dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Backend: {}", config.backend.base_url);

    let source = Arc::new(HttpDataSource::new(config.backend.source_config())?);
    let (width, height) = (config.chart.width, config.chart.height);

    match cli.command {
        Commands::Live { once, svg } => {
            let style = ChartStyle::live(width, height);
            if svg {
                let path = config.chart.output_dir.join("live.svg");
                tracing::info!("Writing trend chart to {:?}", path);
                run_live(&config, source, SvgChartRenderer::new(path, style), once).await
            } else {
                let renderer = TerminalChartRenderer::new(std::io::stdout(), style);
                run_live(&config, source, renderer, once).await
            }
        }
        Commands::History { date, once, svg } => {
            let style = ChartStyle::history(width, height);
            if svg {
                let path = config.chart.output_dir.join("history.svg");
                tracing::info!("Writing history chart to {:?}", path);
                run_history(source, SvgChartRenderer::new(path, style), date, once).await
            } else {
                let renderer = TerminalChartRenderer::new(std::io::stdout(), style);
                run_history(source, renderer, date, once).await
            }
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("occupancy_dashboard={}", config.level)));

    let writer = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?;
            BoxMakeWriter::new(Arc::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let ansi = config.file.is_none();

    let registry = tracing_subscriber::registry().with(filter);
    match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init(),
        _ => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .init(),
    }

    Ok(())
}

async fn run_live<R>(
    config: &Config,
    source: Arc<HttpDataSource>,
    renderer: R,
    once: bool,
) -> anyhow::Result<()>
where
    R: ChartRenderer + 'static,
{
    let live = Arc::new(LiveController::new(
        source,
        renderer,
        Arc::new(SystemClock),
        config.live.settings(),
    ));

    if once {
        live.refresh_once().await;
        println!("{}", live_line(&live.panel()));
        return Ok(());
    }

    let mut updates = live.subscribe();
    let polling = Arc::clone(&live).start();
    let mut last_line = String::new();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = live_line(&updates.borrow_and_update());
                // Trend-only updates leave the counter line unchanged
                if line != last_line {
                    println!("{}", line);
                    last_line = line;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down live view");
                break;
            }
        }
    }

    polling.stop();
    Ok(())
}

fn live_line(panel: &LivePanel) -> String {
    match panel.count {
        Some(count) => format!(
            "{}  {} present  (updated {})",
            panel.badge(),
            count,
            panel.last_updated.as_deref().unwrap_or("-")
        ),
        None => panel.badge().to_string(),
    }
}

async fn run_history<R>(
    source: Arc<HttpDataSource>,
    renderer: R,
    date: Option<NaiveDate>,
    once: bool,
) -> anyhow::Result<()>
where
    R: ChartRenderer + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let history = Arc::new(match date {
        Some(date) => HistoryController::starting_at(source, renderer, clock, date),
        None => HistoryController::new(source, renderer, clock),
    });

    history.reload().await;
    print_history(&history.panel());
    if once {
        return Ok(());
    }

    println!("Commands: p = previous day, n = next day, q = quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match line.trim() {
            "p" => {
                let history = Arc::clone(&history);
                tokio::spawn(async move {
                    let outcome = history.prev_day().await;
                    if outcome != RefreshOutcome::Stale {
                        print_history(&history.panel());
                    }
                });
            }
            "n" => {
                let history = Arc::clone(&history);
                tokio::spawn(async move {
                    match history.next_day().await {
                        Some(RefreshOutcome::Stale) => {}
                        Some(_) => print_history(&history.panel()),
                        None => println!("Already showing today"),
                    }
                });
            }
            "q" => break,
            "" => {}
            other => println!("Unknown command {:?} (p, n or q)", other),
        }
    }

    tracing::info!("Shutting down history view");
    Ok(())
}

fn print_history(panel: &HistoryPanel) {
    println!("{}", panel.heading);
    if let Some(caption) = &panel.caption {
        println!("  {}", caption.text);
    }
}
