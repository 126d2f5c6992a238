//! medpredict - Main CLI Entry Point

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use medpredict::{
    cli::{Args, Commands, Config, Verbosity},
    doctor::Doctor,
    encoding::SymptomSet,
    pipeline::{PipelineOutcome, PredictionPipeline, RequestHandler},
    server::{self, AppState},
    stress::StressService,
    telemetry::TelemetryCollector,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.clone())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    init_tracing(&config, args.verbosity());

    match args.command() {
        Commands::Serve { .. } => run_server(&config).await?,
        Commands::Predict { symptoms, json } => run_predict(&config, &symptoms, json)?,
        Commands::Symptoms => list_symptoms(&config)?,
        Commands::Doctor => run_doctor(&config).await,
        Commands::Stress { json } => run_stress(&config, json, args.verbosity()).await?,
        Commands::Config => show_config(&args, &config)?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise verbosity flags, then the configured level
fn init_tracing(config: &Config, verbosity: Verbosity) {
    let level = verbosity
        .log_level()
        .unwrap_or(config.logging.level.as_str());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("medpredict={level},tower_http={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run_server(config: &Config) -> Result<()> {
    let telemetry = TelemetryCollector::new();
    let handler = RequestHandler::from_config(config)?.with_telemetry(telemetry.clone());
    let stress = StressService::from_config(&config.fitness)?.with_telemetry(telemetry);

    server::serve(config, AppState::new(handler, stress)).await?;
    Ok(())
}

fn run_predict(config: &Config, symptoms: &[String], json: bool) -> Result<()> {
    let handler = RequestHandler::new(PredictionPipeline::from_config(config)?);
    let set: SymptomSet = symptoms.iter().collect();
    let handled = handler.handle(set);

    if json {
        println!("{}", serde_json::to_string_pretty(&handled.outcome)?);
    } else {
        match &handled.outcome {
            PipelineOutcome::Rendered { symptoms, result } => {
                println!("{} {}", "Symptoms:".bold(), symptoms.join(", "));
                println!(
                    "{} {} ({:.1}%)",
                    "Prediction:".bold(),
                    result.label.green().bold(),
                    result.confidence_percent()
                );
                for (i, score) in result.ranked.iter().enumerate() {
                    println!("  {}. {:<30} {:>5.1}%", i + 1, score.label, score.probability * 100.0);
                }
                if let Some(skew) = &result.version_skew {
                    println!(
                        "{} model serialized with {}, read with {}",
                        "Warning:".yellow(),
                        skew.artifact,
                        skew.reader
                    );
                }
            }
            PipelineOutcome::Failed { kind, message } => {
                eprintln!("{} {} ({})", "Error:".red().bold(), message, kind.as_str());
            }
        }
    }

    if !handled.outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn list_symptoms(config: &Config) -> Result<()> {
    let pipeline = PredictionPipeline::from_config(config)?;
    for (i, name) in pipeline.encoder().vocabulary().names().iter().enumerate() {
        println!("{:>4}  {}", i, name);
    }
    Ok(())
}

async fn run_doctor(config: &Config) {
    let checks = Doctor::new(config.clone()).run_diagnostics().await;
    Doctor::display_results(&checks);

    std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
}

async fn run_stress(config: &Config, json: bool, verbosity: Verbosity) -> Result<()> {
    let service = StressService::from_config(&config.fitness)?;
    let insights = service.insights(Utc::now()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    if verbosity.show_banner() {
        let source = if insights.is_demo { "demo data".yellow() } else { "fitness account".green() };
        println!("\n{} ({})\n", "Weekly stress insights".bold(), source);
    }

    println!("{:<12} {:>6} {:>6} {:>7} {:>7}  Category", "Date", "Stress", "HR", "Sleep", "Steps");
    for day in &insights.processed_data {
        println!(
            "{:<12} {:>6.1} {:>6.1} {:>6.1}h {:>7}  {}",
            day.date.format("%Y-%m-%d"),
            day.stress_level,
            day.heart_rate,
            day.sleep_duration,
            day.steps,
            day.stress_category.label()
        );
    }

    if let Some(stats) = &insights.statistics {
        println!(
            "\nAverage {:.1}, max {:.1}, min {:.1}, trend {:?}",
            stats.average_stress, stats.max_stress, stats.min_stress, insights.trend
        );
    }
    println!(
        "Real data on {} of {} days{}",
        insights.data_metrics.real_data_days,
        insights.data_metrics.total_days,
        if insights.data_metrics.has_sufficient_data { "" } else { " (insufficient for analysis)" }
    );
    let status = &insights.data_metrics.status;
    println!(
        "Heart rate {:?}, sleep {:?}, activity {:?}",
        status.heart_rate, status.sleep, status.activity
    );
    if insights.data_metrics.show_demo_warning {
        println!("{}", "Days without real data were filled with demo values".yellow());
    }

    println!("\n{}", "Recommendations:".bold());
    for rec in &insights.recommendations {
        println!("  - {}", rec);
    }
    println!();

    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let mut shown = config.clone();
    if shown.fitness.access_token.is_some() {
        shown.fitness.access_token = Some("********".to_string());
    }

    println!("{}", "medpredict configuration".bold());
    match &args.config {
        Some(path) => println!("# source: {}", path.display()),
        None => println!("# source: ~/.medpredict/config.toml or built-in defaults"),
    }
    println!();
    print!("{}", toml::to_string_pretty(&shown)?);
    println!("\n# verbosity: {}", args.verbosity().as_str());

    Ok(())
}
