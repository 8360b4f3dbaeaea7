use clap::Parser;
use rating_engine::{
    args::{Args, Command},
    config::EngineConfig,
    dataset::{load_dataset, read_json, write_json},
    model::{processor::RatingProcessor, structures::lobby::Lobby}
};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(EnvFilter::new(&args.log_level))
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    let processor = RatingProcessor::new(config);

    match args.command {
        Command::Recalculate {
            input,
            output,
            skip_training
        } => {
            let dataset = load_dataset(&input)?;
            let result = processor.process(
                &dataset.players,
                &dataset.matches,
                dataset.weights.as_ref(),
                !skip_training
            );

            write_json(&result, output.as_deref())?;
            info!("Recalculation written");
        }
        Command::Predict { input, lobby } => {
            let dataset = load_dataset(&input)?;
            let lobby: Lobby = read_json(&lobby)?;
            let result = processor.process(&dataset.players, &dataset.matches, dataset.weights.as_ref(), false);

            write_json(&result.predictor().predict(&lobby), None)?;
        }
        Command::Balance { input, lobby } => {
            let dataset = load_dataset(&input)?;
            let lobby: Lobby = read_json(&lobby)?;
            let result = processor.process(&dataset.players, &dataset.matches, dataset.weights.as_ref(), false);

            write_json(&processor.balancer(&result).balance(&lobby), None)?;
        }
    }

    Ok(())
}
