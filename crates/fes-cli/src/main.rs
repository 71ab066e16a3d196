use std::env;
use std::error::Error;

use fes_fit::{load_config_or_default, run_pipeline, DenseLayer};
use tracing::Level;

fn print_parameters(layers: &[DenseLayer]) {
    println!("coefs:");
    for layer in layers {
        println!("{}", layer.weights);
    }
    println!("intercepts:");
    for layer in layers {
        println!("{}", layer.biases.transpose());
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let run_dir = env::current_dir()?;
    let config = load_config_or_default(&run_dir)?;
    let outcome = run_pipeline(&config, &run_dir)?;

    println!("{}", outcome.network.r2_test);
    print_parameters(outcome.network.model.layers());
    Ok(())
}
