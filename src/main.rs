use std::env;

use anyhow::{Context, bail};
use log::info;

use neural_ode_surrogate::{config::RunConfig, pipeline};

const USAGE: &str = "usage: neural-ode <train|search> <run.json>";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let (Some(command), Some(path)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };

    let run = RunConfig::from_file(&path).with_context(|| format!("reading {path}"))?;
    info!("loaded run configuration from {path}");

    match command.as_str() {
        "train" => {
            let report = pipeline::train(&run).context("training run failed")?;

            if let Some(last) = report.progress.last() {
                println!("cost after iteration {}: {:.6e}", last.iteration, last.cost);
            }
            if let Some(error) = report.test_error {
                println!("test error: {:.4} %", 100. * error);
            }
            for (i, error) in report.extrapolation_errors.iter().enumerate() {
                println!("extrapolation error x{}: {:.4} %", i + 1, 100. * error);
            }
            println!("trajectory written to {}", run.output_trajectory.display());
        }
        "search" => {
            let report = pipeline::search(&run).context("search failed")?;

            match report.best {
                Some(best) => println!(
                    "best params: topology {:?}, learning rate {:e}, l2 {:e} (test error {:.4} %)",
                    best.params.topology,
                    best.params.learning_rate,
                    best.params.l2_regularization,
                    100. * best.score
                ),
                None => println!("no trial produced a finite score"),
            }
        }
        other => bail!("unknown command {other:?}\n{USAGE}"),
    }

    Ok(())
}
