use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use rusty_popcode::config::{PairSelection, SimulationConfig};
use rusty_popcode::error::PopCodeError;
use rusty_popcode::simulation::Simulation;
use rusty_popcode::tuning::TuningParameters;

#[derive(Parser, Debug)]
struct Args {
    /// A JSON configuration file, overridden by the other arguments
    #[arg(long)]
    config: Option<PathBuf>,
    /// The seed used for sampling the population codes
    #[arg(long)]
    seed: Option<u64>,
    /// The number of neurons per population (odd)
    #[arg(short = 'N', long)]
    num_neurons: Option<usize>,
    /// The number of simulated time steps
    #[arg(short = 'T', long)]
    num_steps: Option<usize>,
    /// The number of time steps used for the activity histograms
    #[arg(long)]
    histogram_steps: Option<usize>,
    /// The encoded value of population A
    #[arg(long, allow_hyphen_values = true)]
    mu_a: Option<f64>,
    /// The tuning spread of population A
    #[arg(long)]
    sigma_a: Option<f64>,
    /// The encoded value of population B
    #[arg(long, allow_hyphen_values = true)]
    mu_b: Option<f64>,
    /// The tuning spread of population B
    #[arg(long)]
    sigma_b: Option<f64>,
    /// The number of time steps per firing rate bin
    #[arg(long)]
    bin_size: Option<usize>,
    /// The pair of neurons with distant preferred values
    #[arg(long, num_args = 2, value_names = ["I", "J"])]
    far_pair: Option<Vec<usize>>,
    /// The directory of the analysis reports
    #[arg(long, default_value = "results")]
    out_dir: PathBuf,
}

impl Args {
    fn to_config(&self) -> Result<SimulationConfig, PopCodeError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load_from(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(num_neurons) = self.num_neurons {
            config.num_neurons = num_neurons;
        }
        if let Some(num_steps) = self.num_steps {
            config.num_steps = num_steps;
        }
        if let Some(histogram_steps) = self.histogram_steps {
            config.histogram_steps = histogram_steps;
        }
        if let Some(bin_size) = self.bin_size {
            config.bin_size = bin_size;
        }
        config.population_a = TuningParameters {
            mean: self.mu_a.unwrap_or(config.population_a.mean),
            std: self.sigma_a.unwrap_or(config.population_a.std),
        };
        config.population_b = TuningParameters {
            mean: self.mu_b.unwrap_or(config.population_b.mean),
            std: self.sigma_b.unwrap_or(config.population_b.std),
        };
        if self.mu_a.is_some() || self.mu_b.is_some() {
            config.near_pair = PairSelection::Preferred {
                value: config.population_c().mean,
            };
        }
        if let Some(pair) = &self.far_pair {
            config.far_pair = PairSelection::Indices(pair[0], pair[1]);
        }
        Ok(config)
    }
}

fn main() -> Result<(), PopCodeError> {
    let args = Args::parse();

    let mut hasher = Sha256::new();
    hasher.update(format!("{:?}", args));
    let hash = hasher.finalize();
    let log_path = format!("log/{:x}.log", hash);

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build();
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build(&log_path)
        .map_err(|e| PopCodeError::IOError(e.to_string()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("logfile")
                .build(LevelFilter::Info),
        )
        .map_err(|e| PopCodeError::IOError(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| PopCodeError::IOError(e.to_string()))?;

    log::info!("{:?}", args);

    let config = args.to_config()?;
    log::info!("{:?}", config);

    let simulation = Simulation::build(config)?;
    let output = simulation.run()?;
    let analysis = simulation.analyze(&output)?;
    log::info!("Analysis: done!");

    log::info!(
        "Near pair {:?}: ellipse centered at ({:.4}, {:.4}) with angle {:.1} deg, width {:.4} and height {:.4}",
        analysis.near.neurons,
        analysis.near.ellipse.center[0],
        analysis.near.ellipse.center[1],
        analysis.near.ellipse.angle,
        analysis.near.ellipse.width,
        analysis.near.ellipse.height
    );
    log::info!(
        "Far pair {:?}: ellipse centered at ({:.4}, {:.4}) with angle {:.1} deg, width {:.4} and height {:.4}",
        analysis.far.neurons,
        analysis.far.ellipse.center[0],
        analysis.far.ellipse.center[1],
        analysis.far.ellipse.angle,
        analysis.far.ellipse.width,
        analysis.far.ellipse.height
    );

    std::fs::create_dir_all(&args.out_dir)?;
    let report_path = args.out_dir.join(format!("{:x}.json", hash));
    let mut writer = BufWriter::new(File::create(&report_path)?);
    serde_json::to_writer(&mut writer, &analysis)?;
    writer.flush()?;
    log::info!("Report saving: done! Saved to {}", report_path.display());

    Ok(())
}
