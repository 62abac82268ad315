use clap::Parser;
use log;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::str::FromStr;

use rusty_bg::core::channel::Channel;
use rusty_bg::core::metrics;
use rusty_bg::error::BGError;
use rusty_bg::simulator::config::{FusTarget, SimulationConfig};
use rusty_bg::simulator::simulator::run_simulation;
use rusty_bg::simulator::sweep::critical_kappa;
use rusty_bg::simulator::SETTLING_TIME;

#[derive(Parser, Debug)]
#[command(about = "Basal ganglia action selection under focused ultrasound modulation")]
struct Args {
    /// The cortical drive of channel 1
    #[arg(long = "A1", default_value = "0.8")]
    a1: f64,
    /// The cortical drive of channel 2
    #[arg(long = "A2", default_value = "0.6")]
    a2: f64,
    /// The fraction of the channel drive removed by the pulse
    #[arg(long, default_value = "0.6")]
    kappa: f64,
    /// The start of the pulse (in seconds)
    #[arg(long = "fus_start", default_value = "0.5")]
    fus_start: f64,
    /// The duration of the pulse (in seconds)
    #[arg(long = "fus_dur", default_value = "0.3")]
    fus_dur: f64,
    /// The simulated duration (in seconds)
    #[arg(short = 'T', long = "T", default_value = "1.2")]
    run_duration: f64,
    /// The seed of the cortical noise
    #[arg(long, default_value = "1")]
    seed: u64,
    /// The tonic multiplier of the GPi output
    #[arg(long = "gpi_scale_base", default_value = "1.0")]
    gpi_scale_base: f64,
    /// The node modulated by the pulse, must be one of: cortex, gpi
    #[arg(long, default_value = "cortex")]
    target: String,
    /// The attenuated channel (1 or 2)
    #[arg(long, default_value = "1")]
    channel: usize,
    /// The fraction of the GPi output removed by the pulse
    #[arg(long = "fus_depth", default_value = "0.6")]
    fus_depth: f64,
    /// The standard deviation of the cortical noise
    #[arg(long, default_value = "0.0")]
    noise: f64,
    /// A JSON configuration, overriding every option above
    #[arg(long)]
    config: Option<PathBuf>,
    /// The file to write the JSON run record to
    #[arg(long)]
    output: Option<PathBuf>,
    /// The directory of the log files
    #[arg(long = "log_dir", default_value = "log")]
    log_dir: PathBuf,
    /// Also bisect the attenuation fraction that flips the selection, up to the given tolerance
    #[arg(long = "critical_kappa")]
    critical_kappa: Option<f64>,
}

impl Args {
    fn simulation_config(&self) -> Result<SimulationConfig, BGError> {
        if let Some(path) = &self.config {
            return SimulationConfig::load_from(path);
        }
        Ok(SimulationConfig {
            a1: self.a1,
            a2: self.a2,
            kappa: self.kappa,
            fus_start: self.fus_start,
            fus_dur: self.fus_dur,
            gpi_scale_base: self.gpi_scale_base,
            run_duration: self.run_duration,
            fus_target: FusTarget::from_str(&self.target)?,
            fus_channel: Channel::try_from(self.channel)?,
            fus_depth: self.fus_depth,
            noise_std: self.noise,
            seed: self.seed,
            ..Default::default()
        })
    }
}

fn init_logging(args: &Args, config: &SimulationConfig) -> Result<(), BGError> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_string(config)?);
    let hash = hasher.finalize();
    let log_path = args.log_dir.join(format!("{:x}.log", hash));

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build();
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} {l} - {m}\n")))
        .build(log_path)
        .map_err(|e| BGError::IOError(e.to_string()))?;

    let log_config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("logfile")
                .build(LevelFilter::Info),
        )
        .map_err(|e| BGError::IOError(e.to_string()))?;

    log4rs::init_config(log_config).map_err(|e| BGError::IOError(e.to_string()))?;
    Ok(())
}

fn main() -> Result<(), BGError> {
    let args = Args::parse();
    let config = args.simulation_config()?;
    init_logging(&args, &config)?;

    log::info!("{:?}", args);

    let record = run_simulation(&config)?;
    for switch in record.switches() {
        log::info!(
            "Selection switch at t={:.3}: channel {} -> channel {}",
            switch.time,
            switch.from,
            switch.to
        );
    }

    let phases = record.phase_winners(SETTLING_TIME)?;
    let show = |winner: Option<Channel>| winner.map_or("none".to_string(), |c| c.to_string());
    log::info!(
        "Dominant channel: {} before, {} during and {} after the pulse",
        show(phases.before),
        show(phases.during),
        show(phases.after)
    );
    log::info!("Winner at end: {}", show(record.winner_at_end()));

    let pulse = config.fus_interval()?;
    for channel in Channel::ALL {
        if let Some(mean) = metrics::mean_activity(&record.thalamus, channel, &pulse) {
            log::info!(
                "Mean thalamic activity of channel {} during the pulse: {:.3}",
                channel,
                mean
            );
        }
    }

    if let Some(tolerance) = args.critical_kappa {
        match critical_kappa(&config, tolerance)? {
            Some(kappa) => log::info!("Critical attenuation: kappa = {:.4}", kappa),
            None => log::info!("No attenuation flips the selection"),
        }
    }

    if let Some(path) = &args.output {
        record.save_to(path)?;
        log::info!("Record saved to {}", path.display());
    }
    Ok(())
}
