//! Trains an A3C agent on the catch game.
use anyhow::Result;
use border::{run, A3cConfig};
use border_candle_agent::cnn::{AtariA2cNet, AtariA2cNetConfig};
use border_catch_env::{CatchEnv, CatchEnvConfig};
use clap::Parser;

/// Train an A3C agent on the catch game
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Name of the run, used for the output directory
    #[arg(long, default_value = "catch")]
    name: String,

    /// Use a CUDA device if available
    #[arg(long, default_value_t = false)]
    cuda: bool,

    /// Path to a YAML file of A3cConfig
    #[arg(long)]
    config: Option<String>,

    /// Maximum number of optimization steps
    #[arg(long)]
    max_opts: Option<usize>,
}

fn env_config() -> CatchEnvConfig {
    CatchEnvConfig::default().cell_size(8)
}

fn model_dir(args: &Args) -> String {
    format!("./border/examples/model/a3c_{}", args.name)
}

fn a3c_config(args: &Args) -> Result<A3cConfig> {
    let mut config = match &args.config {
        Some(path) => A3cConfig::load(path)?,
        None => A3cConfig::default(),
    };
    if args.cuda {
        config = config.use_accelerator(true);
    }
    if let Some(max_opts) = args.max_opts {
        config = config.max_opt_steps(max_opts);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = a3c_config(&args)?;
    let env_config = env_config();
    let net_config = AtariA2cNetConfig::new(env_config.obs_shape(), 3);
    let stats = run::<CatchEnv, AtariA2cNet>(&config, &env_config, net_config, model_dir(&args))?;
    println!("{}", stats.fmt());

    Ok(())
}
