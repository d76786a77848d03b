use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use sourcing::indicator::{DiscountRate, resolve_discount_rate};
use sourcing::registry::{load_registry, registry_to_yaml};
use sourcing::report::{
    AllocationReport, OutputFormat, RunReport, SensitivityRunReport, SupplierReport,
};
use sourcing::{default_data_dir, init_logging};
use sourcing_core::analysis::DEFAULT_SWING;
use sourcing_core::optimization::DEFAULT_RISK_AVERSION;
use sourcing_core::presets::default_factors;
use sourcing_core::simulation::DEFAULT_ORDER_SIZE;
use sourcing_core::{
    AllocationConfig, AllocationStrategy, PortfolioOutlook, SensitivityConfig, SimulationConfig,
    optimize_simulations, run_sensitivity, simulate_registry,
};

#[derive(Parser, Debug)]
#[command(name = "sourcing")]
#[command(about = "Monte Carlo landed-cost simulation and supplier allocation")]
struct Cli {
    /// Path to the data directory (default: ~/.sourcing/)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Supplier registry YAML file (default: built-in China, Mexico, US)
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate every supplier and recommend an allocation
    Run {
        #[command(flatten)]
        sim: SimulationArgs,

        /// Weight on per-unit cost variance
        #[arg(long, default_value_t = DEFAULT_RISK_AVERSION)]
        risk_aversion: f64,

        /// Require at least this expected delivered fraction, in [0, 1]
        #[arg(long)]
        min_delivered_fraction: Option<f64>,
    },
    /// Rank one supplier's parameters by their effect on mean cost
    Sensitivity {
        /// Supplier name as it appears in the registry
        supplier: String,

        #[command(flatten)]
        sim: SimulationArgs,

        /// Relative perturbation applied to each parameter
        #[arg(long, default_value_t = DEFAULT_SWING)]
        swing: f64,
    },
    /// Print the supplier registry as YAML
    Registry,
}

#[derive(Args, Debug)]
struct SimulationArgs {
    #[arg(long, default_value_t = DEFAULT_ORDER_SIZE)]
    order_size: u64,

    #[arg(long, default_value_t = 50_000)]
    trials: usize,

    /// Master seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Annual discount rate in percent; skips the rate lookup
    #[arg(long)]
    discount_rate: Option<f64>,

    /// Never contact the rate service
    #[arg(long)]
    offline: bool,

    #[arg(long, env = "FRED_API_KEY", hide_env_values = true)]
    fred_api_key: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

struct Prepared {
    seed: u64,
    rate: DiscountRate,
    config: SimulationConfig,
}

impl SimulationArgs {
    fn prepare(&self) -> Prepared {
        let seed = self.seed.unwrap_or_else(rand::random);
        tracing::info!(seed, "master seed");

        let rate = resolve_discount_rate(
            self.discount_rate,
            self.fred_api_key.as_deref(),
            self.offline,
        );
        let config = SimulationConfig {
            order_size: self.order_size,
            trials: self.trials,
            economics: rate.economics(),
        };

        Prepared { seed, rate, config }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &cli.log_level)?;

    let registry = load_registry(cli.registry.as_deref())?;
    tracing::info!(suppliers = registry.len(), "registry loaded");

    match cli.command {
        Command::Run {
            sim,
            risk_aversion,
            min_delivered_fraction,
        } => {
            let Prepared { seed, rate, config } = sim.prepare();
            tracing::info!(
                suppliers = registry.len(),
                order_size = config.order_size,
                trials = config.trials,
                seed,
                "starting run"
            );

            let simulations =
                simulate_registry(&registry, &config, seed).wrap_err("Simulation failed")?;

            let strategy = match min_delivered_fraction {
                Some(min_delivered_fraction) => AllocationStrategy::YieldFloor {
                    min_delivered_fraction,
                },
                None => AllocationStrategy::MeanVariance,
            };
            let allocation_config = AllocationConfig {
                strategy,
                ..AllocationConfig::with_risk_aversion(risk_aversion)
            };

            let allocation = match optimize_simulations(&simulations, &allocation_config) {
                Ok(result) => {
                    tracing::info!(
                        expected_cost = result.expected_cost,
                        delivered_fraction = result.delivered_fraction,
                        iterations = result.iterations,
                        "allocation found"
                    );
                    let outlook =
                        PortfolioOutlook::from_allocation(&result, &simulations, config.order_size);
                    AllocationReport::allocated(&result, outlook)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "allocation failed");
                    AllocationReport::failed(e)
                }
            };

            let report = RunReport {
                seed,
                order_size: config.order_size,
                trials: config.trials,
                discount_rate: rate,
                risk_aversion,
                suppliers: simulations.iter().map(SupplierReport::from_simulation).collect(),
                allocation,
            };
            println!("{}", report.render(sim.format)?);
        }
        Command::Sensitivity {
            supplier,
            sim,
            swing,
        } => {
            let params = registry
                .get(&supplier)
                .ok_or_else(|| eyre!("Unknown supplier '{supplier}'"))?;
            let Prepared { seed, rate, config } = sim.prepare();

            let factors = default_factors(&supplier, params);
            let report = run_sensitivity(
                params,
                &config,
                &factors,
                &SensitivityConfig { swing },
                seed,
            )
            .wrap_err_with(|| format!("Sensitivity baseline failed for {supplier}"))?;

            for skipped in &report.skipped {
                tracing::warn!(factor = %skipped.label, reason = %skipped.reason, "factor skipped");
            }

            let report = SensitivityRunReport {
                supplier,
                seed,
                order_size: config.order_size,
                trials: config.trials,
                discount_rate: rate,
                report,
            };
            println!("{}", report.render(sim.format)?);
        }
        Command::Registry => {
            print!("{}", registry_to_yaml(&registry)?);
        }
    }

    tracing::info!("Done");
    Ok(())
}
