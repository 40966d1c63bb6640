//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use crate::adapters::csv_data_adapter::CsvDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::param_store::ParamStore;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest;
use crate::domain::error::BandtraderError;
use crate::domain::optimizer;
use crate::domain::settings::Settings;
use crate::domain::signal;
use crate::domain::strategy::StrategyParameters;
use crate::domain::universe::{self, PriceCache};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "bandtrader", about = "Band dip backtester and parameter tuner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Optimize parameters over the whole horizon, then backtest the winner
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Backtest with previously saved parameters, skipping the search
    Quick {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Backtest a single year with explicit parameters
    Year {
        year: i32,
        /// Maximum holding period in calendar days
        #[arg(long, default_value_t = 50)]
        count: u32,
        /// Fraction of the two-sigma band below the average
        #[arg(long, default_value_t = 0.30)]
        pct: f64,
        /// Lookback window in bars
        #[arg(long, default_value_t = 30)]
        window: usize,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the tickers the data directory provides
    ListTickers {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run { config } => run_full(config.as_ref()),
        Command::Quick { config } => run_quick(config.as_ref()),
        Command::Year {
            year,
            count,
            pct,
            window,
            config,
        } => run_single_year(
            year,
            StrategyParameters::new(count, pct, window),
            config.as_ref(),
        ),
        Command::ListTickers { config } => run_list_tickers(config.as_ref()),
    }
}

pub fn load_settings(config_path: Option<&PathBuf>) -> Result<Settings, BandtraderError> {
    match config_path {
        None => Ok(Settings::default()),
        Some(path) => {
            let adapter =
                FileConfigAdapter::from_file(path).map_err(|e| BandtraderError::ConfigParse {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            Settings::from_config(&adapter)
        }
    }
}

fn params_path(settings: &Settings) -> PathBuf {
    PathBuf::from(&settings.output_dir).join(&settings.params_file)
}

fn run_full(config_path: Option<&PathBuf>) -> ExitCode {
    // Stage 1: Settings
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: Universe and preload
    let data_port = CsvDataAdapter::new(PathBuf::from(&settings.data_dir));
    let tickers = match universe::resolve_universe(&data_port, &settings.tickers) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let years = settings.years();

    eprintln!(
        "Preloading {} tickers for {}-{}...",
        tickers.len(),
        settings.start_year,
        settings.end_year
    );
    let preload = match universe::preload(&data_port, &tickers, &years) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Grid search
    eprintln!(
        "Optimizing over {} parameter combinations...",
        settings.space.len()
    );
    let cancel = AtomicBool::new(false);
    let optimization = match optimizer::optimize(
        &preload.cache,
        &tickers,
        &years,
        &settings.space,
        settings.workers,
        &cancel,
        settings.initial_capital,
    ) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Optimization Results ===");
    eprintln!(
        "Best parameters:  count={} pct={:.2} window={}",
        optimization.best_parameters.count,
        optimization.best_parameters.pct,
        optimization.best_parameters.window
    );
    eprintln!(
        "Best score:       {:.2}%",
        optimization.best_result.compounded_return
    );
    eprintln!(
        "Grid evaluated:   {} combinations",
        optimization.search_space_size
    );
    eprintln!(
        "Trials:           {} simulated, {} skipped",
        optimization.trials_succeeded, optimization.trials_skipped
    );

    // Stage 4: Persist the winner
    let store = ParamStore::new(params_path(&settings));
    if let Err(e) = store.save(&optimization.best_parameters) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("Saved parameters to {}", store.path().display());

    // Stage 5: Backtest the winner and write reports
    backtest_and_report(
        &preload.cache,
        &tickers,
        &settings,
        &optimization.best_parameters,
    )
}

fn run_quick(config_path: Option<&PathBuf>) -> ExitCode {
    // Stage 1: Settings
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: Saved parameters, or defaults when nothing was optimized yet
    let store = ParamStore::new(params_path(&settings));
    let params = match store.load() {
        Ok(Some(p)) => p,
        Ok(None) => {
            eprintln!(
                "No saved parameters at {}; using defaults",
                store.path().display()
            );
            StrategyParameters::default()
        }
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Quick run with count={} pct={:.2} window={}",
        params.count, params.pct, params.window
    );

    // Stage 3: Universe and preload
    let data_port = CsvDataAdapter::new(PathBuf::from(&settings.data_dir));
    let tickers = match universe::resolve_universe(&data_port, &settings.tickers) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let preload = match universe::preload(&data_port, &tickers, &settings.years()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Backtest and write reports
    backtest_and_report(&preload.cache, &tickers, &settings, &params)
}

fn run_single_year(
    year: i32,
    params: StrategyParameters,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Settings and parameter check
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = params.validate() {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Strict load, a missing year is an error here
    let data_port = CsvDataAdapter::new(PathBuf::from(&settings.data_dir));
    let tickers = match universe::resolve_universe(&data_port, &settings.tickers) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let cache = match universe::preload_strict(&data_port, &tickers, &[year]) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Run and print to stdout, no files
    let outcome =
        match backtest::run_year(&cache, &tickers, year, &params, settings.initial_capital) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

    println!("total_trades: {}", outcome.result.total_trades);
    println!("win_rate: {:.1}%", outcome.result.win_rate);
    println!("compounded_return: {:.2}%", outcome.result.compounded_return);
    ExitCode::SUCCESS
}

fn run_list_tickers(config_path: Option<&PathBuf>) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = CsvDataAdapter::new(PathBuf::from(&settings.data_dir));
    let tickers = match universe::resolve_universe(&data_port, &settings.tickers) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for ticker in &tickers {
        println!("{ticker}");
    }
    eprintln!("{} tickers found", tickers.len());
    ExitCode::SUCCESS
}

fn backtest_and_report(
    cache: &PriceCache,
    tickers: &[String],
    settings: &Settings,
    params: &StrategyParameters,
) -> ExitCode {
    let years = settings.years();
    let run = match backtest::run_years(cache, tickers, &years, params, settings.initial_capital) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Backtest Results ===");
    eprintln!("{}", signal::describe(params));
    for year in run.years.iter().rev() {
        eprintln!(
            "Finished processing year {}. Compounded gain: {:.2}%",
            year.year, year.result.compounded_return
        );
    }
    eprintln!("Total Trades:     {}", run.aggregate.total_trades);
    eprintln!("Win Rate:         {:.1}%", run.aggregate.win_rate);
    eprintln!(
        "Final Compounded Return ({}-{}): {:.3}x",
        settings.start_year, settings.end_year, run.compound_factor
    );

    let reporter = TextReportAdapter::new(PathBuf::from(&settings.output_dir));
    match reporter.write_all(params, &run) {
        Ok(()) => {
            eprintln!("\nResults written to {}", settings.output_dir);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
