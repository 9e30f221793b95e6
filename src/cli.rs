//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvCandleAdapter, CsvLayout};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::engine::{
    EngineConfig, MatchingEngine, NoSlippage, RandomSlippage, SlippageSampler,
};
use crate::domain::error::SimError;
use crate::domain::frame::CLOSE;
use crate::domain::trader::{self, Strategy, Trader, TraderConfig};
use crate::domain::value::Frequency;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "candlesim", about = "Candle-driven trading simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Candle CSV path, overriding [data] path from the config
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Slippage RNG seed, overriding [account] seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate a configuration without running it
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest { config, data, seed } => run_backtest(&config, data, seed),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

pub fn build_engine_config(adapter: &dyn ConfigPort) -> EngineConfig {
    let defaults = EngineConfig::default();
    EngineConfig {
        cash: adapter.get_double("account", "cash", defaults.cash),
        leverage: adapter.get_double("account", "leverage", defaults.leverage),
        spread: adapter.get_double("account", "spread", defaults.spread),
        slippage: adapter.get_double("account", "slippage", defaults.slippage),
    }
}

pub fn build_trader_config(adapter: &dyn ConfigPort) -> Result<TraderConfig, SimError> {
    let symbol = adapter
        .get_string("trader", "symbol")
        .ok_or_else(|| SimError::ConfigMissing {
            section: "trader".into(),
            key: "symbol".into(),
        })?;

    let frequency = match adapter.get_string("trader", "frequency") {
        Some(code) => code
            .parse::<Frequency>()
            .map_err(|_| SimError::ConfigInvalid {
                section: "trader".into(),
                key: "frequency".into(),
                reason: format!("unknown frequency code '{}'", code),
            })?,
        None => Frequency::Daily,
    };

    let mut config = TraderConfig::new(&symbol);
    config.frequency = frequency;
    config.candles_to_keep = adapter.get_int("trader", "candles_to_keep", 100).max(1) as usize;
    Ok(config)
}

pub fn build_csv_layout(adapter: &dyn ConfigPort) -> CsvLayout {
    let defaults = CsvLayout::default();
    let get = |key: &str, default: String| {
        adapter.get_string("data", key).unwrap_or(default)
    };
    CsvLayout {
        date: get("date_column", defaults.date),
        open: get("open_column", defaults.open),
        high: get("high_column", defaults.high),
        low: get("low_column", defaults.low),
        close: get("close_column", defaults.close),
        volume: get("volume_column", defaults.volume),
        date_format: get("date_format", defaults.date_format),
        latest_first: adapter.get_bool("data", "latest_first", defaults.latest_first),
    }
}

fn resolve_data_path(
    override_path: Option<PathBuf>,
    adapter: &dyn ConfigPort,
) -> Result<PathBuf, SimError> {
    if let Some(path) = override_path {
        return Ok(path);
    }
    adapter
        .get_string("data", "path")
        .map(PathBuf::from)
        .ok_or_else(|| SimError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })
}

/// Moving-average crossover: long while the fast mean sits above the slow
/// one, short while it sits below. Holds at most one position.
pub struct SmaCross {
    pub fast: usize,
    pub slow: usize,
    pub units: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl SmaCross {
    pub fn from_config(adapter: &dyn ConfigPort) -> Self {
        Self {
            fast: adapter.get_int("strategy", "fast", 10).max(1) as usize,
            slow: adapter.get_int("strategy", "slow", 30).max(1) as usize,
            units: adapter.get_double("strategy", "units", 10_000.0),
            stop_loss: adapter.get_double("strategy", "stop_loss", 0.0),
            take_profit: adapter.get_double("strategy", "take_profit", 0.0),
        }
    }

    fn sma(trader: &Trader<MatchingEngine>, period: usize) -> Option<f64> {
        let data = trader.data()?;
        let closes = data.series(CLOSE)?.as_indexed()?;
        if closes.len() < period {
            return None;
        }
        let mut means = closes.copy();
        means.rolling(period).mean();
        let last = means.key_at(means.len() - 1)?;
        Some(means.float(last))
    }
}

impl Strategy<MatchingEngine> for SmaCross {
    fn next(&mut self, trader: &mut Trader<MatchingEngine>) {
        let (Some(fast), Some(slow)) = (
            Self::sma(trader, self.fast),
            Self::sma(trader, self.slow),
        ) else {
            return;
        };

        let positions = trader.broker().open_positions();
        let long = positions.iter().any(|p| p.is_long());
        let short = positions.iter().any(|p| p.is_short());

        if fast > slow && !long {
            let _ = trader.buy(self.units, self.stop_loss, self.take_profit);
        } else if fast < slow && !short {
            let _ = trader.sell(self.units, self.stop_loss, self.take_profit);
        }
    }
}

fn run_backtest(config_path: &PathBuf, data: Option<PathBuf>, seed: Option<u64>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let trader_config = match build_trader_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_path = match resolve_data_path(data, &adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let engine_config = build_engine_config(&adapter);
    let seed = seed.unwrap_or_else(|| adapter.get_int("account", "seed", 0).max(0) as u64);
    let sampler: Box<dyn SlippageSampler> = if engine_config.slippage > 0.0 {
        Box::new(RandomSlippage::seeded(seed))
    } else {
        Box::new(NoSlippage)
    };

    let layout = build_csv_layout(&adapter);
    let source = CsvCandleAdapter::with_layout(data_path.clone(), layout);
    let engine = MatchingEngine::from_source(Box::new(source), engine_config, sampler);

    eprintln!(
        "Running backtest: {} ({}) from {}",
        trader_config.symbol,
        trader_config.frequency,
        data_path.display(),
    );

    let mut strategy = SmaCross::from_config(&adapter);
    let mut trader = Trader::new(engine, trader_config);

    if let Err(e) = trader::backtest(&mut trader, &mut strategy) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let stats = trader.stats();
    eprintln!("\n=== Aggregate Results ===");
    eprintln!("Ticks:            {}", stats.len());
    eprintln!("Net Profit:       {:+.2}", stats.net_profit());
    eprintln!("Max Drawdown:     {:.2}", stats.max_drawdown());
    eprintln!("Profit Factor:    {:.2}", stats.profit_factor());
    eprintln!("Final NAV:        {:.2}", trader.broker().nav());
    eprintln!("Spread Paid:      {:.2}", trader.broker().spread_collected());

    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let trader_config = match build_trader_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if let Err(e) = resolve_data_path(None, &adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let strategy = SmaCross::from_config(&adapter);
    if strategy.fast >= strategy.slow {
        eprintln!(
            "warning: fast period {} is not below slow period {}",
            strategy.fast, strategy.slow
        );
    }

    eprintln!(
        "Config validated: {} at {} keeping {} candles",
        trader_config.symbol, trader_config.frequency, trader_config.candles_to_keep,
    );
    ExitCode::SUCCESS
}
