mod common;

use approx::assert_relative_eq;
use candlesim::adapters::csv_adapter::CsvCandleAdapter;
use candlesim::adapters::file_config_adapter::FileConfigAdapter;
use candlesim::cli::{build_engine_config, build_trader_config, SmaCross};
use candlesim::domain::engine::{
    EngineConfig, MatchingEngine, NoSlippage, RandomSlippage, SlippageSampler,
};
use candlesim::domain::trader::{self, Strategy, Trader, TraderConfig};

struct BuyOnce {
    units: f64,
    bought: bool,
}

impl Strategy<MatchingEngine> for BuyOnce {
    fn next(&mut self, trader: &mut Trader<MatchingEngine>) {
        if !self.bought {
            trader.buy(self.units, 0.0, 0.0).unwrap();
            self.bought = true;
        }
    }
}

fn sample_trader(engine: MatchingEngine) -> Trader<MatchingEngine> {
    let mut config = TraderConfig::new("AUD_USD");
    config.candles_to_keep = 5;
    Trader::new(engine, config)
}

#[test]
fn csv_load_matches_the_in_memory_frame() {
    let (_dir, path) = common::write_sample_csv();
    let loaded = CsvCandleAdapter::new(path).read("AUD_USD").unwrap();
    let expected = common::sample_frame("AUD_USD");

    assert_eq!(loaded.len(), expected.len());
    for row in 0..loaded.len() {
        assert_eq!(loaded.key_at(row), expected.key_at(row));
        assert_relative_eq!(
            loaded.close(row as isize),
            expected.close(row as isize),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            loaded.high(row as isize),
            expected.high(row as isize),
            epsilon = 1e-12
        );
    }
}

#[test]
fn backtest_from_csv_books_the_expected_nav() {
    let (_dir, path) = common::write_sample_csv();
    let source = CsvCandleAdapter::new(path);
    let engine = MatchingEngine::from_source(
        Box::new(source),
        EngineConfig::default(),
        Box::new(NoSlippage),
    );

    let mut trader = sample_trader(engine);
    let mut strategy = BuyOnce {
        units: 50_000.0,
        bought: false,
    };
    trader::backtest(&mut trader, &mut strategy).unwrap();

    // entered at the first close of 1.15, flattened at the final 1.3
    assert_relative_eq!(trader.broker().nav(), 107_500.0, epsilon = 1e-6);
    assert!(trader.broker().open_positions().is_empty());
    assert_eq!(trader.stats().len(), 9);
    assert_relative_eq!(trader.stats().net_profit(), 7_500.0, epsilon = 1e-6);
    assert_relative_eq!(trader.stats().max_drawdown(), 2_500.0, epsilon = 1e-6);
}

#[test]
fn seeded_slippage_reruns_identically() {
    let run = || {
        let (_dir, path) = common::write_sample_csv();
        let source = CsvCandleAdapter::new(path);
        let config = EngineConfig {
            slippage: 0.001,
            ..EngineConfig::default()
        };
        let sampler: Box<dyn SlippageSampler> = Box::new(RandomSlippage::seeded(42));
        let engine = MatchingEngine::from_source(Box::new(source), config, sampler);

        let mut trader = sample_trader(engine);
        let mut strategy = BuyOnce {
            units: 50_000.0,
            bought: false,
        };
        trader::backtest(&mut trader, &mut strategy).unwrap();
        trader.broker().nav()
    };

    assert_relative_eq!(run(), run(), epsilon = 1e-12);
}

#[test]
fn config_file_drives_a_full_backtest() {
    let (_data_dir, data_path) = common::write_sample_csv();
    let config_content = format!(
        "[account]\n\
         cash = 100000\n\
         leverage = 1\n\
         \n\
         [trader]\n\
         symbol = AUD_USD\n\
         frequency = D\n\
         candles_to_keep = 5\n\
         \n\
         [data]\n\
         path = {}\n\
         \n\
         [strategy]\n\
         fast = 2\n\
         slow = 4\n\
         units = 10000\n",
        data_path.display(),
    );
    let (_cfg_dir, config_path) = common::write_config(&config_content);

    let adapter = FileConfigAdapter::from_file(&config_path).unwrap();
    let engine_config = build_engine_config(&adapter);
    assert_eq!(engine_config.cash, 100_000.0);

    let trader_config = build_trader_config(&adapter).unwrap();
    assert_eq!(trader_config.symbol, "AUD_USD");

    let source = CsvCandleAdapter::new(data_path);
    let engine = MatchingEngine::from_source(Box::new(source), engine_config, Box::new(NoSlippage));
    let mut trader = Trader::new(engine, trader_config);
    let mut strategy = SmaCross::from_config(&adapter);

    trader::backtest(&mut trader, &mut strategy).unwrap();

    assert_eq!(trader.stats().len(), 9);
    assert!(trader.broker().open_positions().is_empty());
    assert!(trader.broker().nav().is_finite());
}
