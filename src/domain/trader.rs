//! The tick-driven strategy host.
//!
//! A `Trader` owns a broker, feeds the strategy a fresh candle window each
//! tick, absorbs the broker's fill/close events, and appends one row of
//! performance history per tick. Strategies are held outside the trader so
//! both sides can be borrowed mutably across a tick.

use crate::domain::engine::EngineEvent;
use crate::domain::error::SimError;
use crate::domain::frame::Frame;
use crate::domain::order::OrderSpec;
use crate::domain::stats::{PerformanceStats, TradeEvent};
use crate::domain::value::{EpochTime, Frequency};
use crate::ports::broker_port::Broker;

pub trait Strategy<B: Broker> {
    /// Called once, before the first tick.
    fn init(&mut self, _trader: &mut Trader<B>) {}

    /// Called once per tick with this tick's candle window loaded.
    fn next(&mut self, trader: &mut Trader<B>);
}

#[derive(Debug, Clone)]
pub struct TraderConfig {
    pub symbol: String,
    pub frequency: Frequency,
    /// Length of the trailing candle window handed to the strategy.
    pub candles_to_keep: usize,
}

impl TraderConfig {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            frequency: Frequency::Daily,
            candles_to_keep: 100,
        }
    }
}

pub struct Trader<B: Broker> {
    broker: B,
    symbol: String,
    frequency: Frequency,
    candles_to_keep: usize,
    data: Option<Frame>,
    finished: bool,
    first_equity: Option<f64>,
    returns_this_tick: f64,
    realized_this_tick: bool,
    trades_this_tick: Vec<TradeEvent>,
    stats: PerformanceStats,
}

impl<B: Broker> Trader<B> {
    pub fn new(broker: B, config: TraderConfig) -> Self {
        Self {
            broker,
            symbol: config.symbol,
            frequency: config.frequency,
            candles_to_keep: config.candles_to_keep.max(1),
            data: None,
            finished: false,
            first_equity: None,
            returns_this_tick: 0.0,
            realized_this_tick: false,
            trades_this_tick: Vec::new(),
            stats: PerformanceStats::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn broker_mut(&mut self) -> &mut B {
        &mut self.broker
    }

    /// The candle window loaded for the current tick.
    pub fn data(&self) -> Option<&Frame> {
        self.data.as_ref()
    }

    pub fn close(&self, i: isize) -> f64 {
        self.data.as_ref().map_or(0.0, |d| d.close(i))
    }

    pub fn open(&self, i: isize) -> f64 {
        self.data.as_ref().map_or(0.0, |d| d.open(i))
    }

    pub fn high(&self, i: isize) -> f64 {
        self.data.as_ref().map_or(0.0, |d| d.high(i))
    }

    pub fn low(&self, i: isize) -> f64 {
        self.data.as_ref().map_or(0.0, |d| d.low(i))
    }

    pub fn date(&self, i: isize) -> EpochTime {
        self.data.as_ref().map_or(EpochTime(0), |d| d.date(i))
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn stats(&self) -> &PerformanceStats {
        &self.stats
    }

    fn fetch(&mut self) -> Result<(), SimError> {
        match self.broker.candles(&self.symbol, self.candles_to_keep) {
            Ok(window) => {
                if window.exhausted {
                    self.finished = true;
                }
                self.data = Some(window.frame);
                Ok(())
            }
            // end of data is completion, not failure
            Err(SimError::DataExhausted { .. }) => {
                self.finished = true;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Run one tick: refresh the window, let the strategy act, absorb the
    /// broker's events and append the performance row.
    pub fn tick<S: Strategy<B>>(&mut self, strategy: &mut S) -> Result<(), SimError> {
        self.fetch()?;
        strategy.next(self);
        self.absorb_events();

        let equity = self.broker.nav();
        let first = *self.first_equity.get_or_insert(equity);
        let drawdown = (first - equity).max(0.0);
        let returns = self.realized_this_tick.then_some(self.returns_this_tick);
        let date = self.date(-1);
        let trades = std::mem::take(&mut self.trades_this_tick);
        self.stats
            .record(date, equity, self.broker.pl(), drawdown, returns, trades)?;

        self.returns_this_tick = 0.0;
        self.realized_this_tick = false;
        Ok(())
    }

    fn absorb_events(&mut self) {
        for event in self.broker.drain_events() {
            match event {
                EngineEvent::OrderPlaced { .. } => {}
                EngineEvent::OrderFilled { price, units, .. } => {
                    self.trades_this_tick.push(TradeEvent {
                        price,
                        units,
                        exit: false,
                    });
                }
                EngineEvent::PositionClosed {
                    price, units, pl, ..
                } => {
                    self.returns_this_tick += pl;
                    self.realized_this_tick = true;
                    self.trades_this_tick.push(TradeEvent {
                        price,
                        units,
                        exit: true,
                    });
                }
            }
        }
    }

    /// Go long `units`. Anything already working on the symbol is closed
    /// first; the engine holds at most one position per symbol.
    pub fn buy(&mut self, units: f64, stop_loss: f64, take_profit: f64) -> Result<u64, SimError> {
        self.close_orders_and_positions()?;
        self.broker
            .place_order(OrderSpec::market(&self.symbol, units, stop_loss, take_profit))
    }

    /// Go short `units`; same replace-don't-hedge rule as [`buy`].
    ///
    /// [`buy`]: Trader::buy
    pub fn sell(&mut self, units: f64, stop_loss: f64, take_profit: f64) -> Result<u64, SimError> {
        self.close_orders_and_positions()?;
        self.broker.place_order(OrderSpec::market(
            &self.symbol,
            -units,
            stop_loss,
            take_profit,
        ))
    }

    /// Place an arbitrary order without the replace rule.
    pub fn order(&mut self, spec: OrderSpec) -> Result<u64, SimError> {
        self.broker.place_order(spec)
    }

    /// Try to cancel open orders (which the engine refuses, by contract)
    /// and close open positions for this symbol.
    pub fn close_orders_and_positions(&mut self) -> Result<(), SimError> {
        let order_ids: Vec<u64> = self
            .broker
            .open_orders()
            .iter()
            .filter(|o| o.symbol == self.symbol)
            .map(|o| o.id)
            .collect();
        for id in order_ids {
            match self.broker.cancel_order(id) {
                Ok(()) | Err(SimError::CancelUnsupported) => {}
                Err(e) => return Err(e),
            }
        }

        let position_ids: Vec<u64> = self
            .broker
            .open_positions()
            .iter()
            .filter(|p| p.symbol == self.symbol)
            .map(|p| p.id)
            .collect();
        for id in position_ids {
            self.broker.close_position(id)?;
        }
        Ok(())
    }
}

/// Drive a trader over its whole data set, then flatten what remains.
pub fn backtest<B: Broker, S: Strategy<B>>(
    trader: &mut Trader<B>,
    strategy: &mut S,
) -> Result<(), SimError> {
    strategy.init(trader);
    loop {
        trader.tick(strategy)?;
        if trader.finished() {
            break;
        }
        trader.broker_mut().advance();
    }
    trader.close_orders_and_positions()?;
    Ok(())
}
