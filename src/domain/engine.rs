//! Simulated order matching against historical candles.
//!
//! The engine walks a candle frame one bar at a time. Market orders fill
//! immediately at bid/ask plus sampled slippage; Limit/Stop orders fill
//! when a bar's range covers their requested price. Open positions are
//! serviced once per bar: trailing stops ratchet first, then take-profit
//! is tested before stop-loss and trailing-stop, so a bar covering both
//! levels resolves in the trader's favor. That optimistic bias is part of
//! the engine's contract.

use crate::domain::error::SimError;
use crate::domain::frame::Frame;
use crate::domain::order::{CloseReason, Order, OrderKind, OrderSpec, next_order_id};
use crate::domain::position::{Position, next_position_id};
use crate::domain::value::EpochTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A trailing window of candles plus the end-of-data marker. The fetch
/// that first delivers the final candle sets `exhausted`; that bar is
/// still meant to be processed.
#[derive(Debug)]
pub struct CandleWindow {
    pub frame: Frame,
    pub exhausted: bool,
}

/// Upstream provider the engine seeds its candle cache from on first use.
pub trait CandleSource {
    fn fetch(&mut self, symbol: &str) -> Result<Frame, SimError>;
}

/// Source of the symmetric slippage offset applied to market fills.
/// Returns an offset in `[-max/2, max/2)`; the engine passes
/// `max = slippage_fraction * reference_price`. The sampler is the only
/// nondeterminism in the engine.
pub trait SlippageSampler {
    fn sample(&mut self, max: f64) -> f64;
}

pub struct RandomSlippage {
    rng: StdRng,
}

impl RandomSlippage {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SlippageSampler for RandomSlippage {
    fn sample(&mut self, max: f64) -> f64 {
        if max <= 0.0 {
            return 0.0;
        }
        self.rng.r#gen::<f64>() * max - max / 2.0
    }
}

/// No slippage at all; the deterministic choice for tests and dry runs.
pub struct NoSlippage;

impl SlippageSampler for NoSlippage {
    fn sample(&mut self, _max: f64) -> f64 {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    OrderPlaced {
        order_id: u64,
        symbol: String,
    },
    OrderFilled {
        order_id: u64,
        position_id: u64,
        symbol: String,
        price: f64,
        units: f64,
    },
    PositionClosed {
        position_id: u64,
        symbol: String,
        price: f64,
        units: f64,
        pl: f64,
        reason: CloseReason,
    },
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub cash: f64,
    pub leverage: f64,
    /// Half-spread in price units, charged against the trader on both
    /// sides: ask = close + spread, bid = close - spread.
    pub spread: f64,
    /// Maximum slippage as a fraction of the reference price.
    pub slippage: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cash: 100_000.0,
            leverage: 1.0,
            spread: 0.0,
            slippage: 0.0,
        }
    }
}

pub struct MatchingEngine {
    data: Option<Frame>,
    source: Option<Box<dyn CandleSource>>,
    cursor: usize,
    cash: f64,
    leverage: f64,
    spread: f64,
    slippage: f64,
    sampler: Box<dyn SlippageSampler>,
    orders: Vec<Order>,
    positions: Vec<Position>,
    spread_collected: f64,
    events: Vec<EngineEvent>,
}

impl MatchingEngine {
    pub fn new(data: Frame, config: EngineConfig, sampler: Box<dyn SlippageSampler>) -> Self {
        Self {
            data: Some(data),
            source: None,
            cursor: 0,
            cash: config.cash,
            leverage: config.leverage,
            spread: config.spread,
            slippage: config.slippage,
            sampler,
            orders: Vec::new(),
            positions: Vec::new(),
            spread_collected: 0.0,
            events: Vec::new(),
        }
    }

    pub fn from_source(
        source: Box<dyn CandleSource>,
        config: EngineConfig,
        sampler: Box<dyn SlippageSampler>,
    ) -> Self {
        let mut engine = Self::new(Frame::new(""), config, sampler);
        engine.data = None;
        engine.source = Some(source);
        engine
    }

    pub fn data(&self) -> Option<&Frame> {
        self.data.as_ref()
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn leverage(&self) -> f64 {
        self.leverage
    }

    pub fn spread_collected(&self) -> f64 {
        self.spread_collected
    }

    fn ensure_data(&mut self, symbol: &str) -> Result<&Frame, SimError> {
        if self.data.is_none() {
            match self.source.as_mut() {
                Some(source) => {
                    let frame = source.fetch(symbol)?;
                    self.data = Some(frame);
                }
                None => {
                    return Err(SimError::NoData {
                        symbol: symbol.to_string(),
                    });
                }
            }
        }
        match self.data.as_ref() {
            Some(frame) if !frame.is_empty() => Ok(frame),
            _ => Err(SimError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    /// The trailing window of up to `count` candles ending at the
    /// simulated now.
    pub fn candles(&mut self, symbol: &str, count: usize) -> Result<CandleWindow, SimError> {
        let cursor = self.cursor;
        let data = self.ensure_data(symbol)?;
        let len = data.len();
        let count = count.max(1);
        let end = cursor.min(len - 1);
        let start = (end + 1).saturating_sub(count);
        Ok(CandleWindow {
            frame: data.copy_range(start as isize, (end + 1 - start) as isize),
            exhausted: end + 1 >= len,
        })
    }

    fn current_close(&self) -> f64 {
        match &self.data {
            Some(data) if !data.is_empty() => {
                let row = self.cursor.min(data.len() - 1);
                data.close(row as isize)
            }
            _ => 0.0,
        }
    }

    pub fn bid(&self) -> f64 {
        self.current_close() - self.spread
    }

    pub fn ask(&self) -> f64 {
        self.current_close() + self.spread
    }

    /// Side-adjusted price: buyers pay the ask, sellers receive the bid.
    pub fn price(&self, want_buy: bool) -> f64 {
        if want_buy { self.ask() } else { self.bid() }
    }

    pub fn current_time(&self) -> EpochTime {
        match &self.data {
            Some(data) if !data.is_empty() => {
                let row = self.cursor.min(data.len() - 1);
                data.date(row as isize)
            }
            _ => EpochTime(0),
        }
    }

    /// Place an order. Market orders fill before this returns; Limit and
    /// Stop orders fill immediately only if the current bar's range
    /// already covers the requested price.
    pub fn place_order(&mut self, spec: OrderSpec) -> Result<u64, SimError> {
        if spec.units == 0.0 {
            return Err(SimError::ZeroUnits {
                symbol: spec.symbol.clone(),
            });
        }
        self.ensure_data(&spec.symbol)?;

        let order = Order::from_spec(next_order_id(), spec, self.leverage, self.current_time());
        let id = order.id;
        self.events.push(EngineEvent::OrderPlaced {
            order_id: id,
            symbol: order.symbol.clone(),
        });
        let idx = self.orders.len();
        self.orders.push(order);

        match self.orders[idx].kind {
            OrderKind::Market => {
                let reference = self.price(self.orders[idx].is_buy());
                let offset = self.sampler.sample(self.slippage * reference);
                self.fill_order(idx, reference + offset);
            }
            OrderKind::Limit | OrderKind::Stop => {
                let row = self.row();
                let (low, high) = (self.low_at(row), self.high_at(row));
                let price = self.orders[idx].price;
                if low <= price && price <= high {
                    self.fill_order(idx, price);
                }
            }
        }
        Ok(id)
    }

    fn row(&self) -> usize {
        match &self.data {
            Some(data) if !data.is_empty() => self.cursor.min(data.len() - 1),
            _ => 0,
        }
    }

    fn low_at(&self, row: usize) -> f64 {
        self.data.as_ref().map_or(0.0, |d| d.low(row as isize))
    }

    fn high_at(&self, row: usize) -> f64 {
        self.data.as_ref().map_or(0.0, |d| d.high(row as isize))
    }

    fn fill_order(&mut self, idx: usize, price: f64) {
        let now = self.current_time();
        let order = &mut self.orders[idx];
        let position = Position::open(
            next_position_id(),
            &order.symbol,
            order.units,
            price,
            order.leverage,
            order.stop_loss,
            order.take_profit,
            order.trailing_distance,
            now,
        );
        order.position = Some(position.id);
        self.events.push(EngineEvent::OrderFilled {
            order_id: order.id,
            position_id: position.id,
            symbol: position.symbol.clone(),
            price,
            units: position.units,
        });
        self.cash -= position.entry_value();
        self.spread_collected += self.spread * position.units.abs();
        self.positions.push(position);
    }

    /// Move the simulated now one bar forward and service orders and
    /// positions against the new bar. Returns false at the end of data.
    pub fn advance(&mut self) -> bool {
        let len = self.data.as_ref().map_or(0, Frame::len);
        if len == 0 || self.cursor + 1 >= len {
            return false;
        }
        self.cursor += 1;
        self.tick();
        true
    }

    fn tick(&mut self) {
        let row = self.row();
        let (low, high) = (self.low_at(row), self.high_at(row));
        let close = self.current_close();

        // pending Limit/Stop orders share one trigger test
        for idx in 0..self.orders.len() {
            let order = &self.orders[idx];
            if order.is_filled() || order.kind == OrderKind::Market {
                continue;
            }
            let price = order.price;
            if low <= price && price <= high {
                self.fill_order(idx, price);
            }
        }

        for idx in 0..self.positions.len() {
            if self.positions[idx].closed {
                continue;
            }
            self.positions[idx].ratchet(close);
            let pos = &self.positions[idx];
            if pos.should_take_profit(low, high) {
                let price = pos.take_profit;
                self.book_close(idx, price, CloseReason::TakeProfit);
            } else if pos.should_stop_loss(low, high) {
                let price = pos.stop_loss;
                self.book_close(idx, price, CloseReason::StopLoss);
            } else if pos.should_trailing_stop(low, high) {
                let price = pos.trailing_stop;
                self.book_close(idx, price, CloseReason::TrailingStop);
            }
        }
    }

    fn book_close(&mut self, idx: usize, price: f64, reason: CloseReason) {
        let pos = &mut self.positions[idx];
        if pos.closed {
            return;
        }
        pos.close(price, reason);
        let value = pos.value(price);
        let pl = pos.pl(price);
        self.events.push(EngineEvent::PositionClosed {
            position_id: pos.id,
            symbol: pos.symbol.clone(),
            price,
            units: pos.units,
            pl,
            reason,
        });
        self.cash += value;
        self.spread_collected += self.spread * self.positions[idx].units.abs();
    }

    /// Close an open position at the current bid/ask.
    pub fn close_position(&mut self, id: u64) -> Result<(), SimError> {
        let idx = self
            .positions
            .iter()
            .position(|p| p.id == id)
            .ok_or(SimError::UnknownPosition { id })?;
        if self.positions[idx].closed {
            return Ok(());
        }
        // longs unwind by selling at the bid, shorts by buying at the ask
        let price = self.price(!self.positions[idx].is_long());
        self.book_close(idx, price, CloseReason::Manual);
        Ok(())
    }

    /// Always fails: see [`Order::cancel`].
    pub fn cancel_order(&mut self, id: u64) -> Result<(), SimError> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(SimError::UnknownOrder { id })?;
        order.cancel()
    }

    /// Cash plus the marked-to-market value of every open position.
    pub fn nav(&self) -> f64 {
        let close = self.current_close();
        let open_value: f64 = self
            .positions
            .iter()
            .filter(|p| p.is_open())
            .map(|p| p.value(close))
            .sum();
        self.cash + open_value
    }

    /// Realized plus unrealized profit across all positions.
    pub fn pl(&self) -> f64 {
        let close = self.current_close();
        self.positions.iter().map(|p| p.profit(close)).sum()
    }

    pub fn open_orders(&self) -> Vec<&Order> {
        self.orders.iter().filter(|o| !o.is_filled()).collect()
    }

    pub fn open_positions(&self) -> Vec<&Position> {
        self.positions.iter().filter(|p| p.is_open()).collect()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}

impl crate::ports::broker_port::Broker for MatchingEngine {
    fn candles(&mut self, symbol: &str, count: usize) -> Result<CandleWindow, SimError> {
        MatchingEngine::candles(self, symbol, count)
    }

    fn price(&self, _symbol: &str, want_buy: bool) -> f64 {
        MatchingEngine::price(self, want_buy)
    }

    fn current_time(&self, _symbol: &str) -> EpochTime {
        MatchingEngine::current_time(self)
    }

    fn place_order(&mut self, spec: OrderSpec) -> Result<u64, SimError> {
        MatchingEngine::place_order(self, spec)
    }

    fn cancel_order(&mut self, id: u64) -> Result<(), SimError> {
        MatchingEngine::cancel_order(self, id)
    }

    fn close_position(&mut self, id: u64) -> Result<(), SimError> {
        MatchingEngine::close_position(self, id)
    }

    fn advance(&mut self) -> bool {
        MatchingEngine::advance(self)
    }

    fn nav(&self) -> f64 {
        MatchingEngine::nav(self)
    }

    fn pl(&self) -> f64 {
        MatchingEngine::pl(self)
    }

    fn open_orders(&self) -> Vec<&Order> {
        MatchingEngine::open_orders(self)
    }

    fn open_positions(&self) -> Vec<&Position> {
        MatchingEngine::open_positions(self)
    }

    fn drain_events(&mut self) -> Vec<EngineEvent> {
        MatchingEngine::drain_events(self)
    }

    fn spread_collected(&self) -> f64 {
        MatchingEngine::spread_collected(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn day(d: u32) -> EpochTime {
        EpochTime::from_date(NaiveDate::from_ymd_opt(2022, 1, d).unwrap())
    }

    fn sample_candles() -> Frame {
        let closes = [1.15, 1.2, 1.25, 1.1, 1.15, 1.2, 1.25, 1.1, 1.3];
        let mut frame = Frame::candles("EUR_USD");
        for (i, &close) in closes.iter().enumerate() {
            frame
                .push_candle(
                    day(i as u32 + 1),
                    1.1,
                    close + 0.1,
                    close - 0.1,
                    close,
                    100 + i as i64 * 15,
                )
                .unwrap();
        }
        frame
    }

    fn sample_engine() -> MatchingEngine {
        MatchingEngine::new(sample_candles(), EngineConfig::default(), Box::new(NoSlippage))
    }

    #[test]
    fn market_buy_fills_at_reference_close() {
        let mut engine = sample_engine();
        engine
            .place_order(OrderSpec::market("EUR_USD", 50_000.0, 0.0, 0.0))
            .unwrap();

        let positions = engine.open_positions();
        assert_eq!(positions.len(), 1);
        assert_relative_eq!(positions[0].entry_price, 1.15);
        assert_relative_eq!(engine.cash(), 100_000.0 - 57_500.0);
        assert_relative_eq!(engine.nav(), 100_000.0);
    }

    #[test]
    fn nav_and_pl_after_one_advance() {
        let mut engine = sample_engine();
        engine
            .place_order(OrderSpec::market("EUR_USD", 50_000.0, 0.0, 0.0))
            .unwrap();
        assert!(engine.advance());

        assert_relative_eq!(engine.pl(), 2_500.0, epsilon = 1e-6);
        assert_relative_eq!(engine.nav(), 102_500.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_units_is_rejected_without_state_change() {
        let mut engine = sample_engine();
        let result = engine.place_order(OrderSpec::market("EUR_USD", 0.0, 0.0, 0.0));
        assert!(matches!(result, Err(SimError::ZeroUnits { .. })));
        assert!(engine.open_positions().is_empty());
        assert_relative_eq!(engine.cash(), 100_000.0);
    }

    #[test]
    fn no_data_is_fatal() {
        let mut engine = MatchingEngine::new(
            Frame::candles("EUR_USD"),
            EngineConfig::default(),
            Box::new(NoSlippage),
        );
        assert!(matches!(
            engine.candles("EUR_USD", 3),
            Err(SimError::NoData { .. })
        ));
        assert!(matches!(
            engine.place_order(OrderSpec::market("EUR_USD", 1.0, 0.0, 0.0)),
            Err(SimError::NoData { .. })
        ));
    }

    #[test]
    fn candle_window_trails_the_cursor() {
        let mut engine = sample_engine();
        let window = engine.candles("EUR_USD", 3).unwrap();
        assert_eq!(window.frame.len(), 1);
        assert!(!window.exhausted);

        engine.advance();
        engine.advance();
        engine.advance();
        let window = engine.candles("EUR_USD", 3).unwrap();
        assert_eq!(window.frame.len(), 3);
        assert_relative_eq!(window.frame.close(-1), 1.1);
        assert_relative_eq!(window.frame.close(0), 1.2);
        assert!(!window.exhausted);
    }

    #[test]
    fn final_candle_arrives_with_exhausted_set() {
        let mut engine = sample_engine();
        for _ in 0..7 {
            assert!(engine.advance());
        }
        assert!(engine.advance());
        assert!(!engine.advance());

        let window = engine.candles("EUR_USD", 3).unwrap();
        assert!(window.exhausted);
        assert_relative_eq!(window.frame.close(-1), 1.3);
    }

    #[test]
    fn window_is_a_deep_copy() {
        let mut engine = sample_engine();
        let mut window = engine.candles("EUR_USD", 1).unwrap();
        window.frame.push_candle(day(20), 9.0, 9.0, 9.0, 9.0, 9).unwrap();
        assert_eq!(engine.data().unwrap().len(), 9);
    }

    #[test]
    fn spread_is_charged_against_the_trader() {
        let config = EngineConfig {
            spread: 0.01,
            ..EngineConfig::default()
        };
        let mut engine = MatchingEngine::new(sample_candles(), config, Box::new(NoSlippage));

        assert_relative_eq!(engine.ask(), 1.16);
        assert_relative_eq!(engine.bid(), 1.14);

        engine
            .place_order(OrderSpec::market("EUR_USD", 10_000.0, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(engine.open_positions()[0].entry_price, 1.16);
        assert_relative_eq!(engine.spread_collected(), 100.0);
    }

    #[test]
    fn zero_spread_round_trip_preserves_nav() {
        let mut engine = sample_engine();
        let start_nav = engine.nav();
        engine
            .place_order(OrderSpec::market("EUR_USD", 10_000.0, 0.0, 0.0))
            .unwrap();
        let id = engine.open_positions()[0].id;
        engine.close_position(id).unwrap();
        assert_relative_eq!(engine.nav(), start_nav, epsilon = 1e-9);
    }

    #[test]
    fn slippage_stays_within_the_configured_bound() {
        let config = EngineConfig {
            slippage: 0.01,
            ..EngineConfig::default()
        };
        let mut engine = MatchingEngine::new(
            sample_candles(),
            config,
            Box::new(RandomSlippage::seeded(7)),
        );
        engine
            .place_order(OrderSpec::market("EUR_USD", 1_000.0, 0.0, 0.0))
            .unwrap();
        let entry = engine.open_positions()[0].entry_price;
        assert!((entry - 1.15).abs() <= 0.01 * 1.15 / 2.0 + 1e-12);
    }

    #[test]
    fn seeded_slippage_is_reproducible() {
        let fill = |seed| {
            let config = EngineConfig {
                slippage: 0.01,
                ..EngineConfig::default()
            };
            let mut engine = MatchingEngine::new(
                sample_candles(),
                config,
                Box::new(RandomSlippage::seeded(seed)),
            );
            engine
                .place_order(OrderSpec::market("EUR_USD", 1_000.0, 0.0, 0.0))
                .unwrap();
            engine.open_positions()[0].entry_price
        };
        assert_relative_eq!(fill(42), fill(42));
    }

    #[test]
    fn limit_order_waits_for_range_cover() {
        let mut engine = sample_engine();
        // bar 0 spans [1.05, 1.25]; ask for a fill above it
        engine
            .place_order(OrderSpec::limit("EUR_USD", 10_000.0, 1.28, 0.0, 0.0))
            .unwrap();
        assert_eq!(engine.open_orders().len(), 1);

        // bar 1 closes 1.2, high 1.3: covered now
        engine.advance();
        assert!(engine.open_orders().is_empty());
        assert_relative_eq!(engine.open_positions()[0].entry_price, 1.28);
    }

    #[test]
    fn limit_order_inside_current_range_fills_at_once() {
        let mut engine = sample_engine();
        engine
            .place_order(OrderSpec::limit("EUR_USD", 10_000.0, 1.05, 0.0, 0.0))
            .unwrap();
        assert!(engine.open_orders().is_empty());
        assert_relative_eq!(engine.open_positions()[0].entry_price, 1.05);
    }

    #[test]
    fn limit_sell_fills_then_closes_at_the_take_profit() {
        let mut engine = sample_engine();
        engine
            .place_order(OrderSpec::limit("EUR_USD", -10_000.0, 1.28, 0.0, 1.08))
            .unwrap();
        assert_eq!(engine.open_orders().len(), 1);

        // bar 1 high of 1.3 covers the limit; the short enters at it
        engine.advance();
        assert!(engine.open_orders().is_empty());
        let pos = &engine.positions()[0];
        assert!(pos.is_open());
        assert!(pos.is_short());
        assert_relative_eq!(pos.entry_price, 1.28);

        // bar 2 never trades down to the target
        engine.advance();
        assert!(engine.positions()[0].is_open());

        // bar 3 low of 1.0 trades through it
        engine.advance();
        let pos = &engine.positions()[0];
        assert!(!pos.is_open());
        assert_eq!(pos.close_reason, Some(CloseReason::TakeProfit));
        assert_relative_eq!(pos.close_price, 1.08);
    }

    #[test]
    fn take_profit_wins_when_bar_covers_both_levels() {
        let mut engine = sample_engine();
        engine
            .place_order(OrderSpec::market("EUR_USD", 10_000.0, 1.12, 1.22))
            .unwrap();
        // bar 1 spans [1.1, 1.3]: covers the stop and the target
        engine.advance();

        let pos = &engine.positions()[0];
        assert!(!pos.is_open());
        assert_eq!(pos.close_reason, Some(CloseReason::TakeProfit));
        assert_relative_eq!(pos.close_price, 1.22);
    }

    #[test]
    fn stop_loss_closes_at_the_stop() {
        let mut engine = sample_engine();
        engine
            .place_order(OrderSpec::market("EUR_USD", 10_000.0, 1.02, 0.0))
            .unwrap();
        // bars 1 and 2 never trade down to the stop
        engine.advance();
        engine.advance();
        assert!(engine.positions()[0].is_open());

        // bar 3 low of 1.0 trades through it
        engine.advance();
        let pos = &engine.positions()[0];
        assert!(!pos.is_open());
        assert_eq!(pos.close_reason, Some(CloseReason::StopLoss));
        assert_relative_eq!(pos.close_price, 1.02);
    }

    #[test]
    fn trailing_stop_ratchets_then_closes() {
        let mut engine = sample_engine();
        engine
            .place_order(OrderSpec::market("EUR_USD", 10_000.0, -0.12, 0.0))
            .unwrap();
        // closes walk 1.2 then 1.25, ratcheting the stop to 1.13
        engine.advance();
        assert!(engine.positions()[0].is_open());
        engine.advance();
        assert_relative_eq!(engine.positions()[0].trailing_stop, 1.13, epsilon = 1e-12);

        // bar 3 low of 1.0 trades through the ratcheted stop
        engine.advance();
        let pos = &engine.positions()[0];
        assert!(!pos.is_open());
        assert_eq!(pos.close_reason, Some(CloseReason::TrailingStop));
        assert_relative_eq!(pos.close_price, 1.13, epsilon = 1e-12);
    }

    #[test]
    fn cancel_order_always_fails_and_leaves_it_pending() {
        let mut engine = sample_engine();
        let id = engine
            .place_order(OrderSpec::limit("EUR_USD", 10_000.0, 1.50, 0.0, 0.0))
            .unwrap();
        assert!(matches!(
            engine.cancel_order(id),
            Err(SimError::CancelUnsupported)
        ));
        assert_eq!(engine.open_orders().len(), 1);
        assert!(matches!(
            engine.cancel_order(9_999_999),
            Err(SimError::UnknownOrder { .. })
        ));
    }

    #[test]
    fn events_accumulate_until_drained() {
        let mut engine = sample_engine();
        engine
            .place_order(OrderSpec::market("EUR_USD", 10_000.0, 0.0, 0.0))
            .unwrap();
        let id = engine.open_positions()[0].id;
        engine.close_position(id).unwrap();

        let events = engine.drain_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], EngineEvent::OrderPlaced { .. }));
        assert!(matches!(events[1], EngineEvent::OrderFilled { .. }));
        assert!(matches!(
            events[2],
            EngineEvent::PositionClosed {
                reason: CloseReason::Manual,
                ..
            }
        ));
        assert!(engine.drain_events().is_empty());
    }
}
