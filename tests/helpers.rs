#![allow(dead_code)]

use async_trait::async_trait;
use livedash::error::{Error, Result};
use livedash::providers::{CryptoProvider, NewsProvider, Providers, WeatherProvider};
use livedash::store::{
    CryptoQuote, CryptoRecord, HistoryPoint, NewsItem, WeatherNow, WeatherRecord, WeatherSample,
};
use livedash::stream::{FeedFrame, PriceFeed};
use livedash::types::Timestamp;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One scripted provider answer: wait `delay`, then succeed with the value
/// or fail with a transport error.
#[derive(Clone, Debug)]
pub struct Scripted<T> {
    pub delay: Duration,
    pub outcome: Option<T>,
}

impl<T> Scripted<T> {
    pub fn ok(value: T) -> Self {
        Scripted { delay: Duration::ZERO, outcome: Some(value) }
    }

    pub fn fail() -> Self {
        Scripted { delay: Duration::ZERO, outcome: None }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

async fn play<T>(step: Scripted<T>, what: &str) -> Result<T> {
    if !step.delay.is_zero() {
        tokio::time::sleep(step.delay).await;
    }
    step.outcome.ok_or_else(|| Error::Transport(format!("{} unavailable", what)))
}

pub fn weather_record(id: &str, name: &str, temperature: f64) -> WeatherRecord {
    WeatherRecord::new(id, name, WeatherNow {
        temperature,
        humidity: 60.0,
        description: "clear sky".to_string(),
        icon: "01d".to_string(),
        lat: 0.0,
        lon: 0.0,
    })
}

pub fn crypto_record(id: &str, price: f64) -> CryptoRecord {
    let mut chars = id.chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    CryptoRecord::new(id, name, CryptoQuote {
        symbol: id.chars().take(3).collect(),
        price,
        change_24h_percent: 0.0,
        market_cap: 0.0,
        provider_updated_at: "2024-03-01T00:00:00Z".to_string(),
    })
}

pub fn news_item(n: usize) -> NewsItem {
    NewsItem {
        id: format!("article-{}", n),
        title: format!("Headline {}", n),
        description: None,
        url: format!("https://news.example/{}", n),
        source: "example".to_string(),
        published_at: "2024-03-01 00:00:00".to_string(),
    }
}

/// Per-location answers; a location without a script fails.
#[derive(Default)]
pub struct FakeWeather {
    current: Mutex<HashMap<String, Scripted<WeatherRecord>>>,
    forecasts: Mutex<HashMap<String, Vec<HistoryPoint<WeatherSample>>>>,
    pub calls: AtomicUsize,
}

impl FakeWeather {
    pub fn with(self, location: &str, step: Scripted<WeatherRecord>) -> Self {
        self.current.lock().insert(location.to_string(), step);
        self
    }

    pub fn with_forecast(self, location: &str, points: Vec<HistoryPoint<WeatherSample>>) -> Self {
        self.forecasts.lock().insert(location.to_string(), points);
        self
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current(&self, location: &str) -> Result<WeatherRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.current.lock().get(location).cloned().unwrap_or_else(Scripted::fail);
        play(step, location).await
    }

    async fn forecast(&self, location: &str) -> Result<Vec<HistoryPoint<WeatherSample>>> {
        let points = self.forecasts.lock().get(location).cloned();
        points.ok_or_else(|| Error::Transport(format!("no forecast for {}", location)))
    }
}

/// Per-asset queues of answers. Once a queue is down to one answer that
/// answer repeats.
#[derive(Default)]
pub struct FakeCrypto {
    quotes: Mutex<HashMap<String, VecDeque<Scripted<CryptoRecord>>>>,
    histories: Mutex<HashMap<String, Vec<HistoryPoint<f64>>>>,
    pub calls: AtomicUsize,
}

impl FakeCrypto {
    pub fn with(self, asset: &str, steps: Vec<Scripted<CryptoRecord>>) -> Self {
        self.quotes.lock().insert(asset.to_string(), steps.into());
        self
    }

    pub fn with_history(self, asset: &str, points: Vec<HistoryPoint<f64>>) -> Self {
        self.histories.lock().insert(asset.to_string(), points);
        self
    }
}

#[async_trait]
impl CryptoProvider for FakeCrypto {
    async fn quote(&self, asset_id: &str) -> Result<CryptoRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut quotes = self.quotes.lock();
            match quotes.get_mut(asset_id) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        play(step.unwrap_or_else(Scripted::fail), asset_id).await
    }

    async fn history(&self, asset_id: &str, _days: u32) -> Result<Vec<HistoryPoint<f64>>> {
        let points = self.histories.lock().get(asset_id).cloned();
        points.ok_or_else(|| Error::Transport(format!("no history for {}", asset_id)))
    }
}

#[derive(Default)]
pub struct FakeNews {
    items: Mutex<Option<Vec<NewsItem>>>,
    pub calls: AtomicUsize,
}

impl FakeNews {
    pub fn with(self, items: Vec<NewsItem>) -> Self {
        *self.items.lock() = Some(items);
        self
    }
}

#[async_trait]
impl NewsProvider for FakeNews {
    async fn headlines(&self, _query: &str, limit: usize) -> Result<Vec<NewsItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let items = self.items.lock().clone();
        items
            .map(|items| items.into_iter().take(limit).collect())
            .ok_or_else(|| Error::Transport("news unavailable".to_string()))
    }
}

pub struct Fakes {
    pub weather: Arc<FakeWeather>,
    pub crypto: Arc<FakeCrypto>,
    pub news: Arc<FakeNews>,
}

impl Fakes {
    pub fn new(weather: FakeWeather, crypto: FakeCrypto, news: FakeNews) -> Self {
        Fakes {
            weather: Arc::new(weather),
            crypto: Arc::new(crypto),
            news: Arc::new(news),
        }
    }

    /// Every default watch-list entry answers successfully.
    pub fn healthy() -> Self {
        let weather = FakeWeather::default()
            .with("New York", Scripted::ok(weather_record("5128581", "New York", 18.0)))
            .with("London", Scripted::ok(weather_record("2643743", "London", 11.0)))
            .with("Tokyo", Scripted::ok(weather_record("1850147", "Tokyo", 22.0)));
        let crypto = FakeCrypto::default()
            .with("bitcoin", vec![Scripted::ok(crypto_record("bitcoin", 60_000.0))])
            .with("ethereum", vec![Scripted::ok(crypto_record("ethereum", 3_000.0))])
            .with("solana", vec![Scripted::ok(crypto_record("solana", 150.0))]);
        let news = FakeNews::default().with((1..=8).map(news_item).collect());
        Self::new(weather, crypto, news)
    }

    pub fn providers(&self) -> Providers {
        Providers {
            weather: self.weather.clone(),
            crypto: self.crypto.clone(),
            news: self.news.clone(),
        }
    }
}

pub fn history(prices: &[f64]) -> Vec<HistoryPoint<f64>> {
    prices.iter()
        .enumerate()
        .map(|(day, price)| HistoryPoint::new(Timestamp::from_secs(day as u64 * 86_400), *price))
        .collect()
}

/// What a scripted connection does on each read.
#[derive(Clone, Debug)]
pub enum Read {
    Text(String),
    CleanClose,
    UncleanClose,
    Error,
}

/// One connect attempt: refused, or accepted with a list of reads. An
/// accepted connection whose reads run out stays open and silent.
#[derive(Clone, Debug)]
pub enum Step {
    Refuse,
    Open(Vec<Read>),
}

pub fn ticks(asset: &str, prices: &[&str]) -> Vec<Read> {
    prices.iter()
        .map(|p| Read::Text(format!(r#"{{"{}":"{}"}}"#, asset, p)))
        .collect()
}

#[derive(Debug, Default)]
pub struct FeedProbe {
    pub connects: AtomicUsize,
    pub closes: AtomicUsize,
}

impl FeedProbe {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// A `PriceFeed` that replays a script. Once the script runs out every
/// connect is refused.
pub struct ScriptedFeed {
    steps: VecDeque<Step>,
    reads: Option<VecDeque<Read>>,
    probe: Arc<FeedProbe>,
}

impl ScriptedFeed {
    pub fn new(steps: Vec<Step>) -> (Self, Arc<FeedProbe>) {
        let probe = Arc::new(FeedProbe::default());
        let feed = ScriptedFeed {
            steps: steps.into(),
            reads: None,
            probe: probe.clone(),
        };
        (feed, probe)
    }
}

#[async_trait]
impl PriceFeed for ScriptedFeed {
    async fn connect(&mut self) -> Result<()> {
        self.probe.connects.fetch_add(1, Ordering::SeqCst);
        match self.steps.pop_front() {
            Some(Step::Open(reads)) => {
                self.reads = Some(reads.into());
                Ok(())
            }
            Some(Step::Refuse) | None => Err(Error::ConnectionFailed("refused".to_string())),
        }
    }

    async fn next_frame(&mut self) -> Result<FeedFrame> {
        let reads = self.reads.as_mut().ok_or(Error::NotConnected)?;
        let Some(read) = reads.pop_front() else {
            return std::future::pending().await;
        };

        match read {
            Read::Text(text) => Ok(FeedFrame::Text(text)),
            Read::CleanClose => {
                self.reads = None;
                Ok(FeedFrame::Closed { clean: true })
            }
            Read::UncleanClose => {
                self.reads = None;
                Ok(FeedFrame::Closed { clean: false })
            }
            Read::Error => {
                self.reads = None;
                Err(Error::ConnectionFailed("reset by peer".to_string()))
            }
        }
    }

    async fn close(&mut self) {
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
        self.reads = None;
    }

    fn source_id(&self) -> &str {
        "scripted"
    }
}
