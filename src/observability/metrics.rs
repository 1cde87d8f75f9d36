use lazy_static::lazy_static;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
};
use crate::error::{Error, Result};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Stream metrics
    pub static ref TICKS_PROCESSED: IntCounter = IntCounter::new(
        "price_ticks_processed_total",
        "Total number of price ticks applied to the store"
    ).expect("valid metric definition");

    pub static ref MALFORMED_FRAMES: IntCounter = IntCounter::new(
        "price_frames_malformed_total",
        "Total number of stream frames or entries that failed to parse"
    ).expect("valid metric definition");

    pub static ref RECONNECT_ATTEMPTS: IntCounter = IntCounter::new(
        "price_stream_reconnect_attempts_total",
        "Total number of price stream reconnect attempts"
    ).expect("valid metric definition");

    // Alert metrics
    pub static ref ALERTS_EMITTED: IntCounterVec = IntCounterVec::new(
        Opts::new("alerts_emitted_total", "Total number of alerts appended to the log"),
        &["kind"]
    ).expect("valid metric definition");

    // Refresh metrics
    pub static ref REFRESH_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("refresh_failures_total", "Total number of failed resource fetches"),
        &["kind"]
    ).expect("valid metric definition");

    pub static ref REFRESH_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "refresh_batch_latency_seconds",
            "Bulk refresh batch latency"
        ).buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
    ).expect("valid metric definition");
}

pub fn register_metrics() -> Result<()> {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(TICKS_PROCESSED.clone()),
        Box::new(MALFORMED_FRAMES.clone()),
        Box::new(RECONNECT_ATTEMPTS.clone()),
        Box::new(ALERTS_EMITTED.clone()),
        Box::new(REFRESH_FAILURES.clone()),
        Box::new(REFRESH_LATENCY.clone()),
    ];

    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(Error::Metrics(e.to_string())),
        }
    }
    Ok(())
}

/// Text exposition of the registry, for the periodic status log line.
pub fn render() -> Result<String> {
    use prometheus::Encoder;

    let mut buffer = Vec::new();
    prometheus::TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| Error::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| Error::Metrics(e.to_string()))
}
