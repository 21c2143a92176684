// src/config/consts.rs

// Local store
pub const STORE_DIR: &str = "data/vaccinations";

// Merge
// Most recent day(s) of a fresh batch are presumed still being revised at
// the source. 1 = drop the batch max date and the day before it.
pub const MARGIN_DAYS: i64 = 1;

// Net
pub const USER_AGENT: &str = "vax_scrape/0.6";
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// Concurrency
pub const WORKERS: usize = 4;
pub const REQUEST_PAUSE_MS: u64 = 250; // be polite
pub const JITTER_MS: u64 = 100; // extra 0..100 ms
