pub mod client;

pub use client::{fetch_all, Downloader, FetchProgress, ModFetcher};
