use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;

use crate::data_models::Source;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        bind_addr: get_env_or_default("BAZAAR_BIND_ADDR", "0.0.0.0:3000"),
        max_concurrent_sites: get_parsed_or_default("BAZAAR_MAX_CONCURRENT_SITES", 2),
        retry_attempts: get_parsed_or_default("BAZAAR_RETRY_ATTEMPTS", 3),
        retry_base_delay_ms: get_parsed_or_default("BAZAAR_RETRY_BASE_DELAY_MS", 400),
        sites: parse_sites(&get_env_or_default("BAZAAR_SITES", "")),
        static_dir: get_env_or_default("BAZAAR_STATIC_DIR", "static"),
    }
});

pub struct Config {
    pub bind_addr: String,
    pub max_concurrent_sites: usize,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub sites: Vec<Source>,
    pub static_dir: String,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_parsed_or_default<T: FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring malformed {key}={raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Comma separated source ids. Unknown ids are skipped; an empty list means the default registry.
pub fn parse_sites(raw: &str) -> Vec<Source> {
    let mut sites = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match id.parse::<Source>() {
            Ok(source) if !sites.contains(&source) => sites.push(source),
            Ok(_) => {}
            Err(e) => log::warn!("{e}"),
        }
    }
    if sites.is_empty() {
        return Source::REGISTERED.to_vec();
    }
    sites
}
