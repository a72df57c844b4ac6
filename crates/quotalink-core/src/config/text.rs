//! Compact collection list: `name=count:window[,name=count:window...]`.
//!
//! Windows are humantime durations (`30s`, `1m`, `1h 30m`). Contexts declared
//! this way carry no links and use a single fixed window.

use std::str::FromStr;

use super::{ContextConfig, EngineConfig, RateConfig};
use crate::error::ConfigError;

const RATE_SEPARATOR: char = ',';
const NAME_SEPARATOR: char = '=';
const COUNT_WINDOW_SEPARATOR: char = ':';

fn malformed(entry: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::MalformedRate {
        msg: format!("rate {entry:?}: {reason}"),
    }
}

fn parse_context(entry: &str) -> Result<ContextConfig, ConfigError> {
    let entry = entry.trim();

    let (name, rate) = entry
        .split_once(NAME_SEPARATOR)
        .ok_or_else(|| malformed(entry, "no name in rate"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(malformed(entry, "no name in rate"));
    }

    let (count, window) = rate
        .split_once(COUNT_WINDOW_SEPARATOR)
        .ok_or_else(|| malformed(entry, "no count in rate"))?;

    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|e| malformed(entry, format!("parse rate count: {e}")))?;
    let window = humantime::parse_duration(window.trim())
        .map_err(|e| malformed(entry, format!("parse window: {e}")))?;

    Ok(ContextConfig::new(name, RateConfig::new(count, window)))
}

impl FromStr for EngineConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let contexts = s
            .split(RATE_SEPARATOR)
            .map(parse_context)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EngineConfig::new(contexts))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::DEFAULT_SWEEP_INTERVAL;

    #[test]
    fn test_two_contexts() {
        let config: EngineConfig = "foo=100:1m, bar=1000:30s".parse().unwrap();

        assert_eq!(
            config,
            EngineConfig::new(vec![
                ContextConfig::new("foo", RateConfig::new(100, Duration::from_secs(60))),
                ContextConfig::new("bar", RateConfig::new(1000, Duration::from_secs(30))),
            ])
        );
        assert_eq!(config.sweep_interval, DEFAULT_SWEEP_INTERVAL);
    }

    macro_rules! malformed_rate_tests {
        ($($name:ident: $value:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let (input, reason): (&str, &str) = $value;
                    match input.parse::<EngineConfig>() {
                        Err(ConfigError::MalformedRate { msg }) => {
                            assert!(msg.contains(reason), "unexpected message: {msg}")
                        }
                        other => panic!("expected malformed rate, got {other:?}"),
                    }
                }
            )*
        }
    }

    malformed_rate_tests! {
        empty_config: ("", "no name in rate"),
        no_name_separator: ("100:1m", "no name in rate"),
        empty_name: ("=100:1m", "no name in rate"),
        no_count_separator: ("foo=100", "no count in rate"),
        bad_count: ("foo=many:1m", "parse rate count"),
        bad_duration: ("foo=100:50 minuten", "parse window"),
        second_entry_invalid: ("foo=100:1m,bar", "no name in rate"),
    }
}
