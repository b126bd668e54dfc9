// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Log module provides the log system init function, reference
//! https://docs.rs/log4rs

#[cfg(file_log)]
use crate::util::get_abs_path;
use crate::error::LogError;
use log::LevelFilter;

#[cfg(file_log)]
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

/// Parse a level name as written in spechack.toml, unknown names fall back to info.
pub fn level_from_str(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// init logs system
#[allow(unused)]
pub fn init_log(level: LevelFilter, file_path: &str) -> Result<(), LogError> {
    #[cfg(wasm)]
    {
        wasm_logger::init(wasm_logger::Config::default());
        Ok(())
    }
    #[cfg(file_log)]
    {
        let fpstr = get_abs_path(file_path);
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(
                "{d(%Y-%m-%d %H:%M:%S)} {l} {t} {m}{n}",
            )))
            .build(&fpstr)
            .map_err(|source| LogError::File {
                path: fpstr.clone(),
                source,
            })?;
        let config = Config::builder()
            .appender(
                Appender::builder()
                    .filter(Box::new(ThresholdFilter::new(level)))
                    .build("logfile", Box::new(logfile)),
            )
            .build(Root::builder().appender("logfile").build(level))
            .map_err(|e| LogError::Config(e.to_string()))?;
        log4rs::init_config(config).map_err(|e| LogError::Config(e.to_string()))?;
        Ok(())
    }
    #[cfg(all(not(wasm), not(file_log)))]
    {
        log::set_max_level(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(level_from_str("debug"), LevelFilter::Debug);
        assert_eq!(level_from_str("WARN"), LevelFilter::Warn);
        assert_eq!(level_from_str("nonsense"), LevelFilter::Info);
    }
}
