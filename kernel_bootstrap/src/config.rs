//! Boot configuration from the kernel command line
//!
//! The command line is a whitespace separated list of `key=value` options:
//!
//! | key              | values                                   | default |
//! |------------------|------------------------------------------|---------|
//! | `loglevel`       | `off` `error` `warn` `info` `debug` `trace` | `info`  |
//! | `console.clear`  | `0` `1`                                  | `1`     |
//! | `console.cursor` | `keep` `reset`                           | `reset` |
//!
//! Bad options never abort the boot. They are reported through
//! [`settings`] and the default stays in effect.

use log::LevelFilter;
use thiserror::Error;

/// Errors from a single command line option
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError<'a> {
    #[error("unknown option `{0}`")]
    UnknownKey(&'a str),

    #[error("option `{0}` needs a value")]
    MissingValue(&'a str),

    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue { key: &'a str, value: &'a str },
}

/// Where the console cursor starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Adopt the position the firmware left in the CRTC
    Keep,
    /// Start at the top-left cell
    Reset,
}

/// One recognised option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    LogLevel(LevelFilter),
    ClearScreen(bool),
    Cursor(CursorMode),
}

/// Effective boot configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootConfig {
    pub log_level: LevelFilter,
    pub clear_screen: bool,
    pub cursor: CursorMode,
}

impl BootConfig {
    pub const DEFAULT: Self = Self {
        log_level: LevelFilter::Info,
        clear_screen: true,
        cursor: CursorMode::Reset,
    };

    /// Builds the configuration, skipping options that fail to parse
    pub fn from_cmdline(cmdline: &str) -> Self {
        let mut config = Self::DEFAULT;
        for setting in settings(cmdline).filter_map(Result::ok) {
            config.apply(setting);
        }
        config
    }

    /// Applies one option; later options win
    pub fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::LogLevel(level) => self.log_level = level,
            Setting::ClearScreen(clear) => self.clear_screen = clear,
            Setting::Cursor(mode) => self.cursor = mode,
        }
    }
}

impl Default for BootConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parses every option on the command line, in order
pub fn settings(cmdline: &str) -> impl Iterator<Item = Result<Setting, ConfigError<'_>>> {
    cmdline.split_ascii_whitespace().map(parse_option)
}

fn parse_option(option: &str) -> Result<Setting, ConfigError<'_>> {
    let (key, value) = option
        .split_once('=')
        .ok_or(ConfigError::MissingValue(option))?;
    let invalid = || ConfigError::InvalidValue { key, value };

    match key {
        "loglevel" => value
            .parse::<LevelFilter>()
            .map(Setting::LogLevel)
            .map_err(|_| invalid()),
        "console.clear" => match value {
            "0" => Ok(Setting::ClearScreen(false)),
            "1" => Ok(Setting::ClearScreen(true)),
            _ => Err(invalid()),
        },
        "console.cursor" => match value {
            "keep" => Ok(Setting::Cursor(CursorMode::Keep)),
            "reset" => Ok(Setting::Cursor(CursorMode::Reset)),
            _ => Err(invalid()),
        },
        _ => Err(ConfigError::UnknownKey(key)),
    }
}
