// Copyright 2023 The Entity Filter Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::str::FromStr;

use entity_filter_error::FilterError;
use tracing_subscriber::EnvFilter;

/// Initializes the logger with the specified configuration.
///
/// This function sets up the logger using the `tracing_subscriber` crate.
/// It reads filter directives from the `RUST_LOG` environment variable, so both a plain level
/// (`debug`) and per-target directives (`info,entity_filter=debug`) work. An unset, empty or
/// unparsable value falls back to "INFO". The logger is configured to include thread names, log
/// levels, line numbers, and thread IDs in the log output.
///
/// Calling it again after a global subscriber is installed has no effect.
pub fn init_logger() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_level(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_env_filter(env_filter(directives.as_deref()))
        .try_init();
}

fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

pub fn init_logger_with_level(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_level(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_max_level(level.as_tracing())
        .try_init();
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Level(&'static str);

impl Level {
    /// Constant representing the ERROR log level.
    pub const ERROR: Level = Level("ERROR");

    /// Constant representing the WARN log level.
    pub const WARN: Level = Level("WARN");

    /// Constant representing the INFO log level.
    pub const INFO: Level = Level("INFO");

    /// Constant representing the DEBUG log level.
    pub const DEBUG: Level = Level("DEBUG");

    /// Constant representing the TRACE log level.
    pub const TRACE: Level = Level("TRACE");

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    fn as_tracing(&self) -> tracing::Level {
        tracing::Level::from_str(self.0).unwrap_or(tracing::Level::INFO)
    }
}

impl TryFrom<&str> for Level {
    type Error = FilterError;

    fn try_from(level: &str) -> Result<Self, Self::Error> {
        match level.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Level::ERROR),
            "WARN" => Ok(Level::WARN),
            "INFO" => Ok(Level::INFO),
            "DEBUG" => Ok(Level::DEBUG),
            "TRACE" => Ok(Level::TRACE),
            _ => Err(FilterError::config(format!("Invalid log level: {level}"))),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.0)
    }
}
