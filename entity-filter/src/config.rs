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

use std::path::Path;

use config::Config;
use entity_filter_error::FilterError;
use entity_filter_error::FilterResult;
use serde::Deserialize;
use serde::Serialize;

/// Tuning knobs for a [`FilterEngine`](crate::engine::FilterEngine).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterEngineConfig {
    /// Total number of compiled predicates kept across all cache shards.
    #[serde(alias = "predicateCacheCapacity")]
    pub predicate_cache_capacity: usize,

    #[serde(alias = "predicateCacheShards")]
    pub predicate_cache_shards: usize,

    /// Freeze the filter store when the first session begins.
    #[serde(alias = "activateOnFirstSession")]
    pub activate_on_first_session: bool,
}

impl Default for FilterEngineConfig {
    fn default() -> Self {
        FilterEngineConfig {
            predicate_cache_capacity: 1024,
            predicate_cache_shards: 16,
            activate_on_first_session: true,
        }
    }
}

impl FilterEngineConfig {
    /// Loads the configuration from a file, inferring the format from its
    /// extension. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> FilterResult<Self> {
        let cfg = Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()
            .map_err(|e| FilterError::config(e.to_string()))?;
        let config = cfg
            .try_deserialize::<FilterEngineConfig>()
            .map_err(|e| FilterError::config(e.to_string()))?;
        Ok(config.normalized())
    }

    /// Clamps the cache settings into a usable range: at least one entry,
    /// and between one shard and one shard per entry.
    pub fn normalized(mut self) -> Self {
        self.predicate_cache_capacity = self.predicate_cache_capacity.max(1);
        self.predicate_cache_shards = self.predicate_cache_shards.clamp(1, self.predicate_cache_capacity);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_values() {
        let config = FilterEngineConfig::default();
        assert_eq!(config.predicate_cache_capacity, 1024);
        assert_eq!(config.predicate_cache_shards, 16);
        assert!(config.activate_on_first_session);
    }

    #[test]
    fn loads_partial_file_with_defaults() {
        let file = write_config("predicate_cache_capacity = 64\n");
        let config = FilterEngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.predicate_cache_capacity, 64);
        assert_eq!(config.predicate_cache_shards, 16);
        assert!(config.activate_on_first_session);
    }

    #[test]
    fn loads_full_file() {
        let file = write_config(
            "predicate_cache_capacity = 8\npredicate_cache_shards = 2\nactivate_on_first_session = false\n",
        );
        let config = FilterEngineConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config,
            FilterEngineConfig {
                predicate_cache_capacity: 8,
                predicate_cache_shards: 2,
                activate_on_first_session: false,
            }
        );
    }

    #[test]
    fn invalid_file_is_config_error() {
        let file = write_config("predicate_cache_capacity = \"many\"\n");
        let err = FilterEngineConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, FilterError::Config(_)));

        let err = FilterEngineConfig::from_file("/nonexistent/entity-filter.toml").unwrap_err();
        assert!(matches!(err, FilterError::Config(_)));
    }

    #[test]
    fn normalized_clamps_cache_settings() {
        let config = FilterEngineConfig {
            predicate_cache_capacity: 0,
            predicate_cache_shards: 0,
            activate_on_first_session: true,
        }
        .normalized();
        assert_eq!(config.predicate_cache_capacity, 1);
        assert_eq!(config.predicate_cache_shards, 1);

        let config = FilterEngineConfig {
            predicate_cache_capacity: 4,
            predicate_cache_shards: 64,
            activate_on_first_session: true,
        }
        .normalized();
        assert_eq!(config.predicate_cache_shards, 4);
    }
}
