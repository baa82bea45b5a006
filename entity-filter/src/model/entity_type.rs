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

use std::borrow::Borrow;
use std::fmt;

use cheetah_string::CheetahString;
use serde::Deserialize;
use serde::Serialize;

/// Identifier of a queryable entity shape, e.g. `BlogEntry`.
///
/// Filters and schemas are keyed by this name. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(CheetahString);

impl EntityType {
    pub fn new(name: impl Into<CheetahString>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for EntityType {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for EntityType {
    fn from(name: &str) -> Self {
        Self(CheetahString::from(name))
    }
}

impl From<String> for EntityType {
    fn from(name: String) -> Self {
        Self(CheetahString::from(name))
    }
}

impl From<&EntityType> for EntityType {
    fn from(entity_type: &EntityType) -> Self {
        entity_type.clone()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn entity_type_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(EntityType::from("BlogEntry"), 1);
        assert_eq!(map.get("BlogEntry"), Some(&1));
        assert_eq!(map.get("Tenant"), None);
    }

    #[test]
    fn entity_type_display() {
        assert_eq!(format!("{}", EntityType::new("BlogEntry")), "BlogEntry");
        assert_eq!(EntityType::from(String::from("Tenant")).as_str(), "Tenant");
    }
}
