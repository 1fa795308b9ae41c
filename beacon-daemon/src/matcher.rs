/*!
 * SSID Matcher
 * Finds the phone artifact network family in scan text
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DetectError;
use crate::network::ScanResult;

/// Artifact SSIDs carry a two-digit randomized suffix after the family name.
pub const SUFFIX_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPrefix(String);

impl TargetPrefix {
    pub fn new(prefix: impl Into<String>) -> Result<Self, DetectError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(DetectError::Config("target prefix must not be empty".into()));
        }
        Ok(Self(prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full network name: the prefix followed by exactly [`SUFFIX_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedNetwork(String);

impl MatchedNetwork {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MatchedNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn find_target_network(result: &ScanResult, prefix: &TargetPrefix) -> Option<MatchedNetwork> {
    find_in_text(&result.text(), prefix)
}

/// Only the first occurrence of the prefix is considered. The suffix is taken
/// verbatim; a suffix cut short by the end of the text means no match.
pub fn find_in_text(text: &str, prefix: &TargetPrefix) -> Option<MatchedNetwork> {
    let start = text.find(prefix.as_str())?;
    let tail = &text[start + prefix.as_str().len()..];

    let suffix: String = tail.chars().take(SUFFIX_LEN).collect();
    if suffix.chars().count() < SUFFIX_LEN {
        return None;
    }

    Some(MatchedNetwork(format!("{}{}", prefix.as_str(), suffix)))
}
