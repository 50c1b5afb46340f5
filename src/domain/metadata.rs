//! Token metadata sourced from a launch feed.
//!
//! The two launch strategies read the same feed payload differently: the
//! mountain strategy takes social links from the payload's top level, the
//! random strategy from the nested metadata object. Name, symbol and
//! description always come from the nested object.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::intent::TokenPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchStrategy {
    /// Copy the current king-of-the-hill token
    #[default]
    Mountain,
    /// Copy a freshly created token
    Random,
}

impl LaunchStrategy {
    pub fn map(&self, feed: &FeedPayload) -> TokenMetadata {
        match self {
            LaunchStrategy::Mountain => map_mountain(feed),
            LaunchStrategy::Random => map_random(feed),
        }
    }
}

impl FromStr for LaunchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mountain" | "koth" => Ok(LaunchStrategy::Mountain),
            "random" | "new" => Ok(LaunchStrategy::Random),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

impl fmt::Display for LaunchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchStrategy::Mountain => f.write_str("mountain"),
            LaunchStrategy::Random => f.write_str("random"),
        }
    }
}

/// Feed record as delivered by the launch-detection source
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPayload {
    #[serde(default)]
    pub mint: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub metadata: FeedMetadata,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMetadata {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub saved_image: Option<String>,
}

/// Metadata for the token about to be launched
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub twitter: String,
    pub telegram: String,
    pub website: String,
    /// Already-uploaded metadata URI, if the feed carried one
    pub uri: Option<String>,
    pub image: Option<String>,
}

impl TokenMetadata {
    /// Create-instruction payload; `uri` falls back to the feed's own URI
    pub fn into_payload(self, uri: Option<String>) -> Option<TokenPayload> {
        let uri = uri.or(self.uri)?;
        Some(TokenPayload {
            name: self.name,
            symbol: self.symbol,
            uri,
        })
    }
}

fn map_mountain(feed: &FeedPayload) -> TokenMetadata {
    let meta = &feed.metadata;
    TokenMetadata {
        name: meta.name.clone(),
        symbol: meta.symbol.clone(),
        description: meta.description.clone().unwrap_or_default(),
        twitter: feed.twitter.clone().unwrap_or_default(),
        telegram: feed.telegram.clone().unwrap_or_default(),
        website: feed.website.clone().unwrap_or_default(),
        uri: meta.uri.clone(),
        image: meta.saved_image.clone(),
    }
}

fn map_random(feed: &FeedPayload) -> TokenMetadata {
    let meta = &feed.metadata;
    TokenMetadata {
        name: meta.name.clone(),
        symbol: meta.symbol.clone(),
        description: meta.description.clone().unwrap_or_default(),
        twitter: meta.twitter.clone().unwrap_or_default(),
        telegram: meta.telegram.clone().unwrap_or_default(),
        website: meta.website.clone().unwrap_or_default(),
        uri: meta.uri.clone(),
        image: meta.saved_image.clone(),
    }
}
