//! Thumbnail URL variants.
//!
//! Catalog thumbnails come in two flavours: sized URLs carrying a
//! `w<N>-h<N>` token, and video stills named `sddefault`, `hqdefault` or
//! `maxresdefault`. Both can be rewritten to ask for a different size.

use std::sync::LazyLock;

use regex::Regex;

/// Edge length requested for the maximum variant.
pub const MAXIMUM_SIZE: u32 = 640;

static SIZE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"w\d+-h\d+").expect("valid size token regex"));

/// Named still resolutions, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Maximum,
    High,
    Standard,
}

impl Resolution {
    pub fn token(&self) -> &'static str {
        match self {
            Resolution::Maximum => "maxresdefault",
            Resolution::High => "hqdefault",
            Resolution::Standard => "sddefault",
        }
    }
}

/// Rewrite every `w<N>-h<N>` token to a square of `size`.
pub fn upscale(url: &str, size: u32) -> String {
    SIZE_TOKEN
        .replace_all(url, format!("w{size}-h{size}").as_str())
        .into_owned()
}

/// Largest variant worth asking for.
pub fn maximum_variant(url: &str) -> String {
    upscale(url, MAXIMUM_SIZE).replace(Resolution::Standard.token(), Resolution::Maximum.token())
}

/// Lower resolutions to try when `url` fails, without repeats.
pub fn fallback_chain(url: &str) -> Vec<String> {
    let mut chain: Vec<String> = Vec::with_capacity(2);
    for resolution in [Resolution::High, Resolution::Standard] {
        let candidate = url.replace(Resolution::Maximum.token(), resolution.token());
        if candidate != url && !chain.contains(&candidate) {
            chain.push(candidate);
        }
    }
    chain
}

/// A URL to load plus the URLs to fall back to, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTarget {
    pub primary: String,
    pub fallbacks: Vec<String>,
}

impl AssetTarget {
    /// Primary followed by fallbacks.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

/// Target for a slot: the active track gets the maximum variant, the rest
/// load what the catalog gave us. Every slot falls back along the chain of
/// the maximum variant, minus its own primary.
pub fn target_for(thumbnail: &str, active: bool) -> AssetTarget {
    let maximum = maximum_variant(thumbnail);
    let primary = if active {
        maximum.clone()
    } else {
        thumbnail.to_string()
    };
    let fallbacks = fallback_chain(&maximum)
        .into_iter()
        .filter(|url| *url != primary)
        .collect();
    AssetTarget { primary, fallbacks }
}
