//! "Now playing" metadata sources used to name captured documents.
//!
//! Providers implement [`NowPlayingProvider`] and are tried in order by a
//! [`NowPlayingChain`] until one reports something.
//!
//! Built-in providers:
//!
//! - [`MediaSession`] -- metadata pushed by the host's media player.
//! - [`DomHeuristics`] -- text scraped from a snapshot of the player page.

mod dom;
mod media_session;

pub use dom::{DomHeuristics, PageSnapshot};
pub use media_session::{ArtistRef, MediaItem, MediaSession};

use serde::{Deserialize, Serialize};

/// Title and artist of the media item currently playing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
}

impl NowPlaying {
    /// Build from optional parts, returning `None` when both are empty.
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Option<Self> {
        let np = Self {
            title: title.into(),
            artist: artist.into(),
        };
        (!np.is_empty()).then_some(np)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.artist.is_empty()
    }

    /// Non-empty parts joined as `"title - artist"`.
    pub fn label(&self) -> String {
        crate::filename::join_parts(&self.title, &self.artist)
    }
}

/// A source of [`NowPlaying`] information.
pub trait NowPlayingProvider: Send + Sync {
    /// Report the current item, or `None` if this source knows nothing.
    fn now_playing(&self) -> Option<NowPlaying>;
}

/// Providers consulted in insertion order; the first answer wins.
pub struct NowPlayingChain {
    providers: Vec<Box<dyn NowPlayingProvider>>,
}

impl NowPlayingChain {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Append a provider to the end of the chain.
    pub fn add(&mut self, provider: impl NowPlayingProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    pub fn lookup(&self) -> Option<NowPlaying> {
        self.providers.iter().find_map(|p| p.now_playing())
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for NowPlayingChain {
    fn default() -> Self {
        Self::new()
    }
}
