//! Metadata pushed by the host's media player.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;

use super::{NowPlaying, NowPlayingProvider};

/// The player's current media item, as reported by the host.
///
/// Deserializes from the camelCase shape media player APIs expose
/// (`title`, `artistName`, `artist.name`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaItem {
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub artist: Option<ArtistRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArtistRef {
    pub name: Option<String>,
}

/// Shared slot the host updates whenever playback changes.
///
/// Clones share the same slot, so keep one clone to update and register
/// another as a provider.
#[derive(Clone, Default)]
pub struct MediaSession {
    item: Arc<RwLock<Option<MediaItem>>>,
}

impl MediaSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current media item.
    pub fn set_item(&self, item: MediaItem) {
        *self.item.write().unwrap_or_else(PoisonError::into_inner) = Some(item);
    }

    /// Forget the current media item, e.g. when playback stops.
    pub fn clear(&self) {
        *self.item.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

impl NowPlayingProvider for MediaSession {
    fn now_playing(&self) -> Option<NowPlaying> {
        let guard = self.item.read().unwrap_or_else(PoisonError::into_inner);
        let item = guard.as_ref()?;

        let title = non_empty(&item.title).unwrap_or_default();
        let artist = non_empty(&item.artist_name)
            .or_else(|| item.artist.as_ref().and_then(|a| non_empty(&a.name)))
            .unwrap_or_default();

        NowPlaying::new(title, artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_session_reports_nothing() {
        assert_eq!(MediaSession::new().now_playing(), None);
    }

    #[test]
    fn artist_falls_back_to_nested_artist_name() {
        let session = MediaSession::new();
        session.set_item(
            serde_json::from_str(r#"{"title":"Song","artistName":"","artist":{"name":"Nested"}}"#)
                .unwrap(),
        );
        assert_eq!(session.now_playing(), NowPlaying::new("Song", "Nested"));
    }

    #[test]
    fn item_without_title_or_artist_reports_nothing() {
        let session = MediaSession::new();
        session.set_item(MediaItem::default());
        assert_eq!(session.now_playing(), None);
    }

    #[test]
    fn clear_resets_the_slot() {
        let session = MediaSession::new();
        session.set_item(MediaItem {
            title: Some("Song".into()),
            ..Default::default()
        });
        let provider = session.clone();
        assert!(provider.now_playing().is_some());
        session.clear();
        assert_eq!(provider.now_playing(), None);
    }
}
