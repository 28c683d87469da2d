//! Deriving a safe `.ttml` filename for a captured document.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::now_playing::{NowPlaying, NowPlayingChain};

/// File extension appended to every derived or custom name.
pub const EXTENSION: &str = ".ttml";

/// Name used when neither metadata nor payload identify the track.
pub const FALLBACK_STEM: &str = "lyrics";

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-\s]").expect("valid regex"));

/// Replace every character outside `[A-Za-z0-9_-]` and whitespace with `_`.
pub fn sanitize(name: &str) -> String {
    DISALLOWED.replace_all(name, "_").into_owned()
}

/// Join the non-empty parts as `"title - artist"`.
pub(crate) fn join_parts(title: &str, artist: &str) -> String {
    [title, artist]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" - ")
}

fn first_string<'a>(obj: Option<&'a Value>, keys: &[&str]) -> &'a str {
    keys.iter()
        .filter_map(|k| obj?.get(*k)?.as_str())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Derive a filename from now-playing info, falling back to the payload.
///
/// Tries, in order: the now-playing title and artist; the first data item's
/// `name`/`title` and `artistName`/`composerName`; its `playParams.id`,
/// `playParams.catalogId` or own `id`; and finally [`FALLBACK_STEM`]. The
/// result is sanitized and always ends in [`EXTENSION`].
///
/// # Example
///
/// ```
/// use ttml_capture::{NowPlaying, derive_filename};
///
/// let np = NowPlaying::new("Song: Title?", "A/B");
/// assert_eq!(derive_filename(np.as_ref(), &serde_json::Value::Null), "Song_ Title_ - A_B.ttml");
/// ```
pub fn derive_filename(now_playing: Option<&NowPlaying>, payload: &Value) -> String {
    if let Some(label) = now_playing.map(NowPlaying::label).filter(|l| !l.is_empty()) {
        return format!("{}{EXTENSION}", sanitize(&label));
    }

    let item = payload.pointer("/data/0");
    let attributes = item.and_then(|i| i.get("attributes"));
    let title = first_string(attributes, &["name", "title"]);
    let artist = first_string(attributes, &["artistName", "composerName"]);

    let mut stem = join_parts(title, artist);
    if stem.is_empty() {
        let play_params = attributes.and_then(|a| a.get("playParams"));
        stem = id_string(play_params.and_then(|p| p.get("id")))
            .or_else(|| id_string(play_params.and_then(|p| p.get("catalogId"))))
            .or_else(|| id_string(item.and_then(|i| i.get("id"))))
            .unwrap_or_else(|| FALLBACK_STEM.to_string());
    }

    format!("{}{EXTENSION}", sanitize(&stem))
}

/// Pick the user's custom name if set, otherwise run `derive`.
///
/// A custom name is trimmed and gets [`EXTENSION`] appended unless it
/// already ends with it. It is otherwise kept as typed, except that path
/// separators become `_` so the name stays a single path component.
pub fn resolve_filename(custom_name: &str, derive: impl FnOnce() -> String) -> String {
    let custom = custom_name.trim().replace(['/', '\\'], "_");
    if custom.is_empty() {
        derive()
    } else if custom.ends_with(EXTENSION) {
        custom
    } else {
        format!("{custom}{EXTENSION}")
    }
}

/// Filename derivation backed by a chain of now-playing providers.
pub struct FilenameDeriver {
    providers: NowPlayingChain,
}

impl FilenameDeriver {
    pub fn new(providers: NowPlayingChain) -> Self {
        Self { providers }
    }

    /// Query the providers now and derive a name for `payload`.
    pub fn derive(&self, payload: &Value) -> String {
        derive_filename(self.providers.lookup().as_ref(), payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::now_playing::{MediaItem, MediaSession};
    use serde_json::json;

    #[test]
    fn sanitizes_now_playing_label() {
        let np = NowPlaying::new("Song: Title?", "A/B").unwrap();
        assert_eq!(derive_filename(Some(&np), &Value::Null), "Song_ Title_ - A_B.ttml");
    }

    #[test]
    fn sanitize_keeps_allowed_characters() {
        assert_eq!(sanitize("Abc_09 -x\ty"), "Abc_09 -x\ty");
        assert_eq!(sanitize("Beyoncé/Ñ.ttml"), "Beyonc____ttml");
    }

    #[test]
    fn now_playing_wins_over_payload() {
        let np = NowPlaying::new("Live", "").unwrap();
        let payload = json!({ "data": [{ "attributes": { "name": "Payload" } }] });
        assert_eq!(derive_filename(Some(&np), &payload), "Live.ttml");
    }

    #[test]
    fn uses_payload_attributes() {
        let payload = json!({
            "data": [{
                "id": "1",
                "attributes": { "name": "Bohemian Rhapsody", "artistName": "Queen" }
            }]
        });
        assert_eq!(derive_filename(None, &payload), "Bohemian Rhapsody - Queen.ttml");
    }

    #[test]
    fn falls_back_to_title_and_composer() {
        let payload = json!({
            "data": [{ "attributes": { "name": "", "title": "Clair de Lune", "composerName": "Debussy" } }]
        });
        assert_eq!(derive_filename(None, &payload), "Clair de Lune - Debussy.ttml");
    }

    #[test]
    fn artist_alone_is_used() {
        let payload = json!({ "data": [{ "attributes": { "artistName": "AC/DC" } }] });
        assert_eq!(derive_filename(None, &payload), "AC_DC.ttml");
    }

    #[test]
    fn falls_back_to_identifiers() {
        let play_params = json!({
            "data": [{ "id": "9", "attributes": { "playParams": { "id": "1440857781", "catalogId": "2" } } }]
        });
        assert_eq!(derive_filename(None, &play_params), "1440857781.ttml");

        let catalog = json!({
            "data": [{ "id": "9", "attributes": { "playParams": { "catalogId": 12345 } } }]
        });
        assert_eq!(derive_filename(None, &catalog), "12345.ttml");

        let own_id = json!({ "data": [{ "id": "i.abc", "attributes": {} }] });
        assert_eq!(derive_filename(None, &own_id), "i_abc.ttml");
    }

    #[test]
    fn falls_back_to_lyrics() {
        assert_eq!(derive_filename(None, &json!({})), "lyrics.ttml");
        assert_eq!(derive_filename(None, &json!({ "data": "oops" })), "lyrics.ttml");
        assert_eq!(derive_filename(None, &Value::Null), "lyrics.ttml");
    }

    #[test]
    fn custom_name_overrides_derivation() {
        let derive = || -> String { panic!("should not derive when a custom name is set") };
        assert_eq!(resolve_filename("  my song ", derive), "my song.ttml");
        assert_eq!(resolve_filename("already.ttml", derive), "already.ttml");
        assert_eq!(resolve_filename("Café: Live!", derive), "Café: Live!.ttml");
    }

    #[test]
    fn blank_custom_name_derives() {
        assert_eq!(resolve_filename("   ", || "derived.ttml".into()), "derived.ttml");
        assert_eq!(resolve_filename("", || "derived.ttml".into()), "derived.ttml");
    }

    #[test]
    fn deriver_queries_providers_at_call_time() {
        let session = MediaSession::new();
        let mut chain = NowPlayingChain::new();
        chain.add(session.clone());
        let deriver = FilenameDeriver::new(chain);

        assert_eq!(deriver.derive(&Value::Null), "lyrics.ttml");
        session.set_item(MediaItem {
            title: Some("Now".into()),
            artist_name: Some("Playing".into()),
            artist: None,
        });
        assert_eq!(deriver.derive(&Value::Null), "Now - Playing.ttml");
    }

    #[test]
    fn custom_name_cannot_leave_the_download_directory() {
        let derive = || -> String { unreachable!() };
        assert_eq!(resolve_filename("../escaped", derive), ".._escaped.ttml");
        assert_eq!(resolve_filename("/etc/lyrics", derive), "_etc_lyrics.ttml");
        assert_eq!(resolve_filename("..\\..\\win.ttml", derive), ".._.._win.ttml");
    }
}
