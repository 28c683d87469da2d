//! Heuristic "now playing" extraction from the player page's HTML.

use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use regex::Regex;
use scraper::{Html, Selector};

use super::{NowPlaying, NowPlayingProvider};

static TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(concat!(
        r#"[data-testid="track-title"], "#,
        r#"[aria-label^="Playing"] [dir] span, "#,
        r#"[role="button"][data-testid*="track"] span"#,
    ))
    .expect("valid title selector")
});

static ARTIST: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(concat!(
        r#"[data-testid="track-subtitle"], "#,
        r#"[aria-label^="Playing"] a[href*="/artist/"]"#,
    ))
    .expect("valid artist selector")
});

static DOCUMENT_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

static SITE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+\|\s*Apple Music.*").expect("valid regex"));

/// Latest HTML of the player page, updated by the host.
///
/// Clones share the same snapshot.
#[derive(Clone, Default)]
pub struct PageSnapshot {
    html: Arc<RwLock<Option<String>>>,
}

impl PageSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, html: impl Into<String>) {
        *self.html.write().unwrap_or_else(PoisonError::into_inner) = Some(html.into());
    }

    pub fn clear(&self) {
        *self.html.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn current(&self) -> Option<String> {
        self.html
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Provider that reads the track title and artist out of a [`PageSnapshot`].
///
/// Falls back to the page `<title>` (minus the site suffix) when the player
/// widgets are not found.
pub struct DomHeuristics {
    page: PageSnapshot,
}

impl DomHeuristics {
    pub fn new(page: PageSnapshot) -> Self {
        Self { page }
    }
}

impl NowPlayingProvider for DomHeuristics {
    fn now_playing(&self) -> Option<NowPlaying> {
        from_html(&self.page.current()?)
    }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    let el = document.select(selector).next()?;
    let text = el.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Run the player heuristics over a full HTML document.
pub fn from_html(html: &str) -> Option<NowPlaying> {
    let document = Html::parse_document(html);

    let title = first_text(&document, &TITLE);
    let artist = first_text(&document, &ARTIST);
    if title.is_some() || artist.is_some() {
        return NowPlaying::new(title.unwrap_or_default(), artist.unwrap_or_default());
    }

    let page_title = document
        .select(&DOCUMENT_TITLE)
        .next()?
        .text()
        .collect::<String>();
    let page_title = page_title.split_whitespace().collect::<Vec<_>>().join(" ");
    let title = SITE_SUFFIX.replace(&page_title, "");
    NowPlaying::new(title.trim(), "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_player_widgets() {
        let html = r#"<html><body><div class="player">
            <div data-testid="track-title"> Midnight City </div>
            <div data-testid="track-subtitle">M83</div>
        </div></body></html>"#;
        assert_eq!(from_html(html), NowPlaying::new("Midnight City", "M83"));
    }

    #[test]
    fn reads_playing_region_links() {
        let html = r#"<html><body>
            <div aria-label="Playing: Song">
                <div dir="auto"><span>Song</span></div>
                <a href="/us/artist/someone/123">Someone</a>
            </div>
        </body></html>"#;
        assert_eq!(from_html(html), NowPlaying::new("Song", "Someone"));
    }

    #[test]
    fn artist_alone_is_enough() {
        let html = r#"<div data-testid="track-subtitle">Only Artist</div>"#;
        assert_eq!(from_html(html), NowPlaying::new("", "Only Artist"));
    }

    #[test]
    fn falls_back_to_document_title() {
        let html = "<html><head><title>Blinding Lights - Single  |  Apple Music - Web Player</title></head><body></body></html>";
        assert_eq!(
            from_html(html),
            NowPlaying::new("Blinding Lights - Single", "")
        );
    }

    #[test]
    fn blank_widgets_fall_through_to_title() {
        let html = r#"<html><head><title>Album | apple music</title></head>
            <body><div data-testid="track-title">   </div></body></html>"#;
        assert_eq!(from_html(html), NowPlaying::new("Album", ""));
    }

    #[test]
    fn nothing_found() {
        assert_eq!(from_html("<html><body><p>hi</p></body></html>"), None);
        assert_eq!(from_html("<title>   </title>"), None);
    }

    #[test]
    fn provider_reads_latest_snapshot() {
        let page = PageSnapshot::new();
        let provider = DomHeuristics::new(page.clone());
        assert_eq!(provider.now_playing(), None);

        page.update(r#"<div data-testid="track-title">First</div>"#);
        assert_eq!(provider.now_playing().unwrap().title, "First");

        page.update(r#"<div data-testid="track-title">Second</div>"#);
        assert_eq!(provider.now_playing().unwrap().title, "Second");

        page.clear();
        assert_eq!(provider.now_playing(), None);
    }
}
