//! Indenting TTML for human readers.
//!
//! Only a fixed set of structural ("block") tags start on their own line.
//! Everything else, notably the per-syllable `span` elements, stays inline
//! with its surrounding text.

mod tree;

use ego_tree::NodeRef;

use self::tree::XmlNode;

/// Element names that always begin on a new, indented line.
pub const BLOCK_TAGS: &[&str] = &[
    "tt",
    "head",
    "metadata",
    "iTunesMetadata",
    "body",
    "div",
    "p",
    "songwriters",
    "transliterations",
    "translations",
];

const INDENT: &str = "  ";

/// Returns `true` if `name` is one of the [`BLOCK_TAGS`].
pub fn is_block_tag(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

/// Re-serialize `xml` with block-level indentation.
///
/// Returns `xml` unchanged if it is not well-formed.
///
/// # Example
///
/// ```
/// use ttml_capture::pretty_print;
///
/// let out = pretty_print(r#"<tt xmlns="x"><body><div><p>Hi</p></div></body></tt>"#);
/// assert_eq!(
///     out,
///     "<tt xmlns=\"x\">\n  <body>\n    <div>\n      <p>Hi</p>\n    </div>\n  </body>\n</tt>\n"
/// );
/// ```
pub fn pretty_print(xml: &str) -> String {
    let tree = match tree::parse(xml) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::debug!("Leaving document unformatted: {e}");
            return xml.to_string();
        }
    };

    let mut out = String::with_capacity(xml.len() + xml.len() / 4);
    for child in tree.root().children() {
        serialize_node(child, 0, &mut out);
    }

    let mut out = match out.strip_prefix('\n') {
        Some(rest) => rest.to_string(),
        None => out,
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// Escape `&`, `<` and `>`; quotes are left alone.
fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn serialize_node(node: NodeRef<XmlNode>, depth: usize, out: &mut String) {
    match node.value() {
        XmlNode::Document => {}
        XmlNode::Text(text) => {
            if !text.trim().is_empty() {
                push_escaped(out, text);
            }
        }
        XmlNode::Element(el) => {
            let block = is_block_tag(&el.name);
            if block {
                out.push('\n');
                push_indent(out, depth);
            }

            out.push('<');
            out.push_str(&el.name);
            for (k, v) in &el.attrs {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(v);
                out.push('"');
            }
            out.push('>');

            if node.children().any(|c| c.value().is_element()) {
                let child_depth = if block { depth + 1 } else { depth };
                for child in node.children() {
                    serialize_node(child, child_depth, out);
                }
                if block {
                    out.push('\n');
                    push_indent(out, depth);
                }
            } else {
                for child in node.children() {
                    serialize_node(child, depth, out);
                }
            }

            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LYRICS: &str = concat!(
        r#"<tt xmlns="http://www.w3.org/ns/ttml" xmlns:itunes="http://music.apple.com/lyric-ttml-internal" itunes:timing="Word" xml:lang="en">"#,
        r#"<head><metadata><iTunesMetadata xmlns="http://music.apple.com/lyric-ttml-internal">"#,
        r#"<songwriters><songwriter>Jane Doe</songwriter><songwriter>John Roe</songwriter></songwriters>"#,
        r#"</iTunesMetadata></metadata></head>"#,
        r#"<body dur="3:01.250"><div begin="10.5" end="14.0" itunes:songPart="Verse">"#,
        r#"<p begin="10.5" end="12.1" itunes:key="L1"><span begin="10.5" end="11.0">Hel</span><span begin="11.0" end="12.1">lo</span></p>"#,
        r#"<p begin="12.1" end="14.0" itunes:key="L2">Fish &amp; chips</p>"#,
        r#"</div></body></tt>"#,
    );

    #[test]
    fn formats_minimal_document() {
        let out = pretty_print(r#"<tt xmlns="x"><body><div><p>Hi</p></div></body></tt>"#);
        assert_eq!(
            out,
            "<tt xmlns=\"x\">\n  <body>\n    <div>\n      <p>Hi</p>\n    </div>\n  </body>\n</tt>\n"
        );
    }

    #[test]
    fn formats_realistic_lyrics() {
        let expected = concat!(
            "<tt xmlns=\"http://www.w3.org/ns/ttml\" xmlns:itunes=\"http://music.apple.com/lyric-ttml-internal\" itunes:timing=\"Word\" xml:lang=\"en\">\n",
            "  <head>\n",
            "    <metadata>\n",
            "      <iTunesMetadata xmlns=\"http://music.apple.com/lyric-ttml-internal\">\n",
            "        <songwriters><songwriter>Jane Doe</songwriter><songwriter>John Roe</songwriter>\n",
            "        </songwriters>\n",
            "      </iTunesMetadata>\n",
            "    </metadata>\n",
            "  </head>\n",
            "  <body dur=\"3:01.250\">\n",
            "    <div begin=\"10.5\" end=\"14.0\" itunes:songPart=\"Verse\">\n",
            "      <p begin=\"10.5\" end=\"12.1\" itunes:key=\"L1\"><span begin=\"10.5\" end=\"11.0\">Hel</span><span begin=\"11.0\" end=\"12.1\">lo</span>\n",
            "      </p>\n",
            "      <p begin=\"12.1\" end=\"14.0\" itunes:key=\"L2\">Fish &amp; chips</p>\n",
            "    </div>\n",
            "  </body>\n",
            "</tt>\n",
        );
        assert_eq!(pretty_print(LYRICS), expected);
    }

    #[test]
    fn is_idempotent() {
        let once = pretty_print(LYRICS);
        assert_eq!(pretty_print(&once), once);

        let minimal = pretty_print(r#"<tt a="1"><body><div><p>x</p></div></body></tt>"#);
        assert_eq!(pretty_print(&minimal), minimal);
    }

    #[test]
    fn malformed_input_is_returned_unchanged() {
        for input in [
            "",
            "not xml",
            "<tt a=\"1\"><body></tt>",
            "<tt a=\"1\">",
            "<tt a=\"1\">&nbsp;</tt>",
            "<tt a=\"1\"><1x/></tt>",
            "<p a=\"<\">x</p>",
            "<p>x]]>y</p>",
            "<tt a=\"1\">\0</tt>",
            "<?xml version=\"1.0\"?><?xml version=\"1.0\"?><tt a=\"1\"/>",
            "<tt a=\"1\"/><!DOCTYPE x>",
        ] {
            assert_eq!(pretty_print(input), input);
        }
    }

    #[test]
    fn mixed_content_in_block_gains_a_line_per_pass() {
        let once = pretty_print("<p>a<span>b</span> c </p>");
        assert_eq!(once, "<p>a<span>b</span> c \n</p>\n");

        // The trailing text now ends in a newline and is kept as-is.
        let twice = pretty_print(&once);
        assert_eq!(twice, "<p>a<span>b</span> c \n\n</p>\n");
    }

    #[test]
    fn whitespace_only_text_nodes_vanish() {
        let input = "<tt a=\"1\">\n    <body>\n\n\t<div>   <p>Line</p>\n  </div>\n</body>\n</tt>";
        assert_eq!(
            pretty_print(input),
            "<tt a=\"1\">\n  <body>\n    <div>\n      <p>Line</p>\n    </div>\n  </body>\n</tt>\n"
        );
    }

    #[test]
    fn inline_elements_do_not_indent_children() {
        let out = pretty_print(r#"<p><span><span>a</span></span> <span>b</span></p>"#);
        assert_eq!(out, "<p><span><span>a</span></span><span>b</span>\n</p>\n");
    }

    #[test]
    fn text_keeps_inner_whitespace_and_escapes_markup() {
        let out = pretty_print(r#"<p> a &lt;b&gt; &quot;c&quot; </p>"#);
        assert_eq!(out, "<p> a &lt;b&gt; \"c\" </p>\n");
    }

    #[test]
    fn empty_elements_get_explicit_close_tags() {
        assert_eq!(
            pretty_print(r#"<tt a="1"><head/><body/></tt>"#),
            "<tt a=\"1\">\n  <head></head>\n  <body></body>\n</tt>\n"
        );
    }

    #[test]
    fn inline_root_has_no_leading_newline() {
        assert_eq!(pretty_print("<span>x</span>"), "<span>x</span>\n");
    }

    #[test]
    fn block_tag_names_are_case_sensitive() {
        assert!(is_block_tag("iTunesMetadata"));
        assert!(!is_block_tag("itunesmetadata"));
        assert!(!is_block_tag("span"));
    }
}
