//! HTML to plain text. Pure text transform; never touches identity or embeddings.

use scraper::{ElementRef, Html, Node};

/// Text content of `html` with `<script>`/`<style>` bodies dropped.
/// Text nodes are joined by single spaces and whitespace runs collapse.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::with_capacity(html.len());
    collect_text(fragment.root_element(), &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(&text.text);
                out.push(' ');
            }
            Node::Element(el) if matches!(el.name(), "script" | "style" | "template" | "noscript") => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn removes_tags_and_collapses_whitespace() {
        assert_eq!(
            strip_html("<p>Build   <b>fast</b>\n systems</p>"),
            "Build fast systems"
        );
    }

    #[test]
    fn drops_script_and_style_bodies() {
        let html = "<style>.x { color: red }</style><div>Hello</div><SCRIPT type=\"x\">alert(1)</SCRIPT> world";
        assert_eq!(strip_html(html), "Hello world");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(
            strip_html("R&amp;D &lt;team&gt; &#39;remote&#x27; ok"),
            "R&D <team> 'remote' ok"
        );
        assert_eq!(strip_html("Caf&eacute; &euro;100k"), "Café €100k");
    }

    #[test]
    fn attribute_text_never_leaks() {
        assert_eq!(strip_html(r#"<a title="x > y" href="/apply">Apply</a>"#), "Apply");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_html("no markup here"), "no markup here");
        assert_eq!(strip_html("   "), "");
    }

    proptest! {
        #[test]
        fn output_is_whitespace_collapsed(input in r"[ a-z<>/&;#\t\n]{0,64}") {
            let text = strip_html(&input);
            prop_assert_eq!(text.trim(), text.as_str());
            prop_assert!(!text.contains("  "));
            prop_assert!(!text.contains('\n'));
        }

        #[test]
        fn text_of_simple_markup_survives(words in prop::collection::vec("[a-z]{1,8}", 1..6)) {
            let html = words.iter().map(|w| format!("<p>{w}</p>")).collect::<String>();
            prop_assert_eq!(strip_html(&html), words.join(" "));
        }
    }
}
