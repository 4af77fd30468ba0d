#[path = "common/mod.rs"]
mod common;

use rs_content::{TextNormalizer, BROKEN_IMAGE_MARKER};

fn normalizer() -> TextNormalizer {
    TextNormalizer::new().unwrap()
}

/// Every markdown link on a line is removed, not just the first one.
#[test]
fn strips_all_markdown_links_on_a_line() {
    let n = normalizer();
    let line = "see [the wiki](https://oldschool.runescape.wiki) for drops and [this](http://x.com) too";
    assert_eq!(n.clean_line(line).as_deref(), Some("see for drops and too"));
    assert_eq!(n.clean_line("[a](b) [c](d) [e](f) end").as_deref(), Some("end"));
    // parens inside the url, as in wiki page titles
    assert_eq!(
        n.clean_line("kill [Zulrah](https://oldschool.runescape.wiki/w/Zulrah_(boss)) first").as_deref(),
        Some("kill first")
    );
}

#[test]
fn strips_scheme_and_bare_urls() {
    let n = normalizer();
    assert_eq!(n.clean_line("check https://a.com/x and www.b.org/y now").as_deref(), Some("check and now"));
    assert_eq!(
        n.clean_line("Zulrah drops at oldschool.runescape.wiki/w/Zulrah are bad").as_deref(),
        Some("Zulrah drops at are bad")
    );
    // the mailbox goes with its host
    assert_eq!(n.clean_line("email me at a@b.com pls").as_deref(), Some("email me at pls"));
    // abbreviations are not hosts
    assert_eq!(n.clean_line("e.g. this is fine, i.e. ok").as_deref(), Some("e.g. this is fine, i.e. ok"));
}

#[test]
fn strips_emphasis_escapes_and_markup() {
    let n = normalizer();
    assert_eq!(n.clean_line("**Bold** and *italic* text").as_deref(), Some("Bold and italic text"));
    assert_eq!(n.clean_line(r"well\-known").as_deref(), Some("wellknown"));
    assert_eq!(n.clean_line("&gt; quoted &amp; short/long").as_deref(), Some("quoted shortlong"));
    assert_eq!(n.clean_line("&amp;gt; nested quote").as_deref(), Some("nested quote"));
    assert_eq!(n.clean_line("TL;DR: nerf it").as_deref(), Some("nerf it"));
    assert_eq!(n.clean_line("tl;dr buff").as_deref(), Some("buff"));
}

#[test]
fn drops_broken_image_and_blank_lines() {
    let n = normalizer();
    assert_eq!(n.clean_line(&format!("look {} here", BROKEN_IMAGE_MARKER)), None);
    assert_eq!(n.clean_line("   "), None);
    // only markup: nothing left after cleaning
    assert_eq!(n.clean_line("&amp;#x200b;"), None);

    let text = format!("first line\n\n{}\n**second** line\n&gt;\nthird", BROKEN_IMAGE_MARKER);
    assert_eq!(n.clean(&text), "first line\nsecond line\nthird");
}

#[test]
fn passes_run_in_fixed_order() {
    assert_eq!(
        normalizer().pass_names(),
        vec!["markdown link", "url", "html escape", "emphasis", "markup"]
    );
}
