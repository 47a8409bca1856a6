/*!
 * Tests for markup protection
 */

use translate_relay::translation::tags::{PLACEHOLDER, ProtectedText, TagProtector};
use crate::common::texts;

fn round_trip(text: &str) -> String {
    let protected = TagProtector::encode(text);
    TagProtector::decode(&protected.cleaned, &protected.tokens)
}

/// Test the documented example: one formatted word followed by plain text
#[test]
fn test_encode_withBoldWord_shouldProtectWholeElement() {
    let protected = TagProtector::encode("<b>Hello</b> world");

    assert_eq!(protected.cleaned, " (1)  world");
    assert_eq!(protected.tokens, texts(&["<b>Hello</b>"]));
    assert_eq!(
        TagProtector::decode(" (1)  world", &protected.tokens),
        "<b>Hello</b> world"
    );
}

/// Test that plain text passes through untouched
#[test]
fn test_encode_withPlainText_shouldLeaveTextUnchanged() {
    let protected = TagProtector::encode("Hello world, 1 > 0");
    assert_eq!(
        protected,
        ProtectedText { cleaned: "Hello world, 1 > 0".to_string(), tokens: Vec::new() }
    );
}

/// Test that two elements with no gap between them share one token
#[test]
fn test_encode_withAdjacentElements_shouldMergeIntoOneToken() {
    let nested = TagProtector::encode("<b><i>X</i></b>");
    assert_eq!(nested.cleaned, PLACEHOLDER);
    assert_eq!(nested.tokens, texts(&["<b><i>X</i></b>"]));

    let siblings = TagProtector::encode("a <b>B</b><i>I</i> c");
    assert_eq!(siblings.cleaned, "a  (1)  c");
    assert_eq!(siblings.tokens, texts(&["<b>B</b><i>I</i>"]));
}

/// Test that separated elements each get their own placeholder
#[test]
fn test_encode_withSeparatedElements_shouldEmitOnePlaceholderEach() {
    let protected = TagProtector::encode("<a href=\"/x\">one</a> and <em>two</em>");

    assert_eq!(protected.cleaned, " (1)  and  (1) ");
    assert_eq!(protected.tokens, texts(&["<a href=\"/x\">one</a>", "<em>two</em>"]));
}

/// Test that void and self-closing tags are spans of their own
#[test]
fn test_encode_withVoidAndSelfClosingTags_shouldNotSwallowFollowingText() {
    let protected = TagProtector::encode("line one<br>line two<hr/>end");

    assert_eq!(protected.cleaned, "line one (1) line two (1) end");
    assert_eq!(protected.tokens, texts(&["<br>", "<hr/>"]));
}

/// Test that a literal "(1)" in plain text is protected like a span
#[test]
fn test_encode_withLiteralPlaceholder_shouldTreatItAsToken() {
    let protected = TagProtector::encode("see (1) here");

    assert_eq!(protected.cleaned, "see  (1)  here");
    assert_eq!(protected.tokens, texts(&["(1)"]));
    assert_eq!(round_trip("see (1) here"), "see (1) here");
}

/// Test that a literal "(1)" touching a tag is merged into that tag's token
#[test]
fn test_encode_withLiteralPlaceholderAfterTag_shouldMerge() {
    let protected = TagProtector::encode("<b>x</b>(1)!");

    assert_eq!(protected.cleaned, " (1) !");
    assert_eq!(protected.tokens, texts(&["<b>x</b>(1)"]));
}

/// Test that a tag cut off at the end of the text is dropped without a token
#[test]
fn test_encode_withUnterminatedTag_shouldDropPartialTag() {
    let unclosed_bracket = TagProtector::encode("Hello <b");
    assert_eq!(unclosed_bracket.cleaned, "Hello ");
    assert!(unclosed_bracket.tokens.is_empty());

    let after_open_element = TagProtector::encode("<p>Hello <b");
    assert_eq!(after_open_element.cleaned, " (1) Hello ");
    assert_eq!(after_open_element.tokens, texts(&["<p>"]));
}

/// Test that an element never closed keeps the text after it translatable
#[test]
fn test_encode_withUnclosedElement_shouldKeepFollowingText() {
    let protected = TagProtector::encode("Hello <b>world");
    assert_eq!(protected.cleaned, "Hello  (1) world");
    assert_eq!(protected.tokens, texts(&["<b>"]));

    let list = TagProtector::encode("Intro <li>First item<li>Second item");
    assert_eq!(list.cleaned, "Intro  (1) First item (1) Second item");
    assert_eq!(list.tokens, texts(&["<li>", "<li>"]));

    let link = TagProtector::encode("Click <a href=x>here to continue");
    assert_eq!(link.cleaned, "Click  (1) here to continue");
    assert_eq!(link.tokens, texts(&["<a href=x>"]));

    // a closed element inside the unclosed one is split into its tags
    let nested = TagProtector::encode("<p>Say <b>hi</b>");
    assert_eq!(nested.cleaned, " (1) Say  (1) hi (1) ");
    assert_eq!(nested.tokens, texts(&["<p>", "<b>", "</b>"]));
}

/// Test that the tag of an unclosed element merges with a span right before it
#[test]
fn test_encode_withUnclosedElementAfterSpan_shouldMergeAdjacentTags() {
    let protected = TagProtector::encode("<br><p>Hello");
    assert_eq!(protected.cleaned, " (1) Hello");
    assert_eq!(protected.tokens, texts(&["<br><p>"]));
}

/// Test that multibyte text around and inside tags survives
#[test]
fn test_encode_withUnicodeText_shouldWorkOnCharacters() {
    let text = "Grüße <span lang=\"ja\">日本語</span> — ok";
    let protected = TagProtector::encode(text);

    assert_eq!(protected.cleaned, "Grüße  (1)  — ok");
    assert_eq!(protected.tokens, texts(&["<span lang=\"ja\">日本語</span>"]));
    assert_eq!(round_trip(text), text);
}

/// Test round trips for zero, one and several spans
#[test]
fn test_decode_ofEncode_shouldReconstructText() {
    let samples = [
        "",
        "no markup at all",
        "<b>Hello</b> world",
        "start <i>middle</i> end",
        "<p>one</p><p>two</p>",
        "x<b>y</b>z",
        "<a>1</a> <b>2</b>",
        "a  <b>x</b>  b",
        "<b><i>deep</i> nesting</b> and <br> breaks",
        "<!-- comment -->text",
        "stray </b> closer",
        "<b>x</b> (1)",
        "<p>Hello world",
        "a <li>x<li>y",
        "Click <a href=x>here to continue",
    ];

    for sample in samples {
        assert_eq!(round_trip(sample), sample, "round trip failed for {:?}", sample);
    }
}

/// Test surplus placeholders and surplus tokens
#[test]
fn test_decode_withCountMismatch_shouldDegradeQuietly() {
    assert_eq!(TagProtector::decode("(1)(1)", &texts(&["A"])), "A");
    assert_eq!(TagProtector::decode("(1)", &texts(&["A", "B"])), "A");
    assert_eq!(TagProtector::decode("nothing here", &texts(&["A"])), "nothing here");
    assert_eq!(TagProtector::decode("x (1) y", &[]), "xy");
}

/// Test that placeholders moved around by a backend take tokens in order
#[test]
fn test_decode_withReorderedSentence_shouldFillPlaceholdersInOrder() {
    let protected = TagProtector::encode("<b>red</b> car and <i>blue</i> bike");
    assert_eq!(protected.tokens.len(), 2);

    // the backend swapped the noun phrases but kept both placeholders
    let translated = "bici (1) y coche (1) ";
    assert_eq!(
        TagProtector::decode(translated, &protected.tokens),
        "bici<b>red</b>y coche<i>blue</i>"
    );
}
