/*!
 * Markup protection around markup-unaware translation engines.
 *
 * Before a text is sent to a backend, every markup span in it is cut out and
 * replaced by a neutral placeholder; after the backend answers, the spans are put
 * back in order. This keeps tags from being translated, reordered or mangled.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Placeholder written into the cleaned text for each protected span
pub const PLACEHOLDER: &str = " (1) ";

/// The placeholder without its padding
const PLACEHOLDER_CORE: &str = "(1)";

/// A placeholder as it may come back from a backend: the core literal with at
/// most one space of padding on each side
static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" ?\(1\) ?").expect("Invalid placeholder regex"));

/// Elements that never have a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Text with its markup spans replaced by placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedText {
    /// Text to hand to the translation backend
    pub cleaned: String,

    /// Protected spans, in order of appearance
    pub tokens: Vec<String>,
}

/// How a single `<...>` tag affects element nesting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Opening,
    Closing,
    /// Void, self-closing, comment or declaration
    Standalone,
}

impl TagKind {
    fn classify(tag: &str) -> Self {
        let inner = tag.trim_start_matches('<').trim_end_matches('>');

        if inner.starts_with('/') {
            return Self::Closing;
        }
        if inner.starts_with('!') || inner.starts_with('?') || inner.ends_with('/') {
            return Self::Standalone;
        }

        let name: String = inner
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        if VOID_ELEMENTS.contains(&name.as_str()) {
            Self::Standalone
        } else {
            Self::Opening
        }
    }
}

/// Scanner state for `TagProtector::encode`
#[derive(Default)]
struct Encoder {
    out: ProtectedText,
    /// Whether opening tags keep a span open until their element closes
    track_elements: bool,
    /// Open angle brackets
    balance: usize,
    /// Open elements
    depth: usize,
    /// Text of the span being collected
    pending: String,
    /// Byte offset where the pending span starts
    pending_start: usize,
    /// Byte offset where the current `<...>` tag starts inside `pending`
    tag_start: usize,
    /// Byte offset just past the last finalized span
    last_span_end: Option<usize>,
}

impl Encoder {
    fn in_span(&self) -> bool {
        self.balance > 0 || self.depth > 0
    }

    fn open_bracket(&mut self, offset: usize) {
        if !self.in_span() {
            self.pending.clear();
            self.pending_start = offset;
        }
        if self.balance == 0 {
            self.tag_start = self.pending.len();
        }
        self.balance += 1;
        self.pending.push('<');
    }

    fn close_bracket(&mut self, end: usize) {
        self.pending.push('>');
        self.balance -= 1;
        if self.balance > 0 {
            return;
        }

        if self.track_elements {
            match TagKind::classify(&self.pending[self.tag_start..]) {
                TagKind::Opening => self.depth += 1,
                TagKind::Closing => self.depth = self.depth.saturating_sub(1),
                TagKind::Standalone => {}
            }
        }

        if self.depth == 0 {
            let span = std::mem::take(&mut self.pending);
            self.finish_span(span, self.pending_start, end);
        }
    }

    fn finish_span(&mut self, span: String, start: usize, end: usize) {
        match self.out.tokens.last_mut() {
            Some(previous) if self.last_span_end == Some(start) => previous.push_str(&span),
            _ => {
                self.out.cleaned.push_str(PLACEHOLDER);
                self.out.tokens.push(span);
            }
        }
        self.last_span_end = Some(end);
    }

    /// Feed `text`, which starts at byte offset `base` of the input, through the scanner
    fn scan(&mut self, text: &str, base: usize) {
        let mut chars = text.char_indices().peekable();

        while let Some((local, c)) = chars.next() {
            let offset = base + local;
            let end = offset + c.len_utf8();

            if self.in_span() {
                match c {
                    '<' => self.open_bracket(offset),
                    '>' if self.balance > 0 => self.close_bracket(end),
                    _ => self.pending.push(c),
                }
                continue;
            }

            match c {
                '<' => self.open_bracket(offset),
                '(' if text[local..].starts_with(PLACEHOLDER_CORE) => {
                    // skip "1)"
                    chars.next();
                    chars.next();
                    self.finish_span(
                        PLACEHOLDER_CORE.to_string(),
                        offset,
                        offset + PLACEHOLDER_CORE.len(),
                    );
                }
                _ => self.out.cleaned.push(c),
            }
        }
    }

    /// Settle a span still open at the end of the input
    ///
    /// A trailing partial tag is dropped. Content held back by elements that never
    /// close is scanned again tag by tag, so only the tags are protected and the
    /// text between them is translated.
    fn finish_input(&mut self) {
        if !self.in_span() {
            return;
        }

        let mut pending = std::mem::take(&mut self.pending);
        if self.balance > 0 {
            let partial = pending.split_off(self.tag_start);
            warn!(
                "Dropping unterminated tag at end of text: '{}'",
                truncate_text(&partial, 30)
            );
        }

        let unclosed = self.depth;
        self.balance = 0;
        self.depth = 0;
        if unclosed == 0 || pending.is_empty() {
            return;
        }

        debug!(
            "{} element(s) left open at end of text, protecting tags only: '{}'",
            unclosed,
            truncate_text(&pending, 30)
        );
        self.track_elements = false;
        let base = self.pending_start;
        self.scan(&pending, base);
    }
}

/// Cuts markup out of texts before translation and restores it afterwards
pub struct TagProtector;

impl TagProtector {
    /// Replace every markup span of `text` with a placeholder
    ///
    /// A span runs from a `<` at the top level to the `>` that closes the last
    /// open element, so `<b>Hello</b>` is one span. Spans that touch the previous
    /// span are merged into its token. A literal `(1)` outside markup is protected
    /// as well, since it would otherwise be taken for a placeholder on the way back.
    /// A tag still open at the end of the text is dropped. Elements that are never
    /// closed do not swallow the text after them: their tags become spans of
    /// their own.
    pub fn encode(text: &str) -> ProtectedText {
        let mut encoder = Encoder {
            track_elements: true,
            ..Encoder::default()
        };
        encoder.scan(text, 0);
        encoder.finish_input();
        encoder.out
    }

    /// Put protected spans back in place of the placeholders of `text`
    ///
    /// Placeholders are consumed in order. Surplus placeholders are removed and
    /// surplus tokens are dropped, since backends do not always keep the
    /// placeholder count intact.
    pub fn decode(text: &str, tokens: &[String]) -> String {
        let mut remaining = tokens.iter();
        let mut replaced = 0usize;

        let result = PLACEHOLDER_REGEX
            .replace_all(text, |_: &Captures| {
                replaced += 1;
                remaining.next().cloned().unwrap_or_default()
            })
            .into_owned();

        if replaced != tokens.len() {
            warn!(
                "Placeholder count mismatch: {} placeholder(s) for {} token(s)",
                replaced,
                tokens.len()
            );
        }

        result
    }
}

/// Truncate text to a maximum number of characters with ellipsis
fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
