/// Block layout for the offline renderer

use crate::Viewport;
use scraper::{ElementRef, Html};

/// Glyph cell edge in pixels at scale 1
pub const GLYPH_SIZE: u32 = 8;

/// Gap above the first block
const TOP_OFFSET: u32 = 8;

const HEADING_TAGS: [&str; 3] = ["h1", "h2", "h3"];
const TEXT_TAGS: [&str; 4] = ["p", "li", "td", "th"];
/// Inline elements join the surrounding text run instead of starting a block
const INLINE_TAGS: [&str; 16] = [
    "a", "abbr", "b", "cite", "code", "em", "font", "i", "label", "mark", "s", "small", "span", "strong", "sub", "sup",
];
/// Subtrees that never produce visible text
const HIDDEN_TAGS: [&str; 6] = ["head", "noscript", "script", "style", "template", "title"];

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub margin: u32,
    pub border: u32,
    pub padding: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Heading,
    Paragraph,
}

impl ElementType {
    fn of(tag: &str) -> Option<Self> {
        if HEADING_TAGS.contains(&tag) {
            Some(ElementType::Heading)
        } else if TEXT_TAGS.contains(&tag) {
            Some(ElementType::Paragraph)
        } else {
            None
        }
    }

    /// (scale, margin, padding)
    fn metrics(self) -> (u32, u32, u32) {
        match self {
            ElementType::Heading => (2, 8, 8),
            ElementType::Paragraph => (1, 6, 6),
        }
    }
}

/// A laid out block: its box, its wrapped text (one line per `\n`) and glyph scale.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    pub text: String,
    pub elem_type: ElementType,
    pub scale: u32,
}

/// Compute a vertical block layout for the document.
///
/// Headings (`h1`..`h3`) render at scale 2, text blocks (`p`, `li`, `td`,
/// `th`) at scale 1, in document order. A block that contains another block
/// is skipped in favour of its children. Text sitting directly in any other
/// element (`body`, `div`, ...) is laid out as a scale 1 block, with inline
/// elements joining the run. When the document has no heading the `<title>`
/// takes its place. Layout stops once the viewport height is used up.
pub fn layout_document(document: &Html, viewport: Viewport) -> Vec<LayoutNode> {
    let mut y = TOP_OFFSET;
    let mut nodes = Vec::new();

    let mut blocks = Vec::new();
    collect_blocks(document.root_element(), &mut blocks);

    if !blocks.iter().any(|(_, kind)| *kind == ElementType::Heading) {
        let title = elements(document)
            .find(|e| e.value().name() == "title")
            .map(|e| collapse_whitespace(e.text()))
            .unwrap_or_default();
        if !title.is_empty() {
            blocks.insert(0, (title, ElementType::Heading));
        }
    }

    for (text, kind) in blocks {
        if y >= viewport.height {
            break;
        }
        let node = place_block(&text, kind, y, viewport.width);
        y += node.lb.rect.height + node.lb.box_model.margin;
        nodes.push(node);
    }

    nodes
}

/// Walk `element` in document order, emitting `(text, kind)` per block.
fn collect_blocks(element: ElementRef<'_>, out: &mut Vec<(String, ElementType)>) {
    let name = element.value().name();
    if HIDDEN_TAGS.contains(&name) {
        return;
    }
    if let Some(kind) = ElementType::of(name) {
        if !contains_block(element) {
            push_block(out, collapse_whitespace(element.text()), kind);
            return;
        }
    }

    let mut run = String::new();
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            run.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let child_name = child.value().name();
        if INLINE_TAGS.contains(&child_name) && !contains_block(child) {
            run.extend(child.text());
        } else if child_name == "br" {
            run.push(' ');
        } else {
            push_block(out, collapse_whitespace(std::iter::once(run.as_str())), ElementType::Paragraph);
            run.clear();
            collect_blocks(child, out);
        }
    }
    push_block(out, collapse_whitespace(std::iter::once(run.as_str())), ElementType::Paragraph);
}

fn push_block(out: &mut Vec<(String, ElementType)>, text: String, kind: ElementType) {
    if !text.is_empty() {
        out.push((text, kind));
    }
}

fn place_block(text: &str, kind: ElementType, y: u32, page_width: u32) -> LayoutNode {
    let (scale, margin, padding) = kind.metrics();
    let cell = GLYPH_SIZE * scale;
    let width = page_width.saturating_sub(margin * 2);
    let content_w = width.saturating_sub(padding * 2);
    let chars_per_line = ((content_w / cell) as usize).max(1);

    let lines = wrap_text(text, chars_per_line);
    let lines_count = (lines.len() as u32).max(1);
    let height = lines_count * cell + padding * 2;

    LayoutNode {
        lb: LayoutBox {
            rect: Rect {
                x: margin as i32,
                y: y as i32,
                width,
                height,
            },
            box_model: BoxModel {
                margin,
                border: 0,
                padding,
            },
        },
        text: lines.join("\n"),
        elem_type: kind,
        scale,
    }
}

/// Greedy word wrap; words longer than a line are split across lines.
pub fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let width = chars_per_line.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if cur_len > 0 {
                lines.push(std::mem::take(&mut cur));
                cur_len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        let word_len = chars.len();
        if word_len == 0 {
            continue;
        }
        if cur_len > 0 && cur_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
        if cur_len > 0 {
            cur.push(' ');
            cur_len += 1;
        }
        cur.extend(chars);
        cur_len += word_len;
    }
    if cur_len > 0 {
        lines.push(cur);
    }
    lines
}

fn elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.root_element().descendants().filter_map(ElementRef::wrap)
}

fn contains_block(element: ElementRef<'_>) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|e| ElementType::of(e.value().name()).is_some())
}

pub(crate) fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn layout_document_places_heading_and_paragraphs() {
        let html = "<html><head><title>Test Title</title></head><body><h1>Heading</h1><p>Hello world</p><p>More text</p></body></html>";
        let doc = Html::parse_document(html);
        let v = Viewport { width: 200, height: 200 };
        let nodes = layout_document(&doc, v);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].elem_type, ElementType::Heading);
        assert_eq!(nodes[0].text, "Heading");
        assert_eq!(nodes[1].elem_type, ElementType::Paragraph);
        assert!(nodes[1].lb.rect.y > nodes[0].lb.rect.y);
        assert!(nodes[1].lb.rect.width > 0);
    }

    #[test]
    fn title_stands_in_for_missing_heading() {
        let doc = Html::parse_document("<title>Weekly report</title><p>body</p>");
        let nodes = layout_document(&doc, Viewport { width: 300, height: 300 });
        assert_eq!(nodes[0].elem_type, ElementType::Heading);
        assert_eq!(nodes[0].text, "Weekly report");
        assert_eq!(nodes[0].scale, 2);
    }

    #[test]
    fn nested_blocks_are_not_duplicated() {
        let doc = Html::parse_document("<ul><li><p>only once</p></li></ul>");
        let nodes = layout_document(&doc, Viewport { width: 300, height: 300 });
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text, "only once");
    }

    #[test]
    fn layout_stops_at_viewport_bottom() {
        let body: String = (0..200).map(|i| format!("<p>line {}</p>", i)).collect();
        let doc = Html::parse_document(&body);
        let nodes = layout_document(&doc, Viewport { width: 200, height: 100 });
        assert!(nodes.len() < 200);
        assert!(nodes.iter().all(|n| (n.lb.rect.y as u32) < 100));
    }

    #[test]
    fn narrow_viewport_does_not_underflow() {
        let doc = Html::parse_document("<p>Hello</p>");
        let nodes = layout_document(&doc, Viewport { width: 3, height: 50 });
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].lb.rect.width, 0);
    }

    #[test]
    fn bare_body_text_is_laid_out() {
        let doc = Html::parse_document("<html><body>Hello</body></html>");
        let nodes = layout_document(&doc, Viewport { width: 200, height: 100 });
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text, "Hello");
        assert_eq!(nodes[0].elem_type, ElementType::Paragraph);
        assert_eq!(nodes[0].scale, 1);
    }

    #[test]
    fn container_text_keeps_document_order() {
        let doc = Html::parse_document(
            "<div>before <a href=\"#\">link</a><span>!</span><p>inside</p>after<br>wrap</div>",
        );
        let nodes = layout_document(&doc, Viewport { width: 400, height: 400 });
        let texts: Vec<&str> = nodes.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["before link!", "inside", "after wrap"]);
    }

    #[test]
    fn hidden_subtrees_produce_no_text() {
        let doc = Html::parse_document(
            "<head><style>p { color: red }</style></head><body><script>var x = 1;</script>shown</body>",
        );
        let nodes = layout_document(&doc, Viewport { width: 200, height: 100 });
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text, "shown");
    }

    #[test]
    fn wrap_text_breaks_on_words_and_splits_long_ones() {
        assert_eq!(wrap_text("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert!(wrap_text("   ", 4).is_empty());
    }
}
