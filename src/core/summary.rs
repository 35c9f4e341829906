//! README 摘要：把 Markdown 轉成事件流，取第一段文字，並限制字數。
//!
//! 結果是 `reduce` 的不動點，因此對已摘要的文字再執行一次不會改變內容。

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

pub const DEFAULT_WORD_BUDGET: usize = 100;
pub const TRUNCATION_MARKER: &str = "...";

const MAX_PASSES: usize = 16;

/// 視為版面標記而移除的 HTML 元素；其他角括號內容（例如 `Vec<T>`）保留為文字
const HTML_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "br", "center", "code", "del", "details", "div", "em", "font", "h1", "h2",
    "h3", "h4", "h5", "h6", "hr", "i", "img", "ins", "kbd", "li", "ol", "p", "picture", "pre",
    "s", "small", "source", "span", "strong", "sub", "summary", "sup", "table", "tbody", "td",
    "th", "thead", "tr", "u", "ul", "video",
];

struct Block {
    text: String,
    heading: bool,
}

/// 將 README 原文縮減成單段摘要；沒有可用文字時回傳 `None`
pub fn summarize(text: &str, word_budget: usize) -> Option<String> {
    let mut current = reduce(text, word_budget);
    for _ in 0..MAX_PASSES {
        let next = reduce(&current, word_budget);
        if next == current {
            break;
        }
        current = next;
    }

    if current.is_empty() {
        None
    } else {
        Some(current)
    }
}

fn reduce(text: &str, word_budget: usize) -> String {
    let blocks = collect_blocks(text);

    // 第一個非標題段落優先，只有標題時才退回標題文字
    let chosen = blocks
        .iter()
        .find(|b| !b.heading)
        .or_else(|| blocks.first());

    match chosen {
        Some(block) => {
            let words: Vec<&str> = block.text.split_whitespace().collect();
            truncate_words(&words, word_budget)
        }
        None => String::new(),
    }
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

fn collect_blocks(text: &str) -> Vec<Block> {
    let mut collector = BlockCollector::default();
    for event in Parser::new_ext(text, markdown_options()) {
        collector.push(event);
    }
    collector.flush();
    collector.blocks
}

#[derive(Default)]
struct BlockCollector {
    blocks: Vec<Block>,
    current: String,
    heading: bool,
    // 程式碼區塊、HTML 區塊與圖片內的文字不顯示
    hidden: usize,
}

impl BlockCollector {
    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(
                Tag::CodeBlock(_) | Tag::HtmlBlock | Tag::Image { .. } | Tag::MetadataBlock(_),
            ) => self.hidden += 1,
            Event::End(
                TagEnd::CodeBlock | TagEnd::HtmlBlock | TagEnd::Image | TagEnd::MetadataBlock(_),
            ) => self.hidden = self.hidden.saturating_sub(1),
            _ if self.hidden > 0 => {}

            Event::Start(Tag::Heading { .. }) => {
                self.flush();
                self.heading = true;
            }
            Event::Start(
                Tag::Paragraph | Tag::List(_) | Tag::Item | Tag::BlockQuote(_) | Tag::Table(_),
            )
            | Event::End(
                TagEnd::Heading(_)
                | TagEnd::Paragraph
                | TagEnd::Item
                | TagEnd::TableHead
                | TagEnd::TableRow,
            )
            | Event::Rule => self.flush(),

            Event::Text(text) | Event::Code(text) => self.current.push_str(&text),
            Event::InlineHtml(html) | Event::Html(html) => {
                if is_html_element(&html) {
                    self.current.push(' ');
                } else {
                    self.current.push_str(&html);
                }
            }
            Event::SoftBreak | Event::HardBreak | Event::End(TagEnd::TableCell) => {
                self.current.push(' ')
            }
            _ => {}
        }
    }

    fn flush(&mut self) {
        let text = std::mem::take(&mut self.current);
        if !text.trim().is_empty() {
            self.blocks.push(Block {
                text,
                heading: self.heading,
            });
        }
        self.heading = false;
    }
}

fn is_html_element(html: &str) -> bool {
    let html = html.trim();
    if html.starts_with("<!") || html.starts_with("<?") {
        return true;
    }
    let name: String = html
        .trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    HTML_ELEMENTS.contains(&name.as_str())
}

fn truncate_words(words: &[&str], word_budget: usize) -> String {
    if words.len() <= word_budget {
        return words.join(" ");
    }
    let mut summary = words[..word_budget].join(" ");
    summary.push_str(TRUNCATION_MARKER);
    summary
}
