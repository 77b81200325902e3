// file: src/converter/patterns.rs
// description: compiled regex patterns shared by the markdown and html renderers
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

/// Tags that must never end up inside a `<p>`.
pub const BLOCK_TAGS: &str = "h[1-3]|ul|blockquote|pre";

lazy_static! {
    // Markdown side
    pub static ref MD_FENCED_CODE: Regex = Regex::new(
        r"(?ms)^```[^\n]*\n(.*?)^```[ \t]*$\n?"
    ).expect("MD_FENCED_CODE regex is valid");

    pub static ref MD_HEADING: Regex = Regex::new(
        r"(?m)^(#{1,3})[ \t]+(.+?)[ \t]*$"
    ).expect("MD_HEADING regex is valid");

    pub static ref MD_BOLD: Regex = Regex::new(
        r"\*\*([^\n]+?)\*\*"
    ).expect("MD_BOLD regex is valid");

    pub static ref MD_ITALIC: Regex = Regex::new(
        r"\*([^*\n]+?)\*"
    ).expect("MD_ITALIC regex is valid");

    pub static ref MD_LIST_ITEM: Regex = Regex::new(
        r"(?m)^- (.+?)[ \t]*$"
    ).expect("MD_LIST_ITEM regex is valid");

    pub static ref MD_LIST_RUN: Regex = Regex::new(
        r"(?m)^<li>.*</li>(?:\n<li>.*</li>)*"
    ).expect("MD_LIST_RUN regex is valid");

    pub static ref MD_LINK: Regex = Regex::new(
        r"(!?)\[([^\]\n]*)\]\(([^)\s]*)\)"
    ).expect("MD_LINK regex is valid");

    pub static ref MD_IMAGE: Regex = Regex::new(
        r"!\[([^\]\n]*)\]\(([^)\s]*)\)"
    ).expect("MD_IMAGE regex is valid");

    pub static ref MD_BLOCKQUOTE: Regex = Regex::new(
        r"(?m)^&gt; (.+?)[ \t]*$"
    ).expect("MD_BLOCKQUOTE regex is valid");

    pub static ref MD_BLANK_LINES: Regex = Regex::new(
        r"\n(?:[ \t]*\n)+"
    ).expect("MD_BLANK_LINES regex is valid");

    // Paragraph cleanup
    pub static ref BR_BEFORE_BLOCK: Regex = Regex::new(
        &format!(r"<br>(<(?:{BLOCK_TAGS})>)")
    ).expect("BR_BEFORE_BLOCK regex is valid");

    pub static ref BR_AFTER_BLOCK: Regex = Regex::new(
        &format!(r"(</(?:{BLOCK_TAGS})>)<br>")
    ).expect("BR_AFTER_BLOCK regex is valid");

    pub static ref P_BEFORE_BLOCK: Regex = Regex::new(
        &format!(r"<p>(<(?:{BLOCK_TAGS})>)")
    ).expect("P_BEFORE_BLOCK regex is valid");

    pub static ref P_AFTER_BLOCK: Regex = Regex::new(
        &format!(r"(</(?:{BLOCK_TAGS})>)</p>")
    ).expect("P_AFTER_BLOCK regex is valid");

    pub static ref EMPTY_PARAGRAPH: Regex = Regex::new(
        r"<p>\s*</p>"
    ).expect("EMPTY_PARAGRAPH regex is valid");

    // HTML side
    pub static ref HTML_HEADING: Regex = Regex::new(
        r"(?is)<h([1-3])(?:\s[^>]*)?>(.*?)</h[1-3]\s*>"
    ).expect("HTML_HEADING regex is valid");

    pub static ref HTML_STRONG: Regex = Regex::new(
        r"(?is)<(?:strong|b)(?:\s[^>]*)?>(.*?)</(?:strong|b)\s*>"
    ).expect("HTML_STRONG regex is valid");

    pub static ref HTML_EM: Regex = Regex::new(
        r"(?is)<(?:em|i)(?:\s[^>]*)?>(.*?)</(?:em|i)\s*>"
    ).expect("HTML_EM regex is valid");

    pub static ref HTML_LIST_ITEM: Regex = Regex::new(
        r"(?is)<li(?:\s[^>]*)?>(.*?)</li\s*>"
    ).expect("HTML_LIST_ITEM regex is valid");

    pub static ref HTML_LIST_GAP: Regex = Regex::new(
        r"(?i)(</li\s*>|<ul(?:\s[^>]*)?>)\s+(<li\b|</ul\s*>)"
    ).expect("HTML_LIST_GAP regex is valid");

    pub static ref HTML_LIST_WRAPPER: Regex = Regex::new(
        r"(?i)</?ul(?:\s[^>]*)?>"
    ).expect("HTML_LIST_WRAPPER regex is valid");

    pub static ref HTML_LINE_BREAK: Regex = Regex::new(
        r"(?i)<br\s*/?>"
    ).expect("HTML_LINE_BREAK regex is valid");

    pub static ref HTML_PARAGRAPH_BOUNDARY: Regex = Regex::new(
        r"(?i)</p\s*>\s*<p(?:\s[^>]*)?>"
    ).expect("HTML_PARAGRAPH_BOUNDARY regex is valid");

    pub static ref HTML_PARAGRAPH_TAG: Regex = Regex::new(
        r"(?i)</?p(?:\s[^>]*)?>"
    ).expect("HTML_PARAGRAPH_TAG regex is valid");

    pub static ref HTML_ANY_TAG: Regex = Regex::new(
        r"<[^>]+>"
    ).expect("HTML_ANY_TAG regex is valid");

    pub static ref HTML_ENTITY: Regex = Regex::new(
        r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);"
    ).expect("HTML_ENTITY regex is valid");

    pub static ref EXCESS_NEWLINES: Regex = Regex::new(
        r"\n{3,}"
    ).expect("EXCESS_NEWLINES regex is valid");

    pub static ref HTML_IMG_SRC: Regex = Regex::new(
        r#"(?i)(<img\b[^>]*?\bsrc=")([^"]*)(")"#
    ).expect("HTML_IMG_SRC regex is valid");
}
