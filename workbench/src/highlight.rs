//! Line-oriented syntax highlighting for the terminal.
//!
//! Each language gets one regex with named groups (`comment`, `string`,
//! `number`, `tag`, `word`); words are checked against a keyword table.
//! Tokenizing is per line: block comments and strings spanning lines are
//! only colored on their first line.

use std::collections::HashMap;
use std::sync::LazyLock;

use colored::{ColoredString, Colorize};
use lang_detect::DetectedLanguage;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Str,
    Number,
    Comment,
    Tag,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

const DQ_STRING: &str = r#""(?:[^"\\]|\\.)*"?"#;
const SQ_STRING: &str = r#"'(?:[^'\\]|\\.)*'?"#;
const BT_STRING: &str = r#"`(?:[^`\\]|\\.)*`?"#;
const C_COMMENT: &str = r"//.*$|/\*.*?(?:\*/|$)";
const NUMBER: &str = r"\b\d+(?:\.\d+)?\b";
const WORD: &str = r"[A-Za-z_$][\w$]*";

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "False", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "None", "nonlocal", "not", "or", "pass", "raise", "return", "True", "try", "while",
    "with", "yield",
];

const JS_KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "default", "delete",
    "do", "else", "export", "extends", "false", "finally", "for", "from", "function", "if",
    "import", "in", "instanceof", "let", "new", "null", "of", "return", "super", "switch", "this",
    "throw", "true", "try", "typeof", "undefined", "var", "void", "while", "yield",
];

const TS_EXTRA_KEYWORDS: &[&str] = &[
    "abstract", "any", "as", "boolean", "declare", "enum", "implements", "interface", "keyof",
    "namespace", "never", "number", "private", "protected", "public", "readonly", "string",
    "type", "unknown",
];

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "boolean", "break", "byte", "case", "catch", "char", "class", "continue",
    "default", "do", "double", "else", "enum", "extends", "false", "final", "finally", "float",
    "for", "if", "implements", "import", "instanceof", "int", "interface", "long", "new", "null",
    "package", "private", "protected", "public", "return", "short", "static", "super", "switch",
    "synchronized", "this", "throw", "throws", "true", "try", "void", "volatile", "while",
];

const CSS_KEYWORDS: &[&str] = &["important", "inherit", "initial", "none", "auto", "unset"];

const JSON_KEYWORDS: &[&str] = &["true", "false", "null"];

fn pattern(lang: DetectedLanguage) -> Option<String> {
    use DetectedLanguage::*;
    let (comment, string, number) = match lang {
        Python => (Some(r"#.*$".to_string()), format!("{DQ_STRING}|{SQ_STRING}"), NUMBER.to_string()),
        JavaScript | TypeScript => (
            Some(C_COMMENT.to_string()),
            format!("{DQ_STRING}|{SQ_STRING}|{BT_STRING}"),
            NUMBER.to_string(),
        ),
        Java => (
            Some(C_COMMENT.to_string()),
            format!("{DQ_STRING}|{SQ_STRING}"),
            NUMBER.to_string(),
        ),
        Css => (
            Some(r"/\*.*?(?:\*/|$)".to_string()),
            format!("{DQ_STRING}|{SQ_STRING}"),
            format!(r"#[0-9a-fA-F]{{3,8}}\b|{NUMBER}(?:px|em|rem|%|s|ms|vh|vw)?"),
        ),
        Json => (None, DQ_STRING.to_string(), format!(r"-?{NUMBER}(?:[eE][+-]?\d+)?")),
        Html => {
            return Some(format!(
                r"(?P<comment><!--.*?(?:-->|$))|(?P<tag></?[A-Za-z][\w-]*>?|/?>)|(?P<string>{DQ_STRING}|{SQ_STRING})|(?P<word>{WORD})"
            ));
        }
        PlainText => return None,
    };
    let body = format!(r"(?P<string>{string})|(?P<number>{number})|(?P<word>{WORD})");
    Some(match comment {
        Some(c) => format!(r"(?P<comment>{c})|{body}"),
        None => body,
    })
}

static GRAMMARS: LazyLock<HashMap<DetectedLanguage, Regex>> = LazyLock::new(|| {
    DetectedLanguage::ALL
        .into_iter()
        .filter_map(|lang| {
            let re = Regex::new(&pattern(lang)?).ok()?;
            Some((lang, re))
        })
        .collect()
});

fn keywords(lang: DetectedLanguage) -> &'static [&'static str] {
    match lang {
        DetectedLanguage::Python => PYTHON_KEYWORDS,
        DetectedLanguage::JavaScript | DetectedLanguage::TypeScript => JS_KEYWORDS,
        DetectedLanguage::Java => JAVA_KEYWORDS,
        DetectedLanguage::Css => CSS_KEYWORDS,
        DetectedLanguage::Json => JSON_KEYWORDS,
        DetectedLanguage::Html | DetectedLanguage::PlainText => &[],
    }
}

fn is_keyword(lang: DetectedLanguage, word: &str) -> bool {
    keywords(lang).contains(&word)
        || (lang == DetectedLanguage::TypeScript && TS_EXTRA_KEYWORDS.contains(&word))
}

/// Splits one line into tokens. Adjacent plain text is merged; concatenating
/// the token texts gives back the line.
pub fn tokenize(line: &str, lang: DetectedLanguage) -> Vec<Token<'_>> {
    let Some(re) = GRAMMARS.get(&lang) else {
        if line.is_empty() {
            return Vec::new();
        }
        return vec![Token {
            kind: TokenKind::Plain,
            text: line,
        }];
    };

    let mut spans: Vec<(TokenKind, usize, usize)> = Vec::new();
    let mut last = 0;
    for caps in re.captures_iter(line) {
        let Some(m) = caps.get(0) else { continue };
        if m.start() > last {
            push_span(&mut spans, TokenKind::Plain, last, m.start());
        }
        let kind = if caps.name("comment").is_some() {
            TokenKind::Comment
        } else if caps.name("string").is_some() {
            TokenKind::Str
        } else if caps.name("number").is_some() {
            TokenKind::Number
        } else if caps.name("tag").is_some() {
            TokenKind::Tag
        } else if is_keyword(lang, m.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Plain
        };
        push_span(&mut spans, kind, m.start(), m.end());
        last = m.end();
    }
    if last < line.len() {
        push_span(&mut spans, TokenKind::Plain, last, line.len());
    }

    spans
        .into_iter()
        .map(|(kind, start, end)| Token {
            kind,
            text: &line[start..end],
        })
        .collect()
}

fn push_span(spans: &mut Vec<(TokenKind, usize, usize)>, kind: TokenKind, start: usize, end: usize) {
    match spans.last_mut() {
        Some((TokenKind::Plain, _, prev_end)) if kind == TokenKind::Plain => *prev_end = end,
        _ => spans.push((kind, start, end)),
    }
}

fn paint(token: &Token<'_>) -> ColoredString {
    match token.kind {
        TokenKind::Keyword => token.text.blue().bold(),
        TokenKind::Str => token.text.green(),
        TokenKind::Number => token.text.cyan(),
        TokenKind::Comment => token.text.bright_black().italic(),
        TokenKind::Tag => token.text.magenta(),
        TokenKind::Plain => token.text.normal(),
    }
}

/// One line with ANSI colors (plain when colors are disabled).
pub fn highlight_line(line: &str, lang: DetectedLanguage) -> String {
    tokenize(line, lang).iter().map(|t| paint(t).to_string()).collect()
}

/// Width of the line-number column for `line_count` lines.
pub fn gutter_width(line_count: usize) -> usize {
    line_count.max(1).to_string().len()
}

/// Whole text with right-aligned line numbers, like a code viewer.
pub fn render_numbered(text: &str, lang: DetectedLanguage) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let width = gutter_width(lines.len());
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let number = format!("{:>width$}", i + 1);
        out.push_str(&format!("{} | {}\n", number.dimmed(), highlight_line(line, lang)));
    }
    out
}
