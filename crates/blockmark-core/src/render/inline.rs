// SPDX-License-Identifier: AGPL-3.0-or-later
//! Inline rendering of text payloads
//!
//! A text run carries several style flags but renders with at most one of
//! them: the first entry of [`STYLE_PRECEDENCE`] whose flag is set wins.

use crate::ast::{TextElement, TextPayload, TextRun, TextStyle};
use crate::traits::RenderConfig;
use std::borrow::Cow;

/// Inline style applied to a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Bold,
    Italic,
    Strikethrough,
    Underline,
    InlineCode,
    Link,
}

/// Styles in the order they are tested; the first match is the only one applied
pub const STYLE_PRECEDENCE: [StyleKind; 6] = [
    StyleKind::Bold,
    StyleKind::Italic,
    StyleKind::Strikethrough,
    StyleKind::Underline,
    StyleKind::InlineCode,
    StyleKind::Link,
];

impl StyleKind {
    pub fn applies(self, style: &TextStyle) -> bool {
        match self {
            Self::Bold => style.bold,
            Self::Italic => style.italic,
            Self::Strikethrough => style.strikethrough,
            Self::Underline => style.underline,
            Self::InlineCode => style.inline_code,
            Self::Link => style.link.is_some(),
        }
    }

    /// Opening and closing markers for this style
    pub fn markers(
        self,
        style: &TextStyle,
        use_html_tags: bool,
    ) -> (Cow<'static, str>, Cow<'static, str>) {
        match (self, use_html_tags) {
            (Self::Bold, false) => ("**".into(), "**".into()),
            (Self::Bold, true) => ("<strong>".into(), "</strong>".into()),
            (Self::Italic, false) => ("_".into(), "_".into()),
            (Self::Italic, true) => ("<em>".into(), "</em>".into()),
            (Self::Strikethrough, false) => ("~~".into(), "~~".into()),
            (Self::Strikethrough, true) => ("<del>".into(), "</del>".into()),
            (Self::Underline, _) => ("<u>".into(), "</u>".into()),
            (Self::InlineCode, _) => ("`".into(), "`".into()),
            (Self::Link, _) => {
                let url = style.link.as_deref().unwrap_or_default();
                ("[".into(), format!("]({})", link_target(url)).into())
            }
        }
    }
}

/// First applicable style of a run, if any
pub fn select_style(style: &TextStyle) -> Option<StyleKind> {
    STYLE_PRECEDENCE
        .iter()
        .copied()
        .find(|kind| kind.applies(style))
}

/// Number of text runs in a payload that carry no style information
///
/// Such runs still render, as plain content.
pub fn unstyled_runs(payload: &TextPayload) -> usize {
    payload
        .elements
        .iter()
        .filter(|element| matches!(element, TextElement::TextRun(TextRun { style: None, .. })))
        .count()
}

/// Prepare a link target for a Markdown link destination
///
/// Targets from the API are percent-encoded; they are decoded first (the raw
/// string is kept if it does not decode to UTF-8), then the characters that
/// would end or break a link destination are re-encoded.
pub fn link_target(raw: &str) -> String {
    let decoded = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));
    let mut target = String::with_capacity(decoded.len());
    for c in decoded.chars() {
        match c {
            ' ' => target.push_str("%20"),
            '(' => target.push_str("%28"),
            ')' => target.push_str("%29"),
            '<' => target.push_str("%3C"),
            '>' => target.push_str("%3E"),
            _ => target.push(c),
        }
    }
    target
}

/// Renders text payloads to inline Markdown
#[derive(Debug, Clone, Copy)]
pub struct InlineRenderer {
    use_html_tags: bool,
}

impl InlineRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            use_html_tags: config.use_html_tags,
        }
    }

    /// Render every element followed by a terminating newline
    ///
    /// Equations are treated as inline when they share the payload with
    /// other elements.
    pub fn render_text(&self, payload: &TextPayload) -> String {
        let inline = payload.elements.len() > 1;
        let mut output = String::new();
        for element in &payload.elements {
            output.push_str(&self.render_element(element, inline));
        }
        output.push('\n');
        output
    }

    pub fn render_element(&self, element: &TextElement, inline: bool) -> String {
        match element {
            TextElement::TextRun(run) => self.render_run(run),
            TextElement::MentionDoc { title, url } => {
                format!("[{}]({})", title, link_target(url))
            }
            TextElement::MentionUser { user_id } => user_id.clone(),
            TextElement::Equation { content } => {
                let symbol = if inline { "$" } else { "$$" };
                let content = content.strip_suffix('\n').unwrap_or(content);
                format!("{symbol}{content}{symbol}")
            }
            TextElement::Unsupported => String::new(),
        }
    }

    fn render_run(&self, run: &TextRun) -> String {
        let markers = run.style.as_ref().and_then(|style| {
            select_style(style).map(|kind| kind.markers(style, self.use_html_tags))
        });

        match markers {
            Some((open, close)) => format!("{open}{}{close}", run.content),
            None => run.content.clone(),
        }
    }
}
