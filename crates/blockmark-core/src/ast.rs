// SPDX-License-Identifier: AGPL-3.0-or-later
//! Block model for documents fetched from a block-structured document API
//!
//! A document arrives as a flat list of blocks. Each block names its parent
//! and its ordered children by identifier; the tree is implicit and is only
//! reconstructed by [`crate::index::BlockIndex`].

use serde::{Deserialize, Serialize};

/// Numeric block type codes used by the document API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Page = 1,
    Text = 2,
    Heading1 = 3,
    Heading2 = 4,
    Heading3 = 5,
    Heading4 = 6,
    Heading5 = 7,
    Heading6 = 8,
    Heading7 = 9,
    Heading8 = 10,
    Heading9 = 11,
    Bullet = 12,
    Ordered = 13,
    Code = 14,
    Quote = 15,
    Equation = 16,
    Todo = 17,
    Bitable = 18,
    Callout = 19,
    ChatCard = 20,
    Diagram = 21,
    Divider = 22,
    File = 23,
    Grid = 24,
    GridColumn = 25,
    Iframe = 26,
    Image = 27,
    Isv = 28,
    Mindnote = 29,
    Sheet = 30,
    Table = 31,
    TableCell = 32,
    View = 33,
    QuoteContainer = 34,
    Task = 35,
    Okr = 36,
    OkrObjective = 37,
    OkrKeyResult = 38,
    Progress = 39,
    Undefined = 999,
}

impl BlockType {
    /// Every known block type, in code order
    pub const ALL: [Self; 40] = [
        Self::Page,
        Self::Text,
        Self::Heading1,
        Self::Heading2,
        Self::Heading3,
        Self::Heading4,
        Self::Heading5,
        Self::Heading6,
        Self::Heading7,
        Self::Heading8,
        Self::Heading9,
        Self::Bullet,
        Self::Ordered,
        Self::Code,
        Self::Quote,
        Self::Equation,
        Self::Todo,
        Self::Bitable,
        Self::Callout,
        Self::ChatCard,
        Self::Diagram,
        Self::Divider,
        Self::File,
        Self::Grid,
        Self::GridColumn,
        Self::Iframe,
        Self::Image,
        Self::Isv,
        Self::Mindnote,
        Self::Sheet,
        Self::Table,
        Self::TableCell,
        Self::View,
        Self::QuoteContainer,
        Self::Task,
        Self::Okr,
        Self::OkrObjective,
        Self::OkrKeyResult,
        Self::Progress,
        Self::Undefined,
    ];

    /// Map an API code to a block type; unknown codes become `Undefined`
    pub fn from_code(code: i64) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .unwrap_or(Self::Undefined)
    }

    pub const fn code(&self) -> i64 {
        *self as i64
    }

    /// Heading block type for a level in 1..=9
    pub const fn heading(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Heading1),
            2 => Some(Self::Heading2),
            3 => Some(Self::Heading3),
            4 => Some(Self::Heading4),
            5 => Some(Self::Heading5),
            6 => Some(Self::Heading6),
            7 => Some(Self::Heading7),
            8 => Some(Self::Heading8),
            9 => Some(Self::Heading9),
            _ => None,
        }
    }

    /// Heading level (1-9) if this is a heading type
    pub const fn heading_level(&self) -> Option<u8> {
        let code = self.code();
        if code >= Self::Heading1.code() && code <= Self::Heading9.code() {
            Some((code - Self::Heading1.code() + 1) as u8)
        } else {
            None
        }
    }
}

macro_rules! code_languages {
    ($($variant:ident = $code:literal => $tag:literal,)*) => {
        /// Code block language, with the fence tag emitted for it
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum CodeLanguage {
            $($variant,)*
        }

        impl CodeLanguage {
            pub const fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub const fn code(&self) -> i64 {
                match self {
                    $(Self::$variant => $code,)*
                }
            }

            /// Info string for a fenced code block; empty for plain text
            pub const fn fence_tag(&self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)*
                }
            }
        }
    };
}

code_languages! {
    PlainText = 1 => "",
    Abap = 2 => "abap",
    Ada = 3 => "ada",
    Apache = 4 => "apache",
    Apex = 5 => "apex",
    Assembly = 6 => "assembly",
    Bash = 7 => "bash",
    CSharp = 8 => "csharp",
    CPlusPlus = 9 => "cpp",
    C = 10 => "c",
    Cobol = 11 => "cobol",
    Css = 12 => "css",
    CoffeeScript = 13 => "coffeescript",
    D = 14 => "d",
    Dart = 15 => "dart",
    Delphi = 16 => "delphi",
    Django = 17 => "django",
    Dockerfile = 18 => "dockerfile",
    Erlang = 19 => "erlang",
    Fortran = 20 => "fortran",
    FoxPro = 21 => "foxpro",
    Go = 22 => "go",
    Groovy = 23 => "groovy",
    Html = 24 => "html",
    HtmlBars = 25 => "htmlbars",
    Http = 26 => "http",
    Haskell = 27 => "haskell",
    Json = 28 => "json",
    Java = 29 => "java",
    JavaScript = 30 => "javascript",
    Julia = 31 => "julia",
    Kotlin = 32 => "kotlin",
    Latex = 33 => "latex",
    Lisp = 34 => "lisp",
    Logo = 35 => "logo",
    Lua = 36 => "lua",
    Matlab = 37 => "matlab",
    Makefile = 38 => "makefile",
    Markdown = 39 => "markdown",
    Nginx = 40 => "nginx",
    ObjectiveC = 41 => "objectivec",
    OpenEdgeAbl = 42 => "openedge-abl",
    Php = 43 => "php",
    Perl = 44 => "perl",
    PostScript = 45 => "postscript",
    PowerShell = 46 => "powershell",
    Prolog = 47 => "prolog",
    ProtoBuf = 48 => "protobuf",
    Python = 49 => "python",
    R = 50 => "r",
    Rpg = 51 => "rpg",
    Ruby = 52 => "ruby",
    Rust = 53 => "rust",
    Sas = 54 => "sas",
    Scss = 55 => "scss",
    Sql = 56 => "sql",
    Scala = 57 => "scala",
    Scheme = 58 => "scheme",
    Scratch = 59 => "scratch",
    Shell = 60 => "shell",
    Swift = 61 => "swift",
    Thrift = 62 => "thrift",
    TypeScript = 63 => "typescript",
    VbScript = 64 => "vbscript",
    VisualBasic = 65 => "vbnet",
    Xml = 66 => "xml",
    Yaml = 67 => "yaml",
}

/// Document header returned alongside its blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier of the document, which is also the root block identifier
    pub id: String,
    pub title: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A single block as delivered by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Child identifiers in render order
    #[serde(default)]
    pub children: Vec<String>,
    pub content: BlockContent,
}

impl Block {
    pub fn new(id: impl Into<String>, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            children: Vec::new(),
            content,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn block_type(&self) -> BlockType {
        self.content.block_type()
    }
}

/// Type-specific payload of a block
///
/// Text payloads are optional: the API occasionally omits them, and the
/// renderer degrades those blocks to empty text instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    Page {
        text: Option<TextPayload>,
    },
    Text {
        text: Option<TextPayload>,
    },
    /// Heading with level 1-9
    Heading {
        level: u8,
        text: Option<TextPayload>,
    },
    Bullet {
        text: Option<TextPayload>,
    },
    Ordered {
        text: Option<TextPayload>,
    },
    Code {
        language: Option<CodeLanguage>,
        text: Option<TextPayload>,
    },
    Quote {
        text: Option<TextPayload>,
    },
    Equation {
        text: Option<TextPayload>,
    },
    Todo {
        done: bool,
        text: Option<TextPayload>,
    },
    Divider,
    Image {
        token: Option<String>,
    },
    /// Row-major flattened cell identifiers
    Table {
        column_count: Option<usize>,
        #[serde(default)]
        cells: Vec<String>,
    },
    TableCell,
    QuoteContainer,
    /// Any block type the renderer does not model
    Unsupported {
        block_type: BlockType,
    },
}

impl BlockContent {
    pub fn block_type(&self) -> BlockType {
        match self {
            Self::Page { .. } => BlockType::Page,
            Self::Text { .. } => BlockType::Text,
            Self::Heading { level, .. } => {
                BlockType::heading(*level).unwrap_or(BlockType::Undefined)
            }
            Self::Bullet { .. } => BlockType::Bullet,
            Self::Ordered { .. } => BlockType::Ordered,
            Self::Code { .. } => BlockType::Code,
            Self::Quote { .. } => BlockType::Quote,
            Self::Equation { .. } => BlockType::Equation,
            Self::Todo { .. } => BlockType::Todo,
            Self::Divider => BlockType::Divider,
            Self::Image { .. } => BlockType::Image,
            Self::Table { .. } => BlockType::Table,
            Self::TableCell => BlockType::TableCell,
            Self::QuoteContainer => BlockType::QuoteContainer,
            Self::Unsupported { block_type } => *block_type,
        }
    }

    pub fn is_ordered(&self) -> bool {
        matches!(self, Self::Ordered { .. })
    }
}

/// Ordered sequence of inline elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextPayload {
    pub elements: Vec<TextElement>,
}

impl TextPayload {
    pub fn new(elements: Vec<TextElement>) -> Self {
        Self { elements }
    }

    /// A payload holding a single unstyled run
    pub fn plain(content: impl Into<String>) -> Self {
        Self::new(vec![TextElement::text(content)])
    }
}

/// Inline element of a text payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextElement {
    TextRun(TextRun),
    MentionDoc { title: String, url: String },
    MentionUser { user_id: String },
    Equation { content: String },
    /// Reminders, file chips and other elements with no Markdown form
    Unsupported,
}

impl TextElement {
    /// A run with every style flag cleared
    pub fn text(content: impl Into<String>) -> Self {
        Self::styled(content, TextStyle::default())
    }

    pub fn styled(content: impl Into<String>, style: TextStyle) -> Self {
        Self::TextRun(TextRun {
            content: content.into(),
            style: Some(style),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub content: String,
    /// `None` when the payload carried no style information at all
    pub style: Option<TextStyle>,
}

/// Style flags of a text run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub inline_code: bool,
    /// Link target, possibly percent-encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_type_code_roundtrip() {
        for block_type in BlockType::ALL {
            assert_eq!(BlockType::from_code(block_type.code()), block_type);
        }
    }

    #[test]
    fn test_unknown_block_code_is_undefined() {
        assert_eq!(BlockType::from_code(0), BlockType::Undefined);
        assert_eq!(BlockType::from_code(40), BlockType::Undefined);
        assert_eq!(BlockType::from_code(-3), BlockType::Undefined);
    }

    #[test]
    fn test_heading_levels() {
        for level in 1..=9u8 {
            let block_type = BlockType::heading(level).unwrap();
            assert_eq!(block_type.heading_level(), Some(level));
        }
        assert_eq!(BlockType::heading(0), None);
        assert_eq!(BlockType::heading(10), None);
        assert_eq!(BlockType::Bullet.heading_level(), None);
    }

    #[test]
    fn test_code_language_tags() {
        assert_eq!(CodeLanguage::from_code(1).unwrap().fence_tag(), "");
        assert_eq!(CodeLanguage::from_code(9).unwrap().fence_tag(), "cpp");
        assert_eq!(CodeLanguage::from_code(42).unwrap().fence_tag(), "openedge-abl");
        assert_eq!(CodeLanguage::from_code(53).unwrap().fence_tag(), "rust");
        assert_eq!(CodeLanguage::from_code(65).unwrap().fence_tag(), "vbnet");
        assert_eq!(CodeLanguage::from_code(67).unwrap().fence_tag(), "yaml");
        assert_eq!(CodeLanguage::from_code(68), None);
        assert_eq!(CodeLanguage::from_code(0), None);
    }

    #[test]
    fn test_code_language_code_roundtrip() {
        for code in 1..=67 {
            let language = CodeLanguage::from_code(code).unwrap();
            assert_eq!(language.code(), code);
        }
    }

    #[test]
    fn test_block_builder() {
        let block = Block::new("b1", BlockContent::Divider)
            .with_parent("root")
            .with_children(["c1", "c2"]);
        assert_eq!(block.parent_id.as_deref(), Some("root"));
        assert_eq!(block.children, vec!["c1".to_string(), "c2".to_string()]);
        assert_eq!(block.block_type(), BlockType::Divider);
    }

    #[test]
    fn test_content_block_type() {
        let heading = BlockContent::Heading {
            level: 7,
            text: None,
        };
        assert_eq!(heading.block_type(), BlockType::Heading7);

        let unsupported = BlockContent::Unsupported {
            block_type: BlockType::Callout,
        };
        assert_eq!(unsupported.block_type(), BlockType::Callout);
        assert!(!unsupported.is_ordered());
        assert!(BlockContent::Ordered { text: None }.is_ordered());
    }

    #[test]
    fn test_block_serde_roundtrip() {
        let block = Block::new(
            "b1",
            BlockContent::Code {
                language: CodeLanguage::from_code(49),
                text: Some(TextPayload::plain("print(1)")),
            },
        );
        let json = serde_json::to_string(&block).expect("serialize");
        let back: Block = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(block, back);
    }
}
