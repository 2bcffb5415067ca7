// SPDX-License-Identifier: AGPL-3.0-or-later
//! End-to-end conversion of fetched blocks into a Markdown file body
//!
//! Fetching is left to the caller. This module takes the document header
//! and its blocks, renders them, and hands every image token to an
//! [`ImageResolver`] so placeholders can point at real paths.

use crate::ast::{Block, Document};
use crate::index::BlockIndex;
use crate::render::render_document;
use crate::traits::{ConversionError, ImageResolver, RenderConfig, RenderWarning, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

static DOCUMENT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://[a-zA-Z0-9.-]+\.(feishu\.cn|larksuite\.com)/(docx|wiki)/([a-zA-Z0-9]+)")
        .expect("valid document URL pattern")
});

/// Kind of document a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Docx,
    /// Wiki node; the caller resolves it to the underlying document
    Wiki,
}

/// A parsed document URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUrl {
    /// API domain, `feishu.cn` or `larksuite.com`
    pub domain: String,
    pub kind: DocumentKind,
    pub token: String,
}

impl DocumentUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let captures = DOCUMENT_URL
            .captures(url)
            .ok_or_else(|| ConversionError::InvalidUrl(url.to_string()))?;

        let kind = match &captures[2] {
            "docx" => DocumentKind::Docx,
            _ => DocumentKind::Wiki,
        };

        Ok(Self {
            domain: captures[1].to_string(),
            kind,
            token: captures[3].to_string(),
        })
    }
}

impl FromStr for DocumentUrl {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Output settings for a conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Directory handed to the image resolver
    pub image_dir: PathBuf,
    /// Name the output after the document title instead of its identifier
    pub title_as_filename: bool,
    pub use_html_tags: bool,
    /// Leave image placeholders pointing at raw tokens
    pub skip_img_download: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("static"),
            title_as_filename: false,
            use_html_tags: false,
            skip_img_download: false,
        }
    }
}

impl ConvertConfig {
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::default().with_html_tags(self.use_html_tags)
    }
}

/// An image token and the path it was resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedImage {
    pub token: String,
    pub path: String,
}

/// Result of a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub file_name: String,
    /// Markdown with image placeholders resolved
    pub markdown: String,
    /// Markdown as rendered, placeholders still holding tokens
    pub raw_markdown: String,
    pub images: Vec<ResolvedImage>,
    pub warnings: Vec<RenderWarning>,
}

/// Render a document and resolve its images
///
/// Any dangling block reference aborts the conversion. Images are resolved
/// in placeholder order; the first resolver failure aborts as well.
pub fn convert(
    document: &Document,
    blocks: Vec<Block>,
    config: &ConvertConfig,
    resolver: Option<&mut dyn ImageResolver>,
) -> Result<Conversion> {
    let index = BlockIndex::build(blocks)?;
    let output = render_document(&index, &document.id, &config.render_config())?;

    let raw_markdown = output.markdown.clone();
    let mut markdown = output.markdown;
    let mut images = Vec::with_capacity(output.image_tokens.len());

    match resolver {
        Some(resolver) if !config.skip_img_download => {
            for token in output.image_tokens {
                let path = resolver.resolve(&token, &config.image_dir)?;
                markdown = markdown.replacen(
                    &format!("![]({token})"),
                    &format!("![]({path})"),
                    1,
                );
                images.push(ResolvedImage { token, path });
            }
        }
        _ => {
            tracing::debug!(
                images = output.image_tokens.len(),
                "leaving image placeholders unresolved"
            );
        }
    }

    tracing::debug!(document_id = %document.id, warnings = output.warnings.len(), "converted document");

    Ok(Conversion {
        file_name: output_file_name(document, config.title_as_filename),
        markdown,
        raw_markdown,
        images,
        warnings: output.warnings,
    })
}

/// `<id>.md`, or `<title>.md` with path separators replaced when requested
pub fn output_file_name(document: &Document, title_as_filename: bool) -> String {
    if title_as_filename && !document.title.trim().is_empty() {
        let title: String = document
            .title
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("{title}.md")
    } else {
        format!("{}.md", document.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockContent, TextPayload};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[derive(Default)]
    struct RecordingResolver {
        calls: Vec<(String, PathBuf)>,
    }

    impl ImageResolver for RecordingResolver {
        fn resolve(&mut self, token: &str, image_dir: &Path) -> Result<String> {
            self.calls.push((token.to_string(), image_dir.to_path_buf()));
            Ok(format!("{}/{token}.png", image_dir.display()))
        }
    }

    struct FailingResolver;

    impl ImageResolver for FailingResolver {
        fn resolve(&mut self, token: &str, _image_dir: &Path) -> Result<String> {
            Err(ConversionError::ImageResolution {
                token: token.to_string(),
                message: "quota exceeded".to_string(),
            })
        }
    }

    fn sample() -> (Document, Vec<Block>) {
        let document = Document::new("doxcn1", "Team/Plan");
        let blocks = vec![
            Block::new(
                "doxcn1",
                BlockContent::Page {
                    text: Some(TextPayload::plain("Team/Plan")),
                },
            )
            .with_children(["t", "i1", "i2"]),
            Block::new(
                "t",
                BlockContent::Text {
                    text: Some(TextPayload::plain("see imgA below")),
                },
            )
            .with_parent("doxcn1"),
            Block::new(
                "i1",
                BlockContent::Image {
                    token: Some("imgA".to_string()),
                },
            )
            .with_parent("doxcn1"),
            Block::new(
                "i2",
                BlockContent::Image {
                    token: Some("imgB".to_string()),
                },
            )
            .with_parent("doxcn1"),
        ];
        (document, blocks)
    }

    #[test]
    fn test_parse_docx_url() {
        let url = DocumentUrl::parse("https://acme.feishu.cn/docx/AbC123xyz?from=share").unwrap();
        assert_eq!(
            url,
            DocumentUrl {
                domain: "feishu.cn".to_string(),
                kind: DocumentKind::Docx,
                token: "AbC123xyz".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_wiki_url() {
        let url: DocumentUrl = "https://my-team.sg.larksuite.com/wiki/Wk42".parse().unwrap();
        assert_eq!(url.domain, "larksuite.com");
        assert_eq!(url.kind, DocumentKind::Wiki);
        assert_eq!(url.token, "Wk42");
    }

    #[test]
    fn test_parse_invalid_urls() {
        for url in [
            "http://acme.feishu.cn/docx/abc",
            "https://acme.example.com/docx/abc",
            "https://acme.feishu.cn/sheets/abc",
            "https://acme.feishu.cn/docx/",
        ] {
            assert!(matches!(
                DocumentUrl::parse(url),
                Err(ConversionError::InvalidUrl(_))
            ));
        }
    }

    #[test]
    fn test_convert_resolves_images_in_order() {
        let (document, blocks) = sample();
        let mut resolver = RecordingResolver::default();
        let conversion = convert(
            &document,
            blocks,
            &ConvertConfig::default(),
            Some(&mut resolver),
        )
        .unwrap();

        assert_eq!(
            conversion.raw_markdown,
            "# Team/Plan\nsee imgA below\n\n![](imgA)\n\n![](imgB)\n\n"
        );
        assert_eq!(
            conversion.markdown,
            "# Team/Plan\nsee imgA below\n\n![](static/imgA.png)\n\n![](static/imgB.png)\n\n"
        );
        assert_eq!(
            resolver.calls,
            vec![
                ("imgA".to_string(), PathBuf::from("static")),
                ("imgB".to_string(), PathBuf::from("static")),
            ]
        );
        assert_eq!(conversion.images.len(), 2);
        assert_eq!(conversion.images[1].path, "static/imgB.png");
        assert_eq!(conversion.file_name, "doxcn1.md");
    }

    #[test]
    fn test_convert_skip_download_keeps_tokens() {
        let (document, blocks) = sample();
        let config = ConvertConfig {
            skip_img_download: true,
            title_as_filename: true,
            ..Default::default()
        };
        let mut resolver = RecordingResolver::default();
        let conversion = convert(&document, blocks, &config, Some(&mut resolver)).unwrap();

        assert!(resolver.calls.is_empty());
        assert!(conversion.images.is_empty());
        assert_eq!(conversion.markdown, conversion.raw_markdown);
        assert_eq!(conversion.file_name, "Team_Plan.md");
    }

    #[test]
    fn test_convert_without_resolver() {
        let (document, blocks) = sample();
        let conversion = convert(&document, blocks, &ConvertConfig::default(), None).unwrap();
        assert_eq!(conversion.markdown, conversion.raw_markdown);
    }

    #[test]
    fn test_resolver_failure_aborts() {
        let (document, blocks) = sample();
        let err = convert(
            &document,
            blocks,
            &ConvertConfig::default(),
            Some(&mut FailingResolver),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConversionError::ImageResolution { ref token, .. } if token == "imgA"
        ));
    }

    #[test]
    fn test_convert_missing_root() {
        let (_, blocks) = sample();
        let document = Document::new("other", "x");
        let err = convert(&document, blocks, &ConvertConfig::default(), None).unwrap_err();
        assert!(matches!(err, ConversionError::Integrity { .. }));
    }

    #[test]
    fn test_blank_title_falls_back_to_id() {
        let document = Document::new("doxcn9", "   ");
        assert_eq!(output_file_name(&document, true), "doxcn9.md");
    }

    #[test]
    fn test_config_from_json() {
        let config: ConvertConfig =
            serde_json::from_str(r#"{"use_html_tags": true, "image_dir": "assets"}"#).unwrap();
        assert_eq!(config.image_dir, PathBuf::from("assets"));
        assert!(!config.skip_img_download);
        assert!(config.render_config().use_html_tags);
    }
}
