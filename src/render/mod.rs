//! # Content Rendering
//!
//! Turns raw bytes into styled terminal text. The content type comes from the
//! label's file extension:
//!
//! | Extension | Renderer |
//! |-----------|----------|
//! | `.md` | [`Renderer::Markdown`] |
//! | `.png`, `.jpg`, `.jpeg` | [`Renderer::Image`] |
//! | anything else | [`Renderer::PlainText`] |
//!
//! Markdown and image renderers are built for a fixed viewport width, so the
//! viewer throws its cached renderer away on every resize.

pub mod image;
pub mod markdown;

use ratatui::text::Text;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    PlainText,
    Markdown,
    Image,
}

impl ContentType {
    /// Classify a label (usually a file name) by its extension.
    pub fn from_label(label: &str) -> Self {
        let ext = Path::new(label)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("md") => ContentType::Markdown,
            Some("png" | "jpg" | "jpeg") => ContentType::Image,
            _ => ContentType::PlainText,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("viewport has no width")]
    ZeroWidth,

    #[error("cannot decode image: {0}")]
    Image(#[from] ::image::ImageError),

    #[error("image has no pixels")]
    EmptyImage,

    #[error("image needs {rows} rows, more than the viewer shows")]
    TooTall { rows: u32 },
}

/// A renderer bound to the viewport width it was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    PlainText,
    Markdown { width: u16 },
    Image { width: u16 },
}

impl Renderer {
    pub fn new(content_type: ContentType, width: u16) -> Result<Self, RenderError> {
        match content_type {
            ContentType::PlainText => Ok(Renderer::PlainText),
            ContentType::Markdown | ContentType::Image if width == 0 => {
                Err(RenderError::ZeroWidth)
            }
            ContentType::Markdown => Ok(Renderer::Markdown { width }),
            ContentType::Image => Ok(Renderer::Image { width }),
        }
    }

    pub fn render(&self, input: &[u8]) -> Result<Text<'static>, RenderError> {
        match *self {
            Renderer::PlainText => Ok(Text::raw(String::from_utf8_lossy(input).into_owned())),
            Renderer::Markdown { width } => Ok(markdown::render(
                &String::from_utf8_lossy(input),
                usize::from(width),
            )),
            Renderer::Image { width } => image::render(input, u32::from(width)),
        }
    }
}

/// Flatten styled text back to a plain string, one line per `\n`.
pub fn text_to_string(text: &Text<'_>) -> String {
    text.lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_label() {
        assert_eq!(ContentType::from_label("hello.md"), ContentType::Markdown);
        assert_eq!(ContentType::from_label("/files/cat.png"), ContentType::Image);
        assert_eq!(ContentType::from_label("photo.JPG"), ContentType::Image);
        assert_eq!(ContentType::from_label("a.jpeg"), ContentType::Image);
        assert_eq!(ContentType::from_label("notes.txt"), ContentType::PlainText);
        assert_eq!(ContentType::from_label("stderr"), ContentType::PlainText);
        assert_eq!(ContentType::from_label(""), ContentType::PlainText);
    }

    #[test]
    fn test_plain_text_is_identity() {
        let text = Renderer::PlainText
            .render(b"line one\nline two")
            .expect("render");
        assert_eq!(text_to_string(&text), "line one\nline two");
    }

    #[test]
    fn test_zero_width_rejected_for_sized_renderers() {
        assert!(Renderer::new(ContentType::Markdown, 0).is_err());
        assert!(Renderer::new(ContentType::Image, 0).is_err());
        assert_eq!(
            Renderer::new(ContentType::PlainText, 0).expect("plain"),
            Renderer::PlainText
        );
    }

    #[test]
    fn test_sized_renderers_keep_width() {
        assert_eq!(
            Renderer::new(ContentType::Image, 40).expect("image"),
            Renderer::Image { width: 40 }
        );
        assert_eq!(
            Renderer::new(ContentType::Markdown, 12).expect("markdown"),
            Renderer::Markdown { width: 12 }
        );
    }
}
