// Document renderer boundary.
// This service does not write .docx files. It turns markdown-ish copy into a
// flat block list, and that list (served as JSON by the export route) is the
// hand-off format for the external document writer, which owns the file.
// `##`..`####` lines become headings one level shallower. Every other
// non-blank line becomes a paragraph with bold markers removed.

use serde::{Deserialize, Serialize};

pub const DOCUMENT_FONT: &str = "Calibri";
pub const DOCUMENT_FONT_SIZE_PT: u8 = 11;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub font: String,
    pub font_size_pt: u8,
    pub blocks: Vec<Block>,
}

impl RenderedDocument {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// `## text` → (2, "text"). Only 2 to 4 hashes followed by whitespace count.
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if !(2..=4).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim();
    (!text.is_empty()).then_some((hashes as u8, text))
}

pub fn render_document(copy: &str) -> RenderedDocument {
    let blocks = copy
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match heading(line) {
            Some((hashes, text)) => Block::Heading {
                level: hashes - 1,
                text: text.to_string(),
            },
            None => Block::Paragraph {
                text: line.replace("**", ""),
            },
        })
        .collect();

    RenderedDocument {
        font: DOCUMENT_FONT.to_string(),
        font_size_pt: DOCUMENT_FONT_SIZE_PT,
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading_block(level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    fn paragraph(text: &str) -> Block {
        Block::Paragraph {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_heading_levels_drop_by_one() {
        let doc = render_document("## Headline\n### Introduction\n#### Detail");
        assert_eq!(
            doc.blocks,
            vec![
                heading_block(1, "Headline"),
                heading_block(2, "Introduction"),
                heading_block(3, "Detail"),
            ]
        );
    }

    #[test]
    fn test_other_lines_become_paragraphs_without_bold_markers() {
        let doc = render_document("**CTA:** Activate my membership\n# Not a heading\n##### Too deep\n##NoSpace");
        assert_eq!(
            doc.blocks,
            vec![
                paragraph("CTA: Activate my membership"),
                paragraph("# Not a heading"),
                paragraph("##### Too deep"),
                paragraph("##NoSpace"),
            ]
        );
    }

    #[test]
    fn test_blank_lines_are_dropped_and_font_is_fixed() {
        let doc = render_document("\n## Subject\n\n   \nHello\n");
        assert_eq!(doc.blocks, vec![heading_block(1, "Subject"), paragraph("Hello")]);
        assert_eq!(doc.font, "Calibri");
        assert_eq!(doc.font_size_pt, 11);
        assert!(render_document("  \n\n").is_empty());
    }

    #[test]
    fn test_hand_off_json_shape_is_stable() {
        let doc = render_document("## Subject\n**Hi** there");
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            serde_json::json!({
                "font": "Calibri",
                "font_size_pt": 11,
                "blocks": [
                    { "kind": "heading", "level": 1, "text": "Subject" },
                    { "kind": "paragraph", "text": "Hi there" }
                ]
            })
        );
    }
}
