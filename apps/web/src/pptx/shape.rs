/// Shapes that can be placed on a slide, and their DrawingML serialization.
use std::fmt::Write as FmtWrite;

use super::{escape_text, Frame, PptxError, Result, RgbColor};

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
}

impl Align {
    fn as_attr(self) -> &'static str {
        match self {
            Align::Left => "l",
        }
    }
}

/// Run-level formatting applied to a whole paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub size_pt: u16,
    pub bold: bool,
    pub color: RgbColor,
    pub font: String,
    pub align: Option<Align>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Filled rectangle with no outline.
    Rectangle {
        name: String,
        frame: Frame,
        fill: RgbColor,
    },
    TextBox {
        name: String,
        frame: Frame,
        word_wrap: bool,
        paragraphs: Vec<Paragraph>,
    },
    /// Picture referencing the slide's image list by position.
    Picture {
        name: String,
        frame: Frame,
        image_index: usize,
    },
}

impl Shape {
    pub fn name(&self) -> &str {
        match self {
            Shape::Rectangle { name, .. }
            | Shape::TextBox { name, .. }
            | Shape::Picture { name, .. } => name,
        }
    }

    pub fn frame(&self) -> Frame {
        match self {
            Shape::Rectangle { frame, .. }
            | Shape::TextBox { frame, .. }
            | Shape::Picture { frame, .. } => *frame,
        }
    }

    /// Appends the `p:sp` / `p:pic` element for this shape.
    ///
    /// `image_rel_id` maps an image index to the slide relationship ID that embeds it.
    pub(crate) fn write_xml(
        &self,
        xml: &mut String,
        id: u32,
        image_rel_id: impl Fn(usize) -> Option<String>,
    ) -> Result<()> {
        match self {
            Shape::Rectangle { name, frame, fill } => {
                xml.push_str("<p:sp><p:nvSpPr>");
                write!(xml, r#"<p:cNvPr id="{id}" name="{}"/>"#, escape_text(name))?;
                xml.push_str("<p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>");
                write_xfrm(xml, frame)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, fill.hex())?;
                xml.push_str("<a:ln><a:noFill/></a:ln></p:spPr>");
                xml.push_str(
                    r#"<p:txBody><a:bodyPr rtlCol="0" anchor="ctr"/><a:lstStyle/><a:p/></p:txBody>"#,
                );
                xml.push_str("</p:sp>");
            }
            Shape::TextBox {
                name,
                frame,
                word_wrap,
                paragraphs,
            } => {
                xml.push_str("<p:sp><p:nvSpPr>");
                write!(xml, r#"<p:cNvPr id="{id}" name="{}"/>"#, escape_text(name))?;
                xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#);
                write_xfrm(xml, frame)?;
                xml.push_str(
                    r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
                );
                let wrap = if *word_wrap { "square" } else { "none" };
                write!(
                    xml,
                    r#"<p:txBody><a:bodyPr wrap="{wrap}" rtlCol="0"><a:spAutoFit/></a:bodyPr><a:lstStyle/>"#
                )?;
                if paragraphs.is_empty() {
                    // txBody must hold at least one paragraph
                    xml.push_str("<a:p/>");
                }
                for paragraph in paragraphs {
                    write_paragraph(xml, paragraph)?;
                }
                xml.push_str("</p:txBody></p:sp>");
            }
            Shape::Picture {
                name,
                frame,
                image_index,
            } => {
                let rel_id = image_rel_id(*image_index).ok_or_else(|| {
                    PptxError::Xml(format!(
                        "picture '{name}' references missing image {image_index}"
                    ))
                })?;
                xml.push_str("<p:pic><p:nvPicPr>");
                write!(xml, r#"<p:cNvPr id="{id}" name="{}"/>"#, escape_text(name))?;
                xml.push_str(
                    r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
                );
                write!(
                    xml,
                    r#"<p:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#
                )?;
                xml.push_str("<p:spPr>");
                write_xfrm(xml, frame)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
            }
        }
        Ok(())
    }
}

fn write_xfrm(xml: &mut String, frame: &Frame) -> Result<()> {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x, frame.y, frame.cx, frame.cy
    )?;
    Ok(())
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) -> Result<()> {
    let style = &paragraph.style;
    xml.push_str("<a:p>");
    if let Some(align) = style.align {
        write!(xml, r#"<a:pPr algn="{}"/>"#, align.as_attr())?;
    }
    xml.push_str("<a:r>");
    write!(
        xml,
        r#"<a:rPr lang="en-US" sz="{}" b="{}" dirty="0">"#,
        u32::from(style.size_pt) * 100,
        if style.bold { 1 } else { 0 }
    )?;
    write!(
        xml,
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
        style.color.hex()
    )?;
    write!(xml, r#"<a:latin typeface="{}"/>"#, escape_text(&style.font))?;
    xml.push_str("</a:rPr>");
    write!(xml, "<a:t>{}</a:t>", escape_text(&paragraph.text))?;
    xml.push_str("</a:r></a:p>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::inches;

    fn style() -> TextStyle {
        TextStyle {
            size_pt: 18,
            bold: false,
            color: RgbColor(33, 37, 41),
            font: "Calibri".to_string(),
            align: None,
        }
    }

    fn frame() -> Frame {
        Frame::new(inches(0.8), inches(1.4), inches(5.8), inches(4.4))
    }

    #[test]
    fn test_text_box_escapes_and_sizes_runs() {
        let shape = Shape::TextBox {
            name: "Body".to_string(),
            frame: frame(),
            word_wrap: true,
            paragraphs: vec![Paragraph::new("R&D <fast>", style())],
        };
        let mut xml = String::new();
        shape.write_xml(&mut xml, 3, |_| None).unwrap();

        assert!(xml.contains(r#"txBox="1""#));
        assert!(xml.contains(r#"wrap="square""#));
        assert!(xml.contains(r#"sz="1800""#));
        assert!(xml.contains(r#"<a:srgbClr val="212529"/>"#));
        assert!(xml.contains("<a:t>R&amp;D &lt;fast&gt;</a:t>"));
    }

    #[test]
    fn test_empty_text_box_still_has_paragraph() {
        let shape = Shape::TextBox {
            name: "Body".to_string(),
            frame: frame(),
            word_wrap: false,
            paragraphs: vec![],
        };
        let mut xml = String::new();
        shape.write_xml(&mut xml, 3, |_| None).unwrap();
        assert!(xml.contains("<a:p/>"));
        assert!(xml.contains(r#"wrap="none""#));
    }

    #[test]
    fn test_rectangle_has_fill_and_no_outline() {
        let shape = Shape::Rectangle {
            name: "Accent".to_string(),
            frame: frame(),
            fill: RgbColor(11, 102, 182),
        };
        let mut xml = String::new();
        shape.write_xml(&mut xml, 2, |_| None).unwrap();
        assert!(xml.contains(r#"<a:srgbClr val="0B66B6"/>"#));
        assert!(xml.contains("<a:ln><a:noFill/></a:ln>"));
    }

    #[test]
    fn test_picture_without_relationship_fails() {
        let shape = Shape::Picture {
            name: "Photo".to_string(),
            frame: frame(),
            image_index: 0,
        };
        let mut xml = String::new();
        assert!(shape.write_xml(&mut xml, 4, |_| None).is_err());

        let mut xml = String::new();
        shape
            .write_xml(&mut xml, 4, |i| Some(format!("rId{}", i + 2)))
            .unwrap();
        assert!(xml.contains(r#"r:embed="rId2""#));
    }
}
