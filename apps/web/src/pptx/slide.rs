/// A single slide: optional solid background, shapes in z-order, embedded images.
use std::fmt::Write as FmtWrite;

use super::shape::{Paragraph, Shape};
use super::template::{NS_A, NS_P, NS_PKG_RELS, NS_R, REL_IMAGE, REL_SLIDE_LAYOUT, XML_DECLARATION};
use super::{Frame, Image, Result, RgbColor};

/// Relationship ID of the slide layout; image relationships follow from `rId2`.
const LAYOUT_REL_ID: &str = "rId1";
const FIRST_IMAGE_REL: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct Slide {
    background: Option<RgbColor>,
    shapes: Vec<Shape>,
    images: Vec<Image>,
}

impl Slide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_background(&mut self, color: RgbColor) {
        self.background = Some(color);
    }

    pub fn background(&self) -> Option<RgbColor> {
        self.background
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn add_rectangle(&mut self, name: &str, frame: Frame, fill: RgbColor) -> Result<()> {
        frame.validate(name)?;
        self.shapes.push(Shape::Rectangle {
            name: name.to_string(),
            frame,
            fill,
        });
        Ok(())
    }

    pub fn add_text_box(
        &mut self,
        name: &str,
        frame: Frame,
        word_wrap: bool,
        paragraphs: Vec<Paragraph>,
    ) -> Result<()> {
        frame.validate(name)?;
        self.shapes.push(Shape::TextBox {
            name: name.to_string(),
            frame,
            word_wrap,
            paragraphs,
        });
        Ok(())
    }

    /// Embeds `image` and places it in `frame`. Nothing is added if the frame is invalid.
    pub fn add_picture(&mut self, name: &str, frame: Frame, image: Image) -> Result<()> {
        frame.validate(name)?;
        self.images.push(image);
        self.shapes.push(Shape::Picture {
            name: name.to_string(),
            frame,
            image_index: self.images.len() - 1,
        });
        Ok(())
    }

    fn image_rel_id(index: usize) -> String {
        format!("rId{}", index + FIRST_IMAGE_REL)
    }

    /// Generates `ppt/slides/slideN.xml`.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096);
        xml.push_str(XML_DECLARATION);
        write!(xml, r#"<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#)?;
        xml.push_str("<p:cSld>");

        // Background must come before spTree
        if let Some(color) = self.background {
            write!(
                xml,
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
                color.hex()
            )?;
        }

        xml.push_str("<p:spTree>");
        xml.push_str(
            r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
        );
        xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#);
        xml.push_str(r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

        let image_count = self.images.len();
        for (index, shape) in self.shapes.iter().enumerate() {
            // id 1 is the group shape
            let id = index as u32 + 2;
            shape.write_xml(&mut xml, id, |image_index| {
                (image_index < image_count).then(|| Self::image_rel_id(image_index))
            })?;
        }

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        Ok(xml)
    }

    /// Generates `ppt/slides/_rels/slideN.xml.rels`.
    ///
    /// `media_names` holds the package file name (e.g. `image3.png`) of each of
    /// this slide's images, in the same order as [`Slide::images`].
    pub fn rels_xml(&self, media_names: &[String]) -> Result<String> {
        let mut xml = String::with_capacity(512);
        xml.push_str(XML_DECLARATION);
        write!(xml, r#"<Relationships xmlns="{NS_PKG_RELS}">"#)?;
        write!(
            xml,
            r#"<Relationship Id="{LAYOUT_REL_ID}" Type="{REL_SLIDE_LAYOUT}" Target="../slideLayouts/slideLayout1.xml"/>"#
        )?;
        for (index, media_name) in media_names.iter().enumerate() {
            write!(
                xml,
                r#"<Relationship Id="{}" Type="{REL_IMAGE}" Target="../media/{media_name}"/>"#,
                Self::image_rel_id(index)
            )?;
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::{inches, ImageFormat, PptxError};

    #[test]
    fn test_invalid_frame_is_rejected_and_not_added() {
        let mut slide = Slide::new();
        let err = slide
            .add_rectangle("Accent", Frame::new(0, 0, inches(0.6), 0), RgbColor(1, 2, 3))
            .unwrap_err();
        assert!(matches!(err, PptxError::InvalidGeometry(_)));
        assert!(slide.shapes().is_empty());
    }

    #[test]
    fn test_background_precedes_shape_tree() {
        let mut slide = Slide::new();
        slide.set_background(RgbColor(245, 247, 250));
        slide
            .add_rectangle("Accent", Frame::new(0, 0, inches(0.6), inches(7.5)), RgbColor(0, 0, 0))
            .unwrap();
        let xml = slide.to_xml().unwrap();

        let bg = xml.find("<p:bg>").unwrap();
        let tree = xml.find("<p:spTree>").unwrap();
        assert!(bg < tree);
        assert!(xml.contains(r#"val="F5F7FA""#));
        assert!(xml.contains(r#"<p:cNvPr id="2" name="Accent"/>"#));
    }

    #[test]
    fn test_picture_relationships_start_after_layout() {
        let mut slide = Slide::new();
        let image = Image::new(vec![0x89, b'P', b'N', b'G'], ImageFormat::Png);
        slide
            .add_picture("Photo", Frame::new(0, 0, inches(3.0), inches(2.2)), image)
            .unwrap();

        let xml = slide.to_xml().unwrap();
        assert!(xml.contains(r#"r:embed="rId2""#));

        let rels = slide.rels_xml(&["image1.png".to_string()]).unwrap();
        assert!(rels.contains(r#"Id="rId1""#));
        assert!(rels.contains("slideLayout1.xml"));
        assert!(rels.contains(r#"Id="rId2""#));
        assert!(rels.contains(r#"Target="../media/image1.png""#));
    }
}
