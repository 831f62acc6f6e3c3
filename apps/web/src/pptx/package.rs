//! OPC package assembly: writes every part of a presentation into a zip archive.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};

use chrono::{SecondsFormat, Utc};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::template::*;
use super::{escape_text, ImageFormat, Presentation, Result};

/// Slide IDs in `p:sldIdLst` must be at least 256.
const FIRST_SLIDE_ID: usize = 256;

/// Writes the complete `.pptx` package for `presentation`.
pub fn write_package(presentation: &Presentation) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    // Media file names are global to the package; assign them slide by slide.
    let mut media_counter = 0usize;
    let mut media_per_slide: Vec<Vec<String>> = Vec::with_capacity(presentation.slide_count());
    let mut formats = BTreeSet::new();
    for slide in presentation.slides() {
        let names = slide
            .images()
            .iter()
            .map(|image| {
                media_counter += 1;
                formats.insert(image.format.extension());
                format!("image{media_counter}.{}", image.format.extension())
            })
            .collect();
        media_per_slide.push(names);
    }

    add_part(
        &mut zip,
        options,
        "[Content_Types].xml",
        &content_types_xml(presentation, &formats)?,
    )?;
    add_part(&mut zip, options, "_rels/.rels", &root_rels_xml()?)?;
    add_part(&mut zip, options, "docProps/core.xml", &core_props_xml(presentation)?)?;
    add_part(&mut zip, options, "docProps/app.xml", &app_props_xml(presentation)?)?;
    add_part(&mut zip, options, "ppt/presentation.xml", &presentation_xml(presentation)?)?;
    add_part(
        &mut zip,
        options,
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels_xml(presentation)?,
    )?;
    add_part(&mut zip, options, "ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER_XML)?;
    add_part(
        &mut zip,
        options,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        SLIDE_MASTER_RELS_XML,
    )?;
    add_part(&mut zip, options, "ppt/slideLayouts/slideLayout1.xml", BLANK_LAYOUT_XML)?;
    add_part(
        &mut zip,
        options,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        BLANK_LAYOUT_RELS_XML,
    )?;
    add_part(&mut zip, options, "ppt/theme/theme1.xml", THEME_XML)?;

    for (index, (slide, media_names)) in presentation
        .slides()
        .iter()
        .zip(media_per_slide.iter())
        .enumerate()
    {
        let number = index + 1;
        add_part(&mut zip, options, &format!("ppt/slides/slide{number}.xml"), &slide.to_xml()?)?;
        add_part(
            &mut zip,
            options,
            &format!("ppt/slides/_rels/slide{number}.xml.rels"),
            &slide.rels_xml(media_names)?,
        )?;
        for (image, name) in slide.images().iter().zip(media_names) {
            zip.start_file(format!("ppt/media/{name}"), options)?;
            zip.write_all(&image.data)?;
        }
    }

    let bytes = zip.finish()?.into_inner();
    debug!(
        "Wrote presentation package: {} slides, {} images, {} bytes",
        presentation.slide_count(),
        media_counter,
        bytes.len()
    );
    Ok(bytes)
}

fn add_part<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    options: FileOptions,
    path: &str,
    content: &str,
) -> Result<()> {
    zip.start_file(path, options)?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn content_types_xml(
    presentation: &Presentation,
    image_extensions: &BTreeSet<&str>,
) -> Result<String> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECLARATION);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    write!(xml, r#"<Default Extension="rels" ContentType="{CT_RELATIONSHIPS}"/>"#)?;
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for ext in image_extensions {
        let content_type = ImageFormat::from_extension(ext)
            .map(|f| f.content_type())
            .unwrap_or("application/octet-stream");
        write!(xml, r#"<Default Extension="{ext}" ContentType="{content_type}"/>"#)?;
    }
    write!(xml, r#"<Override PartName="/ppt/presentation.xml" ContentType="{CT_PRESENTATION}"/>"#)?;
    write!(
        xml,
        r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="{CT_SLIDE_MASTER}"/>"#
    )?;
    write!(
        xml,
        r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="{CT_SLIDE_LAYOUT}"/>"#
    )?;
    write!(xml, r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="{CT_THEME}"/>"#)?;
    for number in 1..=presentation.slide_count() {
        write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{number}.xml" ContentType="{CT_SLIDE}"/>"#
        )?;
    }
    write!(xml, r#"<Override PartName="/docProps/core.xml" ContentType="{CT_CORE_PROPS}"/>"#)?;
    write!(xml, r#"<Override PartName="/docProps/app.xml" ContentType="{CT_EXTENDED_PROPS}"/>"#)?;
    xml.push_str("</Types>");
    Ok(xml)
}

fn root_rels_xml() -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<Relationships xmlns="{NS_PKG_RELS}">"#)?;
    write!(
        xml,
        r#"<Relationship Id="rId1" Type="{REL_OFFICE_DOCUMENT}" Target="ppt/presentation.xml"/>"#
    )?;
    write!(xml, r#"<Relationship Id="rId2" Type="{REL_CORE_PROPS}" Target="docProps/core.xml"/>"#)?;
    write!(
        xml,
        r#"<Relationship Id="rId3" Type="{REL_EXTENDED_PROPS}" Target="docProps/app.xml"/>"#
    )?;
    xml.push_str("</Relationships>");
    Ok(xml)
}

fn core_props_xml(presentation: &Presentation) -> Result<String> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECLARATION);
    xml.push_str(concat!(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));
    write!(xml, "<dc:title>{}</dc:title>", escape_text(presentation.title()))?;
    xml.push_str("<dc:creator>Deckforge</dc:creator>");
    write!(xml, r#"<dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created>"#)?;
    write!(xml, r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified>"#)?;
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

fn app_props_xml(presentation: &Presentation) -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
    );
    xml.push_str("<Application>Deckforge</Application>");
    write!(xml, "<Slides>{}</Slides>", presentation.slide_count())?;
    xml.push_str("</Properties>");
    Ok(xml)
}

/// Relationship IDs in `presentation.xml.rels`: master is rId1, slides rId2..,
/// theme comes last.
fn slide_rel_id(index: usize) -> String {
    format!("rId{}", index + 2)
}

fn theme_rel_id(presentation: &Presentation) -> String {
    format!("rId{}", presentation.slide_count() + 2)
}

fn presentation_xml(presentation: &Presentation) -> Result<String> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1">"#
    )?;
    xml.push_str(
        r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
    );
    if presentation.slide_count() > 0 {
        xml.push_str("<p:sldIdLst>");
        for index in 0..presentation.slide_count() {
            write!(
                xml,
                r#"<p:sldId id="{}" r:id="{}"/>"#,
                FIRST_SLIDE_ID + index,
                slide_rel_id(index)
            )?;
        }
        xml.push_str("</p:sldIdLst>");
    }
    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/>"#,
        presentation.slide_width(),
        presentation.slide_height()
    )?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    Ok(xml)
}

fn presentation_rels_xml(presentation: &Presentation) -> Result<String> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<Relationships xmlns="{NS_PKG_RELS}">"#)?;
    write!(
        xml,
        r#"<Relationship Id="rId1" Type="{REL_SLIDE_MASTER}" Target="slideMasters/slideMaster1.xml"/>"#
    )?;
    for index in 0..presentation.slide_count() {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{REL_SLIDE}" Target="slides/slide{}.xml"/>"#,
            slide_rel_id(index),
            index + 1
        )?;
    }
    write!(
        xml,
        r#"<Relationship Id="{}" Type="{REL_THEME}" Target="theme/theme1.xml"/>"#,
        theme_rel_id(presentation)
    )?;
    xml.push_str("</Relationships>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::{inches, Frame, Image, RgbColor};
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], path: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(path).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    /// Asserts the part is well-formed XML by reading it to the end.
    fn assert_well_formed(xml: &str) {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed XML: {e}\n{xml}"),
            }
        }
    }

    fn sample_presentation() -> Presentation {
        let mut pres = Presentation::new("Tides & Moons");
        let slide = pres.add_slide();
        slide.set_background(RgbColor(245, 247, 250));
        slide
            .add_picture(
                "Photo",
                Frame::new(inches(6.2), inches(1.2), inches(3.0), inches(2.2)),
                Image::new(vec![1, 2, 3], ImageFormat::Jpeg),
            )
            .unwrap();
        let slide = pres.add_slide();
        slide
            .add_picture(
                "Logo",
                Frame::new(inches(8.8), inches(6.6), inches(0.9), inches(0.9)),
                Image::new(vec![4, 5, 6], ImageFormat::Png),
            )
            .unwrap();
        pres
    }

    #[test]
    fn test_package_contains_all_parts() {
        let bytes = sample_presentation().to_bytes().unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();

        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "docProps/app.xml",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
            "ppt/media/image1.jpeg",
            "ppt/media/image2.png",
        ] {
            assert!(names.contains(&expected), "missing part {expected}");
        }
    }

    #[test]
    fn test_every_xml_part_is_well_formed() {
        let bytes = sample_presentation().to_bytes().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let name = file.name().to_string();
            if name.ends_with(".xml") || name.ends_with(".rels") {
                let mut content = String::new();
                file.read_to_string(&mut content).unwrap();
                assert_well_formed(&content);
            }
        }
    }

    #[test]
    fn test_content_types_declare_used_image_extensions() {
        let bytes = sample_presentation().to_bytes().unwrap();
        let types = read_part(&bytes, "[Content_Types].xml");
        assert!(types.contains(r#"Extension="jpeg" ContentType="image/jpeg""#));
        assert!(types.contains(r#"Extension="png" ContentType="image/png""#));
        assert!(types.contains("/ppt/slides/slide2.xml"));
    }

    #[test]
    fn test_media_numbering_is_global_across_slides() {
        let bytes = sample_presentation().to_bytes().unwrap();
        let rels = read_part(&bytes, "ppt/slides/_rels/slide2.xml.rels");
        assert!(rels.contains("../media/image2.png"));
        assert!(!rels.contains("image1"));
    }

    #[test]
    fn test_presentation_lists_slides_and_theme_last() {
        let bytes = sample_presentation().to_bytes().unwrap();
        let pres = read_part(&bytes, "ppt/presentation.xml");
        assert!(pres.contains(r#"<p:sldId id="256" r:id="rId2"/>"#));
        assert!(pres.contains(r#"<p:sldId id="257" r:id="rId3"/>"#));
        assert!(pres.contains(r#"<p:sldSz cx="9144000" cy="6858000"/>"#));

        let rels = read_part(&bytes, "ppt/_rels/presentation.xml.rels");
        assert!(rels.contains(&format!(r#"Id="rId4" Type="{REL_THEME}""#)));
    }

    #[test]
    fn test_core_props_escape_title() {
        let bytes = sample_presentation().to_bytes().unwrap();
        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>Tides &amp; Moons</dc:title>"));
        assert!(core.contains("dcterms:created"));
    }

    #[test]
    fn test_empty_presentation_still_packages() {
        let bytes = Presentation::new("Empty").to_bytes().unwrap();
        let pres = read_part(&bytes, "ppt/presentation.xml");
        assert!(!pres.contains("<p:sldIdLst>"));
        assert_well_formed(&pres);
    }
}
