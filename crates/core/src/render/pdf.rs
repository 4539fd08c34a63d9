//! PDF label surface.
//!
//! Renders one PDF page per label at the fixed physical size 40 mm x 25 mm,
//! so the output can be sent straight to a label printer with no scaling.
//! Uses the builtin Helvetica fonts; builtin fonts have no glyph shaping, so
//! right-to-left instruction text is drawn in logical order.

use super::{LabelDocument, LabelSurface, RenderError};
use printpdf::*;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Renders labels into a PDF file, one page per label.
#[derive(Debug, Clone)]
pub struct PdfLabelSurface {
    output_path: PathBuf,
}

impl PdfLabelSurface {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

impl LabelSurface for PdfLabelSurface {
    fn render(&self, documents: &[LabelDocument]) -> Result<(), RenderError> {
        let bytes = render_label_pdf(documents)?;

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.output_path, bytes)?;

        Ok(())
    }
}

/// Render the documents into PDF bytes, one 40 x 25 mm page per label.
pub fn render_label_pdf(documents: &[LabelDocument]) -> Result<Vec<u8>, RenderError> {
    if documents.is_empty() {
        return Err(RenderError::SurfaceUnavailable(
            "no label documents to render".into(),
        ));
    }

    let (doc, page1, layer1) = PdfDocument::new("Medication Labels", Mm(40.0), Mm(25.0), "Label");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::SurfaceUnavailable(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::SurfaceUnavailable(format!("PDF font error: {e}")))?;

    let mut pages = vec![(page1, layer1)];
    for _ in 1..documents.len() {
        pages.push(doc.add_page(Mm(40.0), Mm(25.0), "Label"));
    }

    for (document, (page, layer_index)) in documents.iter().zip(pages) {
        let layer = doc.get_page(page).get_layer(layer_index);
        draw_label(&layer, document, &font, &bold);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| RenderError::SurfaceUnavailable(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| RenderError::SurfaceUnavailable(format!("PDF buffer error: {e}")))
}

fn draw_label(
    layer: &PdfLayerReference,
    document: &LabelDocument,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    // Header: patient id top right, mirroring the label stock layout.
    layer.use_text(
        format!("ID: {}", document.full_id),
        4.0,
        Mm(22.0),
        Mm(22.0),
        font,
    );

    layer.use_text(&document.patient_name, 5.0, Mm(2.0), Mm(18.5), bold);
    layer.use_text(&document.drug_name, 5.0, Mm(2.0), Mm(15.0), bold);

    let mut y = Mm(12.0);
    for line in wrap_text(&document.instruction_text, 30) {
        layer.use_text(&line, 5.0, Mm(2.0), y, font);
        y -= Mm(2.5);
    }

    layer.use_text(
        format!("Exp: {}", document.expiry_display),
        4.0,
        Mm(2.0),
        Mm(4.5),
        font,
    );
    layer.use_text(
        format!("By: {}", document.attribution),
        4.0,
        Mm(21.0),
        Mm(4.5),
        font,
    );
    layer.use_text(&document.printed_on, 4.0, Mm(14.0), Mm(1.5), font);
}

/// Greedy word wrap on character count; instruction text on a 40 mm label
/// rarely exceeds three lines.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TextDirection;
    use tempfile::TempDir;

    fn document(drug: &str) -> LabelDocument {
        LabelDocument {
            full_id: "100/2025".into(),
            patient_name: "Jane Doe".into(),
            drug_name: drug.into(),
            instruction_text: "1 tab TDS after food".into(),
            instruction_direction: TextDirection::RightToLeft,
            expiry_display: "03/2026".into(),
            attribution: "Dr Mahmoud".into(),
            printed_on: "06/08/2026".into(),
        }
    }

    #[test]
    fn renders_a_pdf_document() {
        let bytes = render_label_pdf(&[document("Panadol"), document("Zyrtec")]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_document_list_is_a_render_error() {
        assert!(matches!(
            render_label_pdf(&[]),
            Err(RenderError::SurfaceUnavailable(_))
        ));
    }

    #[test]
    fn surface_writes_the_file_and_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("labels").join("out.pdf");

        let surface = PdfLabelSurface::new(path.clone());
        surface.render(&[document("Panadol")]).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn wrap_text_respects_the_width_limit() {
        let lines = wrap_text("one two three four five six seven", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "one two three four five six seven");
    }

    #[test]
    fn wrap_text_of_empty_input_yields_one_blank_line() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }
}
