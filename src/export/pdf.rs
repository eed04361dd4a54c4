use std::io::BufWriter;

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use crate::models::{HistoryEntry, RiskLevel};
use crate::render::{render_sections, strip_inline};

use super::{join_list, ExportError};

// A4, millimetres.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM_MARGIN: f32 = 20.0;
const LEFT: f32 = 20.0;
const INDENT: f32 = 25.0;

/// Characters per line for 9pt Helvetica in the text column.
const WRAP_CHARS: usize = 90;

struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: Mm,
    pages: usize,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self, ExportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: Mm(TOP),
            pages: 1,
        })
    }

    /// Start a new page when fewer than `needed` mm remain.
    fn ensure_space(&mut self, needed: f32) {
        if self.y.0 - needed >= BOTTOM_MARGIN {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", self.pages + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = Mm(TOP);
        self.pages += 1;
    }

    fn line(&mut self, text: &str, size: f32, x: f32, bold: bool, advance: f32) {
        self.ensure_space(advance);
        let font = if bold { &self.bold } else { &self.font };
        self.layer.use_text(text, size, Mm(x), self.y, font);
        self.y -= Mm(advance);
    }

    fn heading(&mut self, text: &str) {
        self.gap(3.0);
        // keep a heading with at least one line under it
        self.ensure_space(12.0);
        self.line(text, 11.0, LEFT, true, 6.0);
    }

    fn paragraph(&mut self, text: &str, x: f32) {
        for line in wrap_text(&to_pdf_text(text), WRAP_CHARS) {
            self.line(&line, 9.0, x, false, 4.5);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= Mm(mm);
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ExportError::Pdf(format!("save error: {e}")))?;
        buf.into_inner().map_err(|e| ExportError::Io(e.into_error()))
    }
}

/// Strip markdown and swap characters the builtin fonts cannot draw.
fn to_pdf_text(text: &str) -> String {
    strip_inline(text)
        .chars()
        .map(|c| match c {
            '•' | '·' => '-',
            '–' | '—' => '-',
            '“' | '”' => '"',
            '‘' | '’' => '\'',
            '≥' => '>',
            '≤' => '<',
            c => c,
        })
        .collect()
}

/// Greedy word wrap on character count.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn risk_marker(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::High => "[HIGH]",
        RiskLevel::Moderate => "[MODERATE]",
        RiskLevel::Low => "[LOW]",
        RiskLevel::None => "[NONE]",
        RiskLevel::Unknown => "[?]",
    }
}

fn layout(entry: &HistoryEntry) -> Result<PdfWriter, ExportError> {
    let result = &entry.result;
    let profile = &entry.request.profile;
    let mut pdf = PdfWriter::new("RxCheck interaction report")?;

    pdf.line("RxCheck interaction report", 14.0, LEFT, true, 8.0);
    pdf.line(
        &format!("Date: {}", entry.created_at.format("%Y-%m-%d %H:%M UTC")),
        9.0,
        LEFT,
        false,
        4.5,
    );
    pdf.line(&format!("Patient: {}", to_pdf_text(&entry.patient_label)), 9.0, LEFT, false, 4.5);
    if let Some(age) = profile.age {
        pdf.line(&format!("Age: {age}"), 9.0, LEFT, false, 4.5);
    }
    pdf.line(
        &format!("Overall risk: {}", result.overall_risk.label()),
        11.0,
        LEFT,
        true,
        6.0,
    );

    let mut agents = profile.medications.clone();
    agents.extend(profile.supplements.iter().cloned());
    pdf.paragraph(&format!("Medications: {}", join_list(&agents)), LEFT);
    if !profile.allergies.is_empty() {
        pdf.paragraph(&format!("Allergies: {}", join_list(&profile.allergies)), LEFT);
    }
    if !profile.conditions.is_empty() {
        pdf.paragraph(&format!("Conditions: {}", join_list(&profile.conditions)), LEFT);
    }

    if !result.summary.trim().is_empty() {
        pdf.heading("Summary");
        pdf.paragraph(&result.summary, LEFT);
    }

    for section in render_sections(result).iter().filter(|s| !s.empty) {
        pdf.heading(&format!("{} ({})", section.title, section.count));
        for item in &section.items {
            pdf.paragraph(&format!("{} {}", risk_marker(item.risk), item.title), INDENT);
            if !item.description.is_empty() {
                pdf.paragraph(&item.description, INDENT);
            }
            if let Some(mechanism) = &item.mechanism {
                pdf.paragraph(&format!("Mechanism: {mechanism}"), INDENT);
            }
            if let Some(management) = &item.management {
                pdf.paragraph(&format!("Management: {management}"), INDENT);
            }
            pdf.gap(2.0);
        }
    }

    if !result.recommendations.is_empty() {
        pdf.heading("Recommendations");
        for rec in &result.recommendations {
            pdf.paragraph(&format!("- {rec}"), INDENT);
        }
    }

    if !result.disclaimer.is_empty() {
        pdf.gap(4.0);
        for line in wrap_text(&to_pdf_text(&result.disclaimer), 110) {
            pdf.line(&line, 7.0, LEFT, false, 3.5);
        }
    }
    Ok(pdf)
}

/// Printable A4 report for one saved analysis.
pub fn result_pdf(entry: &HistoryEntry) -> Result<Vec<u8>, ExportError> {
    let pdf = layout(entry)?;
    tracing::debug!(entry_id = %entry.id, pages = pdf.pages, "Result PDF written");
    pdf.finish()
}
