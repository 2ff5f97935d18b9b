//! PDF project sheet.
//!
//! Builds an A4 portrait sheet with printpdf: header, category line,
//! hero image, description, facts, partners, and the gallery. Images are
//! embedded from their stored bytes; an unreadable image is skipped, never
//! fatal.

use std::io::Cursor;

use printpdf::image_crate::codecs::gif::GifDecoder;
use printpdf::image_crate::codecs::jpeg::JpegDecoder;
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::image_crate::codecs::webp::WebPDecoder;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rgb,
};

use atelier_core::error::CoreError;
use atelier_core::slug::filename_token;
use atelier_db::models::category::CategoryRef;
use atelier_db::models::project::Project;

use crate::print::years_label;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const IMAGE_DPI: f32 = 150.0;

/// Points to millimeters.
const PT_TO_MM: f32 = 0.3528;

/// One image to embed: raw stored bytes plus the extension that names its
/// codec.
pub struct SheetImage {
    pub bytes: Vec<u8>,
    pub ext: String,
}

/// Download filename for a project sheet: `Projet-{title-token}.pdf`.
pub fn pdf_filename(title: &str) -> String {
    let token = filename_token(title);
    if token.is_empty() {
        "Projet.pdf".to_string()
    } else {
        format!("Projet-{token}.pdf")
    }
}

/// Render the full sheet to PDF bytes.
pub fn render_project_sheet(
    project: &Project,
    categories: &[CategoryRef],
    images: &[SheetImage],
) -> Result<Vec<u8>, CoreError> {
    let (doc, page, layer) = PdfDocument::new(
        &project.title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| CoreError::Internal(format!("Failed to load PDF font: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| CoreError::Internal(format!("Failed to load PDF font: {e}")))?;

    let layer = doc.get_page(page).get_layer(layer);
    let mut writer = SheetWriter {
        doc,
        layer,
        regular,
        bold,
        y: MARGIN_MM,
    };

    // --- Header ---
    writer.set_color(ACCENT);
    writer.text_line("ATELIER D'ARCHITECTURE", 11.0, true);
    writer.set_color(INK);
    writer.paragraph(&project.title.to_uppercase(), 22.0, true);

    let mut meta = Vec::new();
    if let Some(location) = project.location.as_deref().filter(|l| !l.trim().is_empty()) {
        meta.push(location.trim().to_string());
    }
    if let Some(years) = years_label(
        project.year.as_deref(),
        project.start_year.as_deref(),
        project.end_year.as_deref(),
    ) {
        meta.push(years);
    }
    if !meta.is_empty() {
        writer.text_line(&meta.join(" - "), 11.0, false);
    }

    if !categories.is_empty() {
        writer.set_color(ACCENT);
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        writer.text_line(&names.join("  /  ").to_uppercase(), 9.0, true);
        writer.set_color(INK);
    }
    writer.spacer(4.0);

    // --- Hero image ---
    let mut images = images.iter();
    if let Some(hero) = images.next() {
        writer.image(hero, 120.0);
        writer.spacer(4.0);
    }

    // --- Description ---
    let paragraphs: Vec<&str> = project
        .description
        .split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if !paragraphs.is_empty() {
        writer.section_title("Description");
        for paragraph in paragraphs {
            writer.paragraph(paragraph, 10.0, false);
            writer.spacer(2.0);
        }
    }

    // --- Facts ---
    let facts: Vec<(&str, String)> = [
        ("Statut", project.achievement_status.clone()),
        ("Surface", project.surface_area.clone()),
        ("Client", project.client_name.clone()),
        ("Client délégué", project.delegated_client_name.clone()),
        ("Coût du projet", project.project_cost.clone()),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        let value = value?.trim().to_string();
        (!value.is_empty()).then_some((label, value))
    })
    .chain(
        project
            .duration_months
            .map(|months| ("Durée", format!("{months} mois"))),
    )
    .collect();
    if !facts.is_empty() {
        writer.section_title("Informations");
        for (label, value) in facts {
            writer.text_line(&format!("{label} : {value}"), 10.0, false);
        }
        writer.spacer(2.0);
    }

    // --- Partners & sponsors ---
    writer.name_list("Partenaires", project.partners.0.iter().map(String::as_str));
    writer.name_list(
        "Partenaires institutionnels",
        project
            .institutional_partners
            .0
            .iter()
            .map(|p| p.name.as_str()),
    );
    writer.name_list("Sponsors", project.sponsors.0.iter().map(String::as_str));

    // --- Gallery ---
    let gallery: Vec<&SheetImage> = images.collect();
    if !gallery.is_empty() {
        writer.section_title("Galerie");
        for image in gallery {
            writer.image(image, 80.0);
            writer.spacer(3.0);
        }
    }

    writer
        .doc
        .save_to_bytes()
        .map_err(|e| CoreError::Internal(format!("Failed to serialize PDF: {e}")))
}

// ---------------------------------------------------------------------------
// Layout engine
// ---------------------------------------------------------------------------

const INK: (f32, f32, f32) = (0.17, 0.24, 0.31);
const ACCENT: (f32, f32, f32) = (0.64, 0.52, 0.36);

/// Top-down cursor over a growing set of A4 pages.
struct SheetWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Distance consumed from the top of the current page, in mm.
    y: f32,
}

impl SheetWriter {
    fn set_color(&self, (r, g, b): (f32, f32, f32)) {
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = MARGIN_MM;
    }

    fn ensure_space(&mut self, needed_mm: f32) {
        if self.y + needed_mm > PAGE_HEIGHT_MM - MARGIN_MM {
            self.new_page();
        }
    }

    fn spacer(&mut self, mm: f32) {
        self.y += mm;
    }

    fn text_line(&mut self, text: &str, size_pt: f32, bold: bool) {
        let line_height = size_pt * PT_TO_MM * 1.4;
        self.ensure_space(line_height);

        let font = if bold { &self.bold } else { &self.regular };
        let baseline = PAGE_HEIGHT_MM - self.y - size_pt * PT_TO_MM;
        self.layer
            .use_text(text, size_pt, Mm(MARGIN_MM), Mm(baseline), font);
        self.y += line_height;
    }

    fn paragraph(&mut self, text: &str, size_pt: f32, bold: bool) {
        for line in wrap_text(text, chars_per_line(size_pt)) {
            self.text_line(&line, size_pt, bold);
        }
    }

    fn section_title(&mut self, title: &str) {
        self.spacer(2.0);
        self.set_color(ACCENT);
        self.text_line(&title.to_uppercase(), 11.0, true);
        self.set_color(INK);
    }

    fn name_list<'a>(&mut self, title: &str, names: impl Iterator<Item = &'a str>) {
        let names: Vec<&str> = names.filter(|n| !n.trim().is_empty()).collect();
        if names.is_empty() {
            return;
        }
        self.section_title(title);
        for name in names {
            self.text_line(&format!("- {name}"), 10.0, false);
        }
        self.spacer(2.0);
    }

    /// Embed one image, scaled to fit the content width and `max_height_mm`,
    /// centered horizontally. Unreadable bytes are skipped.
    fn image(&mut self, image: &SheetImage, max_height_mm: f32) {
        let Some(decoded) = decode_image(&image.bytes, &image.ext) else {
            return;
        };

        let native_w_mm = decoded.image.width.0 as f32 / IMAGE_DPI * 25.4;
        let native_h_mm = decoded.image.height.0 as f32 / IMAGE_DPI * 25.4;
        if native_w_mm <= 0.0 || native_h_mm <= 0.0 {
            return;
        }

        let scale = (CONTENT_WIDTH_MM / native_w_mm).min(max_height_mm / native_h_mm);
        let display_w = native_w_mm * scale;
        let display_h = native_h_mm * scale;

        self.ensure_space(display_h);

        let x = MARGIN_MM + (CONTENT_WIDTH_MM - display_w) / 2.0;
        let bottom = PAGE_HEIGHT_MM - self.y - display_h;

        decoded.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(bottom)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        self.y += display_h;
    }
}

fn decode_image(bytes: &[u8], ext: &str) -> Option<Image> {
    let cursor = Cursor::new(bytes);
    match ext {
        "jpg" | "jpeg" => Image::try_from(JpegDecoder::new(cursor).ok()?).ok(),
        "png" => Image::try_from(PngDecoder::new(cursor).ok()?).ok(),
        "gif" => Image::try_from(GifDecoder::new(cursor).ok()?).ok(),
        "webp" => Image::try_from(WebPDecoder::new(cursor).ok()?).ok(),
        _ => None,
    }
}

/// Approximate line capacity for Helvetica at `size_pt` across the content
/// width (average glyph width taken as half an em).
fn chars_per_line(size_pt: f32) -> usize {
    let width_pt = CONTENT_WIDTH_MM / PT_TO_MM;
    ((width_pt / (size_pt * 0.5)) as usize).max(16)
}

/// Greedy word wrap. Words longer than `max_chars` get a line of their own.
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
    lines
}
