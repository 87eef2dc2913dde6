use crate::llm::{CompletionModel, OpenAi};
use crate::ocr::{OcrEngine, SourceOptions, Tesseract};
use crate::prelude::*;
use crate::prelude::{eprintln, println};
use crate::raster::{Pdftoppm, Rasterizer};
use crate::render::{annotate_page, load_font, render_summary};
use ab_glyph::FontVec;
use colored::Colorize;
use deedscan_core::ocr::{flatten_text, OcrDocument};
use deedscan_core::prompt::DEFAULT_MODEL;
use deedscan_core::summary::layout_summary;
use deedscan_core::{parse_response, plan_page_overlays, DeedFields, Extraction, ExtractionRequest};
use image::RgbImage;
use std::path::{Path, PathBuf};

pub const JSON_FILE_NAME: &str = "extracted_info.json";
pub const SUMMARY_FILE_NAME: &str = "summary.png";

#[derive(Debug, clap::Args)]
pub struct RunOptions {
    #[clap(flatten)]
    pub source: SourceOptions,

    /// Directory for extracted_info.json, annotated pages and summary.png
    #[arg(short, long, env = "DEEDSCAN_OUTPUT_DIR", default_value = "deed_visualizations")]
    pub output_dir: PathBuf,

    /// Completion model used for field extraction
    #[arg(long, env = "DEEDSCAN_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of an OpenAI-compatible completion service
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    /// TTF font for labels (defaults to a common system font)
    #[arg(long, env = "DEEDSCAN_FONT")]
    pub font: Option<PathBuf>,
}

/// Files written by a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub json_path: PathBuf,
    pub page_paths: Vec<PathBuf>,
    pub summary_path: PathBuf,
    pub overlay_count: usize,
    pub present_fields: usize,
}

pub fn annotated_page_name(page_number: usize) -> String {
    f!("annotated_page_{}.png", page_number)
}

pub async fn run(options: RunOptions, global: crate::Global) -> Result<()> {
    let rasterizer = Pdftoppm::init(options.source.dpi)?;
    let engine = Tesseract::init(&options.source.lang).await?;
    let model = OpenAi::new(&options.api_key, options.base_url.as_deref())?;
    let font = load_font(options.font.as_deref());

    if global.verbose {
        eprintln!("PDF: {}", options.source.pdf.display());
        eprintln!("Model: {}", options.model);
        eprintln!("Output directory: {}", options.output_dir.display());
    }

    let report = extract_deed(
        &rasterizer,
        &engine,
        &model,
        &options.source.pdf,
        &options.model,
        &options.output_dir,
        font.as_ref(),
    )
    .await?;

    println!(
        "{} {} field(s) with values, {} highlight(s)",
        "✓".green(),
        report.present_fields,
        report.overlay_count
    );
    println!("  {}", report.json_path.display());
    for path in &report.page_paths {
        println!("  {}", path.display());
    }
    println!("  {}", report.summary_path.display());

    Ok(())
}

/// Run the whole pipeline for one PDF.
///
/// Stages run strictly in sequence. Any failure aborts the run; nothing is
/// written to `output_dir` unless the model response parsed.
pub async fn extract_deed<R, O, C>(
    rasterizer: &R,
    engine: &O,
    model: &C,
    pdf: &Path,
    model_name: &str,
    output_dir: &Path,
    font: Option<&FontVec>,
) -> Result<RunReport>
where
    R: Rasterizer,
    O: OcrEngine,
    C: CompletionModel,
{
    let images = rasterizer.rasterize(pdf).await?;
    info!("Rasterized {} page(s)", images.len());

    let document = engine.recognize(&images).await?;
    ensure_page_images(&document, &images)?;
    let text = flatten_text(&document);
    info!(
        "OCR produced {} line(s), {} chars",
        document.line_count(),
        text.len()
    );

    let request = ExtractionRequest::new(model_name, &text);
    debug!("Prompt length: {} chars", request.prompt.len());
    let raw = model.complete(&request).await?;

    let extraction = parse_response(&raw).map_err(|e| {
        warn!("Model response could not be repaired into JSON");
        Error::Format(e)
    })?;

    let json_path = write_extraction(&extraction, output_dir)?;
    let (page_paths, overlay_count) =
        write_annotations(&document, images, &extraction.fields, output_dir, font)?;
    let summary_path = write_summary(&extraction.fields, output_dir, font)?;

    Ok(RunReport {
        json_path,
        page_paths,
        summary_path,
        overlay_count,
        present_fields: extraction.fields.present().len(),
    })
}

/// Write the canonical JSON, creating the output directory first.
pub fn write_extraction(extraction: &Extraction, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .wrap_err_with(|| f!("Failed to create {}", output_dir.display()))?;

    let path = output_dir.join(JSON_FILE_NAME);
    std::fs::write(&path, &extraction.canonical)
        .wrap_err_with(|| f!("Failed to write {}", path.display()))?;
    info!("Saved extracted information to {}", path.display());

    Ok(path)
}

/// Highlight matched words on every page and save `annotated_page_<n>.png`.
///
/// Every OCR page must have a rasterized image at the same index.
pub fn write_annotations(
    document: &OcrDocument,
    mut images: Vec<RgbImage>,
    fields: &DeedFields,
    output_dir: &Path,
    font: Option<&FontVec>,
) -> Result<(Vec<PathBuf>, usize)> {
    ensure_page_images(document, &images)?;

    let mut paths = Vec::with_capacity(document.pages.len());
    let mut total = 0;

    for (index, page) in document.pages.iter().enumerate() {
        let image = images
            .get_mut(index)
            .ok_or(Error::MissingPageImage(index + 1))?;
        let (width, height) = image.dimensions();

        let overlays = plan_page_overlays(page, fields, width, height);
        annotate_page(image, &overlays, font);
        total += overlays.len();

        let path = output_dir.join(annotated_page_name(index + 1));
        image
            .save(&path)
            .wrap_err_with(|| f!("Failed to write {}", path.display()))?;
        info!(
            "Saved annotated page {} ({} highlights) to {}",
            index + 1,
            overlays.len(),
            path.display()
        );
        paths.push(path);
    }

    Ok((paths, total))
}

/// Every OCR page needs the rasterized image it was recognized from.
fn ensure_page_images(document: &OcrDocument, images: &[RgbImage]) -> Result<()> {
    if document.pages.len() > images.len() {
        return Err(Error::MissingPageImage(images.len() + 1).into());
    }
    Ok(())
}

pub fn write_summary(
    fields: &DeedFields,
    output_dir: &Path,
    font: Option<&FontVec>,
) -> Result<PathBuf> {
    let image = render_summary(&layout_summary(fields), font);
    let path = output_dir.join(SUMMARY_FILE_NAME);
    image
        .save(&path)
        .wrap_err_with(|| f!("Failed to write {}", path.display()))?;
    info!("Saved summary visualization to {}", path.display());

    Ok(path)
}
