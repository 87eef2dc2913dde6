use crate::prelude::*;
use crate::prelude::{eprintln, println};
use crate::raster::{Pdftoppm, Rasterizer};
use deedscan_core::ocr::{flatten_text, parse_tsv, OcrDocument};
use image::RgbImage;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

/// Default input when no PDF path is given.
pub const DEFAULT_PDF_PATH: &str = "./2017091400824001&page-2.pdf";

/// PDF input and recognition settings shared by `run` and `ocr`.
#[derive(Debug, Clone, clap::Args)]
pub struct SourceOptions {
    /// Scanned deed PDF
    #[clap(env = "DEEDSCAN_PDF", default_value = DEFAULT_PDF_PATH)]
    pub pdf: PathBuf,

    /// Rasterization resolution in dots per inch
    #[arg(long, env = "DEEDSCAN_DPI", default_value = "200")]
    pub dpi: u32,

    /// Tesseract language(s), e.g. "eng" or "eng+spa"
    #[arg(long, env = "DEEDSCAN_LANG", default_value = "eng")]
    pub lang: String,
}

#[derive(Debug, clap::Args)]
pub struct OcrOptions {
    #[clap(flatten)]
    pub source: SourceOptions,

    /// Print the OCR document (pages, blocks, lines, words) as JSON
    #[arg(long)]
    pub json: bool,
}

/// Recognizes text on page images.
///
/// Implementations are created once and reused for every page; the returned
/// document has exactly one page per input image, in the same order.
pub trait OcrEngine {
    async fn recognize(&self, pages: &[RgbImage]) -> Result<OcrDocument>;
}

/// OCR engine backed by the `tesseract` CLI.
#[derive(Debug, Clone)]
pub struct Tesseract {
    binary: PathBuf,
    lang: String,
}

impl Tesseract {
    /// One-time initialization: locate the binary and check that every
    /// requested language has trained data installed.
    pub async fn init(lang: &str) -> Result<Self> {
        let binary =
            which::which("tesseract").map_err(|_| Error::ToolMissing { tool: "tesseract" })?;

        let output = tokio::process::Command::new(&binary)
            .arg("--list-langs")
            .output()
            .await
            .wrap_err("Failed to run tesseract --list-langs")?;

        if !output.status.success() {
            return Err(Error::ToolFailed {
                tool: "tesseract",
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let installed = parse_language_list(&String::from_utf8_lossy(&output.stdout));
        if let Some(missing) = lang.split('+').find(|l| !installed.iter().any(|i| i == l)) {
            return Err(eyre!(
                "Tesseract language '{}' is not installed (available: {})",
                missing,
                installed.join(", ")
            ));
        }

        debug!("Using tesseract at {} with lang {}", binary.display(), lang);
        Ok(Tesseract {
            binary,
            lang: lang.to_string(),
        })
    }

    async fn recognize_page(&self, image_path: &Path) -> Result<String> {
        let output = tokio::process::Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .arg("tsv")
            .output()
            .await
            .wrap_err("Failed to run tesseract")?;

        if !output.status.success() {
            return Err(Error::ToolFailed {
                tool: "tesseract",
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl OcrEngine for Tesseract {
    async fn recognize(&self, pages: &[RgbImage]) -> Result<OcrDocument> {
        let work_dir = tempfile::tempdir().wrap_err("Failed to create a temporary directory")?;
        let progress = ProgressBar::new(pages.len() as u64);
        let mut document = OcrDocument::default();

        for (index, image) in pages.iter().enumerate() {
            progress.set_message(f!("OCR page {}", index + 1));

            let path = work_dir.path().join(f!("page-{}.png", index + 1));
            image
                .save(&path)
                .wrap_err_with(|| f!("Failed to write page image {}", path.display()))?;

            let tsv = self.recognize_page(&path).await?;
            let page =
                parse_tsv(&tsv).wrap_err_with(|| f!("Unreadable OCR output for page {}", index + 1))?;

            debug!(
                "Page {}: {} blocks, {} words",
                index + 1,
                page.blocks.len(),
                page.words().count()
            );
            document.pages.push(page);
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(document)
    }
}

/// Languages from `tesseract --list-langs`; the first line is a header.
fn parse_language_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rasterize and OCR a PDF, then print the flattened text or the document.
pub async fn run(options: OcrOptions, global: crate::Global) -> Result<()> {
    let rasterizer = Pdftoppm::init(options.source.dpi)?;
    let engine = Tesseract::init(&options.source.lang).await?;

    let images = rasterizer.rasterize(&options.source.pdf).await?;
    let document = engine.recognize(&images).await?;

    if global.verbose {
        eprintln!(
            "Recognized {} page(s), {} line(s)",
            document.pages.len(),
            document.line_count()
        );
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        println!("{}", flatten_text(&document));
    }

    Ok(())
}
