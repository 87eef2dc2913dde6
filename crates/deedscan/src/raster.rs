use crate::prelude::*;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Turns a PDF into one RGB image per page, in page order.
pub trait Rasterizer {
    async fn rasterize(&self, pdf: &Path) -> Result<Vec<RgbImage>>;
}

/// Rasterizer backed by poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct Pdftoppm {
    binary: PathBuf,
    dpi: u32,
}

impl Pdftoppm {
    /// Locate `pdftoppm` on `PATH`.
    pub fn init(dpi: u32) -> Result<Self> {
        let binary = which::which("pdftoppm").map_err(|_| Error::ToolMissing { tool: "pdftoppm" })?;
        debug!("Using pdftoppm at {}", binary.display());
        Ok(Pdftoppm { binary, dpi })
    }
}

impl Rasterizer for Pdftoppm {
    async fn rasterize(&self, pdf: &Path) -> Result<Vec<RgbImage>> {
        let expected = count_pages(pdf).await?;
        info!("Rasterizing {} page(s) of {} at {} dpi", expected, pdf.display(), self.dpi);

        let work_dir = tempfile::tempdir().wrap_err("Failed to create a temporary directory")?;
        let prefix = work_dir.path().join("page");

        let output = tokio::process::Command::new(&self.binary)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(&prefix)
            .output()
            .await
            .wrap_err("Failed to run pdftoppm")?;

        if !output.status.success() {
            return Err(Error::ToolFailed {
                tool: "pdftoppm",
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let paths = rendered_pages(work_dir.path())?;
        if paths.len() != expected {
            return Err(Error::PageCountMismatch {
                expected,
                found: paths.len(),
            }
            .into());
        }

        paths
            .iter()
            .map(|path| {
                image::open(path)
                    .map(|img| img.to_rgb8())
                    .wrap_err_with(|| f!("Failed to load rendered page {}", path.display()))
            })
            .collect()
    }
}

/// Count pages with lopdf. Fails for a missing or unreadable file.
pub async fn count_pages(pdf: &Path) -> Result<usize> {
    if !pdf.is_file() {
        return Err(Error::PdfNotFound(pdf.to_path_buf()).into());
    }

    let path = pdf.to_path_buf();
    let pages = tokio::task::spawn_blocking(move || {
        lopdf::Document::load(&path)
            .map(|doc| doc.get_pages().len())
            .map_err(|e| Error::PdfUnreadable {
                path,
                reason: e.to_string(),
            })
    })
    .await??;

    Ok(pages)
}

/// Rendered page files (`page-1.png`, `page-01.png`, ...) sorted by page
/// number.
fn rendered_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(number) = page_number(&path) {
            pages.push((number, path));
        }
    }

    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<usize> {
    let name = path.file_name()?.to_str()?;
    name.strip_prefix("page-")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}
