use crate::prelude::*;
use crate::prelude::{eprintln, println};
use deedscan_core::parse_response;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
pub struct RepairOptions {
    /// File holding a raw model response (reads stdin when omitted)
    pub input: Option<PathBuf>,
}

/// Repair a saved model response and print its canonical JSON.
pub async fn run(options: RepairOptions, global: crate::Global) -> Result<()> {
    let raw = match &options.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| f!("Failed to read '{}'", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .wrap_err("Failed to read stdin")?;
            buffer
        }
    };

    let extraction = parse_response(&raw).map_err(Error::Format)?;

    if global.verbose {
        eprintln!(
            "{} keys, {} with values",
            extraction.document.len(),
            extraction.fields.present().len()
        );
    }

    println!("{}", extraction.canonical);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> crate::Global {
        crate::Global { verbose: false }
    }

    #[tokio::test]
    async fn test_repairs_fenced_response_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.txt");
        std::fs::write(&path, "```json\n{\"owner_name\": \"Jane Doe\"}\n```").unwrap();

        let options = RepairOptions { input: Some(path) };
        assert!(run(options, quiet()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unrepairable_response_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.txt");
        std::fs::write(&path, "I could not find any fields.").unwrap();

        let err = run(RepairOptions { input: Some(path) }, quiet())
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Format(_))));
    }

    #[tokio::test]
    async fn test_missing_input_file() {
        let options = RepairOptions {
            input: Some(PathBuf::from("/definitely/not/here.txt")),
        };
        assert!(run(options, quiet()).await.is_err());
    }
}
