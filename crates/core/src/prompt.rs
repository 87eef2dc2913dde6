use crate::fields::FIELD_NAMES;

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// System instruction for the extraction model.
pub const SYSTEM_PREAMBLE: &str = "\
You are a property deed expert attorney for the US with the following responsibilities:
1. Extract only explicitly stated information from property deeds
2. Mark missing information as \"Not specified in document\"
3. Maintain exact legal language for crucial elements
4. Flag any ambiguities or inconsistencies
5. Never infer or assume information not present in the document";

/// Everything the completion model needs for one extraction call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub model: String,
    pub preamble: String,
    pub prompt: String,
    pub temperature: f64,
}

impl ExtractionRequest {
    /// Build a request for the given OCR text at temperature 0.
    pub fn new(model: impl Into<String>, ocr_text: &str) -> Self {
        ExtractionRequest {
            model: model.into(),
            preamble: SYSTEM_PREAMBLE.to_string(),
            prompt: build_prompt(ocr_text),
            temperature: 0.0,
        }
    }
}

/// The empty JSON object the model is asked to fill in.
pub fn schema_skeleton() -> String {
    let body = FIELD_NAMES
        .iter()
        .map(|name| format!("  \"{}\": \"\"", name))
        .collect::<Vec<_>>()
        .join(",\n");

    format!("{{\n{}\n}}", body)
}

/// Build the user instruction embedding the flattened OCR text.
pub fn build_prompt(ocr_text: &str) -> String {
    let mut parts = Vec::new();

    parts.push(
        "Given the raw information extracted using OCR from a PDF, extract the most important \
         parts of the deed such as the owner's name, property parcel id, address, and any other \
         important factors."
            .to_string(),
    );
    parts.push(format!("OCR Result:\n{}", ocr_text));
    parts.push("Please provide the extracted information in JSON format.".to_string());
    parts.push(format!("Example JSON output:\n{}", schema_skeleton()));
    parts.push(
        "Respond with the filled JSON object only. Warning: Do not make up fake information."
            .to_string(),
    );

    parts.join("\n\n")
}
