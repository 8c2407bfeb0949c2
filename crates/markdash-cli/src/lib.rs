use std::path::Path;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Content type for a local file based on its extension. Marksheets are
/// PDFs; anything else is opaque and will be rejected by the validator.
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn pdf_extension_maps_to_pdf() {
        assert_eq!(content_type_for(&PathBuf::from("a.pdf")), "application/pdf");
        assert_eq!(content_type_for(&PathBuf::from("A.PDF")), "application/pdf");
        assert_eq!(
            content_type_for(&PathBuf::from("/tmp/marks/sem1.pdf")),
            "application/pdf"
        );
    }

    #[test]
    fn other_extensions_are_opaque() {
        assert_eq!(
            content_type_for(&PathBuf::from("a.png")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(&PathBuf::from("noext")),
            "application/octet-stream"
        );
    }
}
