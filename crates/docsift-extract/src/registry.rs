//! Extractor registry for routing files to content extractors.

use docsift_core::{ContentExtractor, ExtractError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Registry of content extractors.
pub struct ExtractorRegistry {
    /// Named extractors, in registration order
    extractors: Vec<(String, Arc<dyn ContentExtractor>)>,
    /// MIME type to extractor index mapping
    mime_mapping: HashMap<String, usize>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
            mime_mapping: HashMap::new(),
        }
    }

    /// Register an extractor.
    pub fn register<E: ContentExtractor + 'static>(&mut self, name: &str, extractor: E) {
        let extractor: Arc<dyn ContentExtractor> = Arc::new(extractor);
        let index = self.extractors.len();
        for mime in extractor.supported_types() {
            self.mime_mapping.insert((*mime).to_string(), index);
        }
        self.extractors.push((name.to_string(), extractor));
    }

    /// Names of registered extractors.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.extractors.iter().map(|(name, _)| name.as_str())
    }

    /// Get an extractor for a MIME type.
    ///
    /// Exact matches win; otherwise the first extractor whose
    /// [`ContentExtractor::can_extract`] accepts the type is used.
    #[must_use]
    pub fn get_for_mime(&self, mime_type: &str) -> Option<Arc<dyn ContentExtractor>> {
        let mime_type = mime_type.trim().to_ascii_lowercase();

        if let Some(&index) = self.mime_mapping.get(&mime_type) {
            return Some(Arc::clone(&self.extractors[index].1));
        }

        self.extractors
            .iter()
            .find(|(_, extractor)| extractor.can_extract(&mime_type))
            .map(|(_, extractor)| Arc::clone(extractor))
    }

    /// Extract text from a file.
    pub async fn extract(&self, path: &Path, mime_type: &str) -> Result<String, ExtractError> {
        let extractor = self
            .get_for_mime(mime_type)
            .ok_or_else(|| ExtractError::UnsupportedType(mime_type.to_string()))?;

        debug!("Dispatching {:?} ({}) to extractor", path, mime_type);
        extractor.extract(path).await
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Extractor that returns its own name as the text.
    struct NamedExtractor {
        name: &'static str,
        types: &'static [&'static str],
        prefix: Option<&'static str>,
    }

    #[async_trait]
    impl ContentExtractor for NamedExtractor {
        fn supported_types(&self) -> &[&str] {
            self.types
        }

        fn can_extract(&self, mime_type: &str) -> bool {
            match self.prefix {
                Some(prefix) => mime_type.starts_with(prefix),
                None => self.types.contains(&mime_type),
            }
        }

        async fn extract(&self, _path: &Path) -> Result<String, ExtractError> {
            Ok(self.name.to_string())
        }
    }

    fn registry() -> ExtractorRegistry {
        let mut registry = ExtractorRegistry::new();
        registry.register(
            "pdf",
            NamedExtractor {
                name: "pdf",
                types: &["application/pdf"],
                prefix: None,
            },
        );
        registry.register(
            "image",
            NamedExtractor {
                name: "image",
                types: &["image/png", "image/jpeg"],
                prefix: Some("image/"),
            },
        );
        registry
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = ExtractorRegistry::new();
        assert_eq!(registry.names().count(), 0);
        assert!(registry.get_for_mime("application/pdf").is_none());
    }

    #[test]
    fn test_register_extractor() {
        let registry = registry();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["pdf", "image"]);
        assert!(registry.mime_mapping.contains_key("image/png"));
    }

    #[tokio::test]
    async fn test_exact_mime_dispatch() {
        let registry = registry();
        let path = Path::new("/test/file");

        assert_eq!(registry.extract(path, "application/pdf").await.unwrap(), "pdf");
        assert_eq!(registry.extract(path, "image/png").await.unwrap(), "image");
    }

    #[tokio::test]
    async fn test_prefix_dispatch_and_case() {
        let registry = registry();
        let path = Path::new("/test/file");

        assert_eq!(registry.extract(path, "image/jpg").await.unwrap(), "image");
        assert_eq!(registry.extract(path, "Application/PDF").await.unwrap(), "pdf");
    }

    #[tokio::test]
    async fn test_extract_unsupported_type() {
        let registry = registry();

        match registry
            .extract(Path::new("/test/archive.zip"), "application/zip")
            .await
            .unwrap_err()
        {
            ExtractError::UnsupportedType(mime) => assert_eq!(mime, "application/zip"),
            other => panic!("Expected UnsupportedType error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_implementation() {
        let registry = ExtractorRegistry::default();
        assert_eq!(registry.names().count(), 0);
    }
}
