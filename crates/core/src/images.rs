use thiserror::Error;
use url::Url;

/// Thumbnail endpoint used when no template is configured.
pub const DEFAULT_IMAGE_URL_TEMPLATE: &str = "https://lh3.googleusercontent.com/d/{id}=w2000";

const ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ImageResolverError {
    #[error("image url template is missing the {{id}} placeholder")]
    MissingPlaceholder,

    #[error("image url template does not produce an absolute http(s) url: {0}")]
    InvalidTemplate(String),
}

/// Turns opaque image references into fetchable URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    template: String,
}

impl ImageResolver {
    /// Build a resolver from a template containing `{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ImageResolverError` if the placeholder is missing or the
    /// template does not yield an absolute http(s) URL.
    pub fn new(template: impl Into<String>) -> Result<Self, ImageResolverError> {
        let template = template.into();
        if !template.contains(ID_PLACEHOLDER) {
            return Err(ImageResolverError::MissingPlaceholder);
        }
        let sample = template.replace(ID_PLACEHOLDER, "sample");
        let parsed =
            Url::parse(&sample).map_err(|e| ImageResolverError::InvalidTemplate(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ImageResolverError::InvalidTemplate(format!(
                "unsupported scheme {}",
                parsed.scheme()
            )));
        }
        Ok(Self { template })
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Resolves a reference; empty or unusable references mean "no image".
    #[must_use]
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        Url::parse(&self.template.replace(ID_PLACEHOLDER, reference))
            .ok()
            .map(String::from)
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self {
            template: DEFAULT_IMAGE_URL_TEMPLATE.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_resolver_builds_thumbnail_urls() {
        let resolver = ImageResolver::default();
        assert_eq!(
            resolver.resolve("1AbC").as_deref(),
            Some("https://lh3.googleusercontent.com/d/1AbC=w2000")
        );
    }

    #[test]
    fn empty_reference_has_no_image() {
        assert_eq!(ImageResolver::default().resolve(""), None);
        assert_eq!(ImageResolver::default().resolve("   "), None);
    }

    #[test]
    fn template_must_contain_placeholder() {
        assert_eq!(
            ImageResolver::new("https://cdn.example.com/img"),
            Err(ImageResolverError::MissingPlaceholder)
        );
    }

    #[test]
    fn template_must_be_http() {
        assert!(matches!(
            ImageResolver::new("ftp://cdn.example.com/{id}"),
            Err(ImageResolverError::InvalidTemplate(_))
        ));
        assert!(matches!(
            ImageResolver::new("/relative/{id}.png"),
            Err(ImageResolverError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn custom_template_is_used() {
        let resolver = ImageResolver::new("https://cdn.example.com/pairs/{id}.png").unwrap();
        assert_eq!(
            resolver.resolve("gt_01").as_deref(),
            Some("https://cdn.example.com/pairs/gt_01.png")
        );
    }
}
