use crate::Generator;
use burrow_core::ShortCode;
use sha2::{Digest, Sha256};
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct HashGeneratorSettings {
    /// Number of leading base58 characters kept from the encoded digest.
    #[builder(default = 8)]
    pub length: usize,
}

impl Default for HashGeneratorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Content-addressed generator: SHA-256 of the URL, base58 encoded, truncated.
///
/// The same URL always yields the same code, so shortening a URL twice
/// collides with the first registration.
#[derive(Debug, Clone, Default)]
pub struct HashGenerator {
    settings: HashGeneratorSettings,
}

impl HashGenerator {
    pub fn new(settings: HashGeneratorSettings) -> Self {
        // a 32 byte digest never encodes to fewer than 32 base58 characters
        let length = settings.length.clamp(3, 32);
        Self {
            settings: HashGeneratorSettings { length },
        }
    }

    pub fn length(&self) -> usize {
        self.settings.length
    }
}

impl Generator for HashGenerator {
    fn generate(&self, original_url: &str) -> ShortCode {
        let digest = Sha256::digest(original_url.as_bytes());
        let mut encoded = bs58::encode(digest).into_string();
        encoded.truncate(self.settings.length);
        ShortCode::new_unchecked(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_url_same_code() {
        let generator = HashGenerator::default();
        let first = generator.generate("https://example.com/some/long/path");
        let second = generator.generate("https://example.com/some/long/path");
        assert_eq!(first, second);
    }

    #[test]
    fn different_urls_differ() {
        let generator = HashGenerator::default();
        assert_ne!(
            generator.generate("https://example.com/a"),
            generator.generate("https://example.com/b")
        );
    }

    #[test]
    fn codes_are_eight_base58_characters() {
        let generator = HashGenerator::default();
        for i in 0..100 {
            let code = generator.generate(&format!("https://example.com/{i}"));
            assert_eq!(code.as_str().len(), 8);
            assert!(code
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() && !"0OIl".contains(c)));
            // generated codes pass the same validation as user supplied ones
            assert!(ShortCode::new(code.as_str()).is_ok());
        }
    }

    #[test]
    fn prefix_of_the_full_encoding() {
        let url = "https://example.com";
        let full = bs58::encode(Sha256::digest(url.as_bytes())).into_string();
        let code = HashGenerator::default().generate(url);
        assert!(full.starts_with(code.as_str()));
    }

    #[test]
    fn length_is_configurable_within_bounds() {
        let generator = HashGenerator::new(HashGeneratorSettings::builder().length(12).build());
        assert_eq!(generator.generate("https://example.com").as_str().len(), 12);

        let generator = HashGenerator::new(HashGeneratorSettings::builder().length(1).build());
        assert_eq!(generator.length(), 3);

        let generator = HashGenerator::new(HashGeneratorSettings::builder().length(64).build());
        assert_eq!(generator.generate("https://example.com").as_str().len(), 32);
    }
}
