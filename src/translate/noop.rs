use async_trait::async_trait;

use super::{TranslationError, Translator};

/// Identity translator used when translation is disabled.
pub struct NullTranslator;

#[async_trait]
impl Translator for NullTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> std::result::Result<String, TranslationError> {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_translator_is_identity() {
        let translated =
            tokio_test::block_on(NullTranslator.translate("こんにちは", "ja", "ja")).unwrap();
        assert_eq!(translated, "こんにちは");
    }
}
