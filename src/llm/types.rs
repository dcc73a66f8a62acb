use super::GenerationError;

/// Generate text from a prompt. One call, no streaming, no retries.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerationError>;

    /// Model identifier, for logs and health output.
    fn model(&self) -> &str;

    /// Whether the backend can serve `model()` right now. Backends without
    /// a cheap check report `true` and let `generate` fail instead.
    fn check_available(&self) -> Result<bool, GenerationError> {
        Ok(true)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(system, prompt)
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    fn check_available(&self) -> Result<bool, GenerationError> {
        (**self).check_available()
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(system, prompt)
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    fn check_available(&self) -> Result<bool, GenerationError> {
        (**self).check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_object_safe() {
        fn _assert_generator(_: &dyn TextGenerator) {}
    }

    #[test]
    fn arc_delegates_to_inner() {
        let inner = std::sync::Arc::new(crate::llm::MockGenerator::new("hello"));
        let shared: Box<dyn TextGenerator> = Box::new(inner.clone());
        assert_eq!(shared.generate("sys", "p").unwrap(), "hello");
        assert_eq!(shared.model(), "mock");
        assert_eq!(inner.call_count(), 1);
        assert!(shared.check_available().unwrap());
    }
}
