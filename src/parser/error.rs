use super::locations::Span;

/// A parse diagnostic. The message is what `Parser::errors` reports; the span
/// points at the offending token.
#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub(super) Span, pub(super) String);

impl Error {
    pub fn new(span: Span, msg: &str) -> Self {
        Self(span, msg.to_string())
    }

    pub fn span(&self) -> Span {
        self.0
    }

    pub fn message(&self) -> &str {
        &self.1
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.1, self.0)
    }
}
