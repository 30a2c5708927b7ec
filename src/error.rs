use thiserror::Error;

/// Errors raised while turning the odds board into betting lines.
///
/// The granularity matters: `Structural` means the whole document is not
/// what we expect, while `Extraction` and `TimeParse` are scoped to one
/// game or bet row and let the parser skip just that game.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("document structure violated: {0}")]
    Structural(String),

    #[error("failed to extract {what} ({context})")]
    Extraction { what: String, context: String },

    #[error("unrecognized event time token: {0:?}")]
    TimeParse(String),
}

impl ScrapeError {
    pub fn extraction(what: impl Into<String>, context: impl Into<String>) -> Self {
        ScrapeError::Extraction {
            what: what.into(),
            context: context.into(),
        }
    }
}
