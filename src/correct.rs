//! Typo-correction collaborator seam
//!
//! Correction itself is a black box supplied by the host (often backed by
//! a spell-check service). The engine calls it once at the head of the
//! pipeline; a failing corrector is skipped with a warning and the raw
//! text is used instead, so `process_text` never aborts on its account.

/// External typo-correction service: `text -> corrected text`.
pub trait TypoCorrector: Send {
    fn correct(&self, text: &str) -> anyhow::Result<String>;
}

/// Pass-through corrector used when no service is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCorrector;

impl TypoCorrector for NoopCorrector {
    fn correct(&self, text: &str) -> anyhow::Result<String> {
        Ok(text.to_string())
    }
}
