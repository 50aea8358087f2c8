pub mod in_memory;
pub mod polling;

use crate::core::errors::LedgerError;
use async_trait::async_trait;

/// Speech to text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, LedgerError>;
}

/// Text to speech. Fire and forget: a new utterance replaces whatever was
/// still being spoken.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str);
    fn cancel(&self);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranscriptStatus {
    Queued,
    Processing,
    Completed(String),
    Error(String),
}

/// Upload / submit / poll protocol of a hosted transcription service.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Returns the URL the service stored the audio under.
    async fn upload(&self, audio: &[u8]) -> Result<String, LedgerError>;
    /// Returns the transcription job id.
    async fn submit(&self, audio_url: &str) -> Result<String, LedgerError>;
    async fn poll(&self, job_id: &str) -> Result<TranscriptStatus, LedgerError>;
}
