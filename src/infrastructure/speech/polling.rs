use crate::core::errors::LedgerError;
use crate::infrastructure::speech::{TranscriptStatus, Transcriber, TranscriptionBackend};
use async_trait::async_trait;
use log::{debug, info};
use std::time::Duration;

/// Drives a [`TranscriptionBackend`] to completion: upload, submit, then poll
/// once per `interval` for at most `max_attempts` rounds.
pub struct PollingTranscriber<B: TranscriptionBackend> {
    backend: B,
    max_attempts: u32,
    interval: Duration,
}

impl<B: TranscriptionBackend> PollingTranscriber<B> {
    pub fn new(backend: B, max_attempts: u32, interval: Duration) -> Self {
        PollingTranscriber {
            backend,
            max_attempts,
            interval,
        }
    }
}

#[async_trait]
impl<B: TranscriptionBackend> Transcriber for PollingTranscriber<B> {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, LedgerError> {
        if audio.is_empty() {
            return Err(LedgerError::TranscriptionFailed("no audio recorded".to_string()));
        }

        let audio_url = self.backend.upload(audio).await?;
        debug!("Audio uploaded to {}", audio_url);
        let job_id = self.backend.submit(&audio_url).await?;
        info!("Transcription job {} created, polling for results", job_id);

        for attempt in 0..self.max_attempts {
            tokio::time::sleep(self.interval).await;
            if attempt % 5 == 0 {
                debug!("Still processing transcription {} (attempt {})", job_id, attempt);
            }
            match self.backend.poll(&job_id).await? {
                TranscriptStatus::Completed(text) => {
                    info!("Transcription {} completed", job_id);
                    return Ok(text);
                }
                TranscriptStatus::Error(reason) => {
                    return Err(LedgerError::TranscriptionFailed(reason));
                }
                TranscriptStatus::Queued | TranscriptStatus::Processing => {}
            }
        }

        Err(LedgerError::TranscriptionTimedOut(self.max_attempts))
    }
}
