use crate::core::errors::LedgerError;
use crate::infrastructure::speech::{SpeechSynthesizer, TranscriptStatus, TranscriptionBackend};
use async_trait::async_trait;
use log::debug;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Keeps the utterance currently "playing". Speaking again replaces it.
#[derive(Clone, Default)]
pub struct InMemorySynthesizer {
    current: Arc<Mutex<Option<String>>>,
    spoken: Arc<Mutex<Vec<String>>>,
}

impl InMemorySynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.current.lock().ok().and_then(|c| c.clone())
    }

    /// Every utterance ever started, oldest first.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl SpeechSynthesizer for InMemorySynthesizer {
    fn speak(&self, text: &str) {
        self.cancel();
        if let Ok(mut current) = self.current.lock() {
            *current = Some(text.to_string());
        }
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(text.to_string());
        }
        debug!("Speaking {} characters", text.len());
    }

    fn cancel(&self) {
        if let Ok(mut current) = self.current.lock() {
            current.take();
        }
    }
}

/// Backend used when no transcription service is configured. Every upload
/// fails, so callers fall back to their default behavior.
#[derive(Clone, Copy, Default)]
pub struct OfflineTranscriptionBackend;

#[async_trait]
impl TranscriptionBackend for OfflineTranscriptionBackend {
    async fn upload(&self, _audio: &[u8]) -> Result<String, LedgerError> {
        Err(LedgerError::TranscriptionFailed(
            "no transcription service configured".to_string(),
        ))
    }

    async fn submit(&self, _audio_url: &str) -> Result<String, LedgerError> {
        Err(LedgerError::TranscriptionFailed(
            "no transcription service configured".to_string(),
        ))
    }

    async fn poll(&self, job_id: &str) -> Result<TranscriptStatus, LedgerError> {
        Err(LedgerError::TranscriptionFailed(format!("unknown job {}", job_id)))
    }
}

/// Replays a fixed sequence of poll results. Once the script runs out the job
/// stays in `Processing`.
#[derive(Clone, Default)]
pub struct ScriptedTranscriptionBackend {
    script: Arc<Mutex<VecDeque<TranscriptStatus>>>,
    polls: Arc<Mutex<u32>>,
}

impl ScriptedTranscriptionBackend {
    pub fn new(script: impl IntoIterator<Item = TranscriptStatus>) -> Self {
        ScriptedTranscriptionBackend {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            polls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn polls(&self) -> u32 {
        self.polls.lock().map(|p| *p).unwrap_or_default()
    }
}

#[async_trait]
impl TranscriptionBackend for ScriptedTranscriptionBackend {
    async fn upload(&self, audio: &[u8]) -> Result<String, LedgerError> {
        Ok(format!("memory://upload/{}", audio.len()))
    }

    async fn submit(&self, _audio_url: &str) -> Result<String, LedgerError> {
        Ok("scripted-job".to_string())
    }

    async fn poll(&self, _job_id: &str) -> Result<TranscriptStatus, LedgerError> {
        if let Ok(mut polls) = self.polls.lock() {
            *polls += 1;
        }
        let next = self
            .script
            .lock()
            .map_err(|_| LedgerError::UnexpectedError("script lock poisoned".to_string()))?
            .pop_front();
        Ok(next.unwrap_or(TranscriptStatus::Processing))
    }
}
