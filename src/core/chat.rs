use crate::core::advisor::{Advisor, fallback_question};
use crate::core::models::chat::{ChatMessage, ChatRole};
use crate::infrastructure::speech::{SpeechSynthesizer, Transcriber};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const WELCOME_MESSAGE: &str = "Hi there! I'm your financial advisor. I can provide general financial advice and tips. How can I assist you today?";

pub const MICROPHONE_DENIED_MESSAGE: &str = "I need permission to access your microphone. Please click the microphone icon in your browser address bar and allow access.";

/// One conversation with an advisor. Speech input and output are optional.
pub struct ChatSession {
    history: RwLock<Vec<ChatMessage>>,
    advisor: Arc<dyn Advisor>,
    transcriber: Option<Arc<dyn Transcriber>>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    voice_output: RwLock<bool>,
}

impl ChatSession {
    pub fn new(advisor: Arc<dyn Advisor>) -> Self {
        ChatSession {
            history: RwLock::new(vec![ChatMessage::new(ChatRole::Assistant, WELCOME_MESSAGE)]),
            advisor,
            transcriber: None,
            synthesizer: None,
            voice_output: RwLock::new(false),
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>, voice_output: bool) -> Self {
        self.synthesizer = Some(synthesizer);
        self.voice_output = RwLock::new(voice_output);
        self
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.read().await.clone()
    }

    pub async fn voice_output(&self) -> bool {
        *self.voice_output.read().await
    }

    /// Turning voice output off also stops whatever is being spoken.
    pub async fn set_voice_output(&self, enabled: bool) {
        *self.voice_output.write().await = enabled;
        if !enabled {
            if let Some(synthesizer) = &self.synthesizer {
                synthesizer.cancel();
            }
        }
    }

    /// Returns the assistant reply, or `None` when the text is blank.
    pub async fn send_text(&self, text: &str) -> Option<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(self.exchange(text.to_string(), text).await)
    }

    /// Transcribes the recording and answers it. A failed transcription is
    /// replaced by one of the stock questions, so this always yields a reply.
    pub async fn send_voice(&self, audio: &[u8]) -> ChatMessage {
        let transcript = match &self.transcriber {
            Some(transcriber) => match transcriber.transcribe(audio).await {
                Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
                Ok(_) => {
                    warn!("Empty transcript received, using a fallback question");
                    fallback_question(&mut rand::rng()).to_string()
                }
                Err(e) => {
                    warn!("Transcription failed, using a fallback question: {}", e);
                    fallback_question(&mut rand::rng()).to_string()
                }
            },
            None => {
                debug!("No transcriber configured, using a fallback question");
                fallback_question(&mut rand::rng()).to_string()
            }
        };
        info!("Voice message transcribed ({} characters)", transcript.len());
        self.exchange(format!("\"{}\"", transcript), &transcript).await
    }

    /// Records that the microphone could not be opened.
    pub async fn microphone_denied(&self) -> ChatMessage {
        let message = ChatMessage::new(ChatRole::Assistant, MICROPHONE_DENIED_MESSAGE);
        self.history.write().await.push(message.clone());
        message
    }

    pub async fn clear(&self) {
        if let Some(synthesizer) = &self.synthesizer {
            synthesizer.cancel();
        }
        let mut history = self.history.write().await;
        history.clear();
        history.push(ChatMessage::new(ChatRole::Assistant, WELCOME_MESSAGE));
    }

    async fn exchange(&self, shown: String, prompt: &str) -> ChatMessage {
        let reply = ChatMessage::new(ChatRole::Assistant, self.advisor.advise(prompt));
        {
            let mut history = self.history.write().await;
            history.push(ChatMessage::new(ChatRole::User, shown));
            history.push(reply.clone());
        }
        if self.voice_output().await {
            if let Some(synthesizer) = &self.synthesizer {
                synthesizer.speak(&reply.content);
            }
        }
        reply
    }
}
