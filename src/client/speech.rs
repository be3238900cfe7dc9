use thiserror::Error;
use tracing::{debug, warn};

pub const RECOGNITION_LANG: &str = "en-US";
pub const SPEECH_RATE: f32 = 0.5;

const STEP_PREFIX: &str = "Step : ";
const STEP_SEPARATOR: &str = ". ";
const SEPARATOR_LEN: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech recognition is not supported on this device")]
    Unsupported,
    #[error("Speech recognition failed: {0}")]
    Failed(String),
}

pub trait SpeechRecognizer {
    fn start(&mut self, lang: &str) -> Result<(), SpeechError>;
    fn stop(&mut self);
}

/// Events delivered by a recognizer after `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Transcripts of the first result, best alternative first.
    Result(Vec<String>),
    Error(String),
    End,
}

/// Dictation into the ingredient text field.
pub struct VoiceInput<R: SpeechRecognizer> {
    recognizer: R,
    listening: bool,
    ingredients: String,
}

impl<R: SpeechRecognizer> VoiceInput<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            listening: false,
            ingredients: String::new(),
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn ingredients(&self) -> &str {
        &self.ingredients
    }

    pub fn set_ingredients(&mut self, text: impl Into<String>) {
        self.ingredients = text.into();
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn start_listening(&mut self) -> Result<(), SpeechError> {
        if self.listening {
            return Ok(());
        }
        self.recognizer.start(RECOGNITION_LANG)?;
        self.listening = true;
        Ok(())
    }

    pub fn stop_listening(&mut self) {
        if self.listening {
            self.recognizer.stop();
            self.listening = false;
        }
    }

    pub fn handle(&mut self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Result(transcripts) => {
                if let Some(text) = transcripts.into_iter().next() {
                    self.ingredients = text;
                }
            }
            RecognitionEvent::Error(reason) => warn!(reason = %reason, "speech recognition error"),
            RecognitionEvent::End => {}
        }
        self.listening = false;
    }
}

pub trait SpeechSynthesizer {
    fn speak(&mut self, text: &str, rate: f32);
    fn cancel(&mut self);
    fn is_speaking(&self) -> bool;
}

/// Location inside the step list, counted in characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub step: usize,
    pub char: usize,
}

/// Reads recipe instructions aloud and remembers where it stopped.
///
/// The synthesizer reports word boundaries as character offsets into the
/// current utterance. Those are mapped back to a [`Position`] so that a later
/// [`ReadAloud::speak`] resumes mid-step.
pub struct ReadAloud<S: SpeechSynthesizer> {
    synthesizer: S,
    steps: Vec<String>,
    position: Position,
    utterance_start: Position,
    speaking: bool,
}

impl<S: SpeechSynthesizer> ReadAloud<S> {
    pub fn new(synthesizer: S, instructions: &str) -> Self {
        let steps = instructions
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!("{}{}", STEP_PREFIX, line))
            .collect();

        Self {
            synthesizer,
            steps,
            position: Position::default(),
            utterance_start: Position::default(),
            speaking: false,
        }
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    fn remaining_text(&self) -> String {
        let Position { step, char } = self.position;
        let Some(current) = self.steps.get(step) else {
            return String::new();
        };

        let head: String = current.chars().skip(char).collect();
        std::iter::once(head)
            .chain(self.steps[step + 1..].iter().cloned())
            .collect::<Vec<_>>()
            .join(STEP_SEPARATOR)
    }

    pub fn speak(&mut self) {
        if self.synthesizer.is_speaking() {
            self.synthesizer.cancel();
        }

        let text = self.remaining_text();
        if text.is_empty() {
            self.speaking = false;
            return;
        }

        debug!(step = self.position.step, char = self.position.char, "reading instructions aloud");
        self.utterance_start = self.position;
        self.synthesizer.speak(&text, SPEECH_RATE);
        self.speaking = true;
    }

    pub fn on_boundary(&mut self, char_index: usize) {
        let origin = self.utterance_start;
        let mut offset = 0;

        for (i, step) in self.steps.iter().enumerate().skip(origin.step) {
            let skipped = if i == origin.step { origin.char } else { 0 };
            let step_len = step.chars().count().saturating_sub(skipped);

            if char_index < offset + step_len {
                self.position = Position {
                    step: i,
                    char: char_index.saturating_sub(offset) + skipped,
                };
                return;
            }
            offset += step_len + SEPARATOR_LEN;
        }

        self.position = Position {
            step: self.steps.len().saturating_sub(1),
            char: 0,
        };
    }

    pub fn stop(&mut self) {
        self.synthesizer.cancel();
        self.speaking = false;
    }

    pub fn restart(&mut self) {
        self.position = Position::default();
        self.speak();
    }

    pub fn on_end(&mut self) {
        self.speaking = false;
    }
}
