//! Spoken stop phrase detection.

use std::collections::VecDeque;

pub const DEFAULT_STOP_PHRASE: &str = "end";
pub const DEFAULT_STOP_REPEAT: usize = 3;

/// Fires once the last `repeat` utterances all equal the stop phrase,
/// compared trimmed and case-insensitively.
#[derive(Debug, Clone)]
pub struct StopPhraseDetector {
    phrase: String,
    repeat: usize,
    recent: VecDeque<String>,
}

impl Default for StopPhraseDetector {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_PHRASE, DEFAULT_STOP_REPEAT)
    }
}

impl StopPhraseDetector {
    pub fn new(phrase: &str, repeat: usize) -> Self {
        let repeat = repeat.max(1);
        Self {
            phrase: normalize(phrase),
            repeat,
            recent: VecDeque::with_capacity(repeat),
        }
    }

    /// Record an utterance. Returns `true` when it completes the stop trigger.
    pub fn observe(&mut self, utterance: &str) -> bool {
        if self.recent.len() == self.repeat {
            self.recent.pop_front();
        }
        self.recent.push_back(normalize(utterance));
        self.is_triggered()
    }

    pub fn is_triggered(&self) -> bool {
        self.recent.len() == self.repeat && self.recent.iter().all(|u| *u == self.phrase)
    }

    pub fn reset(&mut self) {
        self.recent.clear();
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_in_a_row_triggers() {
        let mut detector = StopPhraseDetector::default();
        assert!(!detector.observe("end"));
        assert!(!detector.observe(" End"));
        assert!(detector.observe("END "));
    }

    #[test]
    fn test_interruption_restarts_count() {
        let mut detector = StopPhraseDetector::default();
        detector.observe("end");
        detector.observe("end");
        assert!(!detector.observe("the"));
        assert!(!detector.observe("end"));
        assert!(!detector.observe("end"));
        assert!(detector.observe("end"));
    }

    #[test]
    fn test_phrase_must_match_whole_utterance() {
        let mut detector = StopPhraseDetector::default();
        for _ in 0..3 {
            assert!(!detector.observe("the end"));
        }
    }

    #[test]
    fn test_custom_phrase_and_repeat() {
        let mut detector = StopPhraseDetector::new("Stop Dictation", 1);
        assert_eq!(detector.phrase(), "stop dictation");
        assert!(detector.observe("stop dictation"));
        detector.reset();
        assert!(!detector.is_triggered());
    }
}
