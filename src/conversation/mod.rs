//! Conversation loop
//!
//! Drives the turn-by-turn interaction: speak the listening prompt, take
//! one utterance, hand it to the chat backend, speak the answer, then ask
//! whether to continue. A failed turn is logged, apologized for, and
//! retried; the loop only ends through the two exit phrases.

use crate::llm::{ChatBackend, ChatHistory};
use crate::speech::SpeechIo;
use crate::Result;
use std::io::{BufRead, Write};
use tracing::{error, info, warn};

/// Spoken before each listening window
pub const LISTENING_PROMPT: &str = "Please ask your query through the microphone.";

/// Spoken after each answer
pub const CONTINUE_PROMPT: &str = "Do you have any other query? Say Yes to continue.";

/// Spoken when the user declines to continue
pub const FAREWELL: &str = "Thank you for using Wellspoken. Have a nice day.";

/// Spoken when a turn fails
pub const APOLOGY: &str = "An error occurred. Let's try again.";

/// Recognized input that terminates the loop immediately
pub const EXIT_COMMAND: &str = "exit";

/// The only continuation answer that keeps the loop going.
///
/// Exact match, period included: the recognizer punctuates its output, so
/// a spoken "yes" arrives as "Yes.". Anything else terminates.
pub const CONTINUE_AFFIRMATIVE: &str = "Yes.";

/// Where the loop is within one turn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Speaking the listening prompt
    #[default]
    Greeting,
    /// Waiting for the user's question
    Listening,
    /// Question handed to the chat backend
    Dispatching,
    /// Speaking the answer
    Speaking,
    /// Waiting for the continuation answer
    AskContinue,
    /// Loop has ended
    Terminated,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Greeting => write!(f, "Greeting"),
            Phase::Listening => write!(f, "Listening"),
            Phase::Dispatching => write!(f, "Dispatching"),
            Phase::Speaking => write!(f, "Speaking"),
            Phase::AskContinue => write!(f, "AskContinue"),
            Phase::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Transition out of `Listening`: the literal exit command terminates,
/// everything else is dispatched
pub fn after_listening(input: &str) -> Phase {
    if input == EXIT_COMMAND {
        Phase::Terminated
    } else {
        Phase::Dispatching
    }
}

/// Transition out of `AskContinue`: only the exact affirmative continues
pub fn after_continue_answer(answer: &str) -> Phase {
    if answer == CONTINUE_AFFIRMATIVE {
        Phase::Listening
    } else {
        Phase::Terminated
    }
}

/// Voice-driven conversation loop
pub struct ConversationLoop<S: SpeechIo, C: ChatBackend> {
    speech: S,
    chat: C,
    history: ChatHistory,
    phase: Phase,
}

impl<S: SpeechIo, C: ChatBackend> ConversationLoop<S, C> {
    /// Create a loop over the given speech and chat implementations
    pub fn new(speech: S, chat: C) -> Self {
        Self {
            speech,
            chat,
            history: ChatHistory::new(),
            phase: Phase::Greeting,
        }
    }

    /// Current phase (for tests and diagnostics)
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The session's history so far
    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// The speech implementation (for tests and diagnostics)
    pub fn speech_ref(&self) -> &S {
        &self.speech
    }

    /// Run until the user exits.
    ///
    /// Errors inside a turn never propagate: they are logged, the apology
    /// is spoken, and the turn starts over. There is no retry limit.
    pub fn run(&mut self) -> Result<()> {
        info!("Conversation loop started");

        while self.phase != Phase::Terminated {
            if let Err(e) = self.take_turn() {
                if e.is_recoverable() {
                    warn!("Turn failed, retrying: {}", e);
                } else {
                    error!("Turn failed: {}", e);
                }
                if let Err(e) = self.speech.synthesize(APOLOGY) {
                    error!("Failed to speak the apology: {}", e);
                }
                self.phase = Phase::Greeting;
            }
        }

        info!("Conversation loop terminated");
        Ok(())
    }

    /// One full turn; any error aborts the turn and is handled by `run`
    fn take_turn(&mut self) -> Result<()> {
        self.phase = Phase::Greeting;
        self.speech.synthesize(LISTENING_PROMPT)?;

        self.phase = Phase::Listening;
        info!("Listening");
        let user_input = self.speech.recognize()?;
        info!("User > {}", user_input);

        self.phase = after_listening(&user_input);
        if self.phase == Phase::Terminated {
            return Ok(());
        }

        let response = self.chat.message(&user_input, &mut self.history)?;
        info!("Assistant > {}", response);

        self.phase = Phase::Speaking;
        self.speech.synthesize(&response)?;

        self.phase = Phase::AskContinue;
        self.speech.synthesize(CONTINUE_PROMPT)?;
        info!("Listening");
        let answer = self.speech.recognize()?;
        info!("User > {}", answer);

        self.phase = after_continue_answer(&answer);
        if self.phase == Phase::Terminated {
            self.speech.synthesize(FAREWELL)?;
        }

        Ok(())
    }
}

/// Text fallback used when the speech service cannot initialize.
///
/// Reads questions line by line; `exit` (case-insensitive here, unlike the
/// voice path) quits. A failed turn prints the error's user-facing message
/// and the prompt repeats.
pub fn run_text_mode<C: ChatBackend>(
    chat: &mut C,
    history: &mut ChatHistory,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<()> {
    let mut lines = input.lines();

    loop {
        write!(output, "Enter your question (or type 'exit' to quit): ")?;
        output.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case(EXIT_COMMAND) {
            break;
        }

        match chat.message(line, history) {
            Ok(response) => writeln!(output, "Assistant > {}", response)?,
            Err(e) => {
                error!("Error during text interaction: {}", e);
                writeln!(output, "{}", e.user_message())?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Result, WellspokenError};
    use std::collections::VecDeque;

    /// Speech fake that replays scripted utterances and records speech
    struct ScriptedSpeech {
        utterances: VecDeque<String>,
        spoken: Vec<String>,
    }

    impl ScriptedSpeech {
        fn new(utterances: &[&str]) -> Self {
            Self {
                utterances: utterances.iter().map(|s| s.to_string()).collect(),
                spoken: Vec::new(),
            }
        }
    }

    impl SpeechIo for ScriptedSpeech {
        fn recognize(&mut self) -> Result<String> {
            // Exhausted scripts exit so a buggy loop cannot spin forever
            Ok(self
                .utterances
                .pop_front()
                .unwrap_or_else(|| EXIT_COMMAND.to_string()))
        }

        fn synthesize(&mut self, text: &str) -> Result<()> {
            self.spoken.push(text.to_string());
            Ok(())
        }
    }

    /// Chat fake with canned responses; records what was dispatched
    struct ScriptedChat {
        responses: VecDeque<Result<String>>,
        dispatched: Vec<String>,
    }

    impl ScriptedChat {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: responses.into(),
                dispatched: Vec::new(),
            }
        }
    }

    impl ChatBackend for ScriptedChat {
        fn message(&mut self, user_input: &str, history: &mut ChatHistory) -> Result<String> {
            self.dispatched.push(user_input.to_string());
            let response = self
                .responses
                .pop_front()
                .unwrap_or_else(|| Ok("I don't know.".to_string()))?;
            history.add_user_message(user_input);
            history.add_assistant_message(&response);
            Ok(response)
        }
    }

    #[test]
    fn test_exit_at_first_prompt_terminates_without_ask_continue() {
        let speech = ScriptedSpeech::new(&["exit"]);
        let chat = ScriptedChat::new(vec![]);
        let mut conversation = ConversationLoop::new(speech, chat);

        conversation.run().unwrap();

        assert_eq!(conversation.phase(), Phase::Terminated);
        assert!(conversation.chat.dispatched.is_empty());
        // Only the listening prompt was spoken: no answer, no continuation
        // prompt, no farewell
        assert_eq!(conversation.speech.spoken, vec![LISTENING_PROMPT]);
    }

    #[test]
    fn test_affirmative_continuation_returns_to_listening() {
        let speech = ScriptedSpeech::new(&["how many wells are there?", "Yes.", "exit"]);
        let chat = ScriptedChat::new(vec![Ok("There are 1000 wells.".to_string())]);
        let mut conversation = ConversationLoop::new(speech, chat);

        conversation.run().unwrap();

        assert_eq!(conversation.chat.dispatched.len(), 1);
        let prompts = conversation
            .speech
            .spoken
            .iter()
            .filter(|s| s.as_str() == LISTENING_PROMPT)
            .count();
        assert_eq!(prompts, 2);
        assert!(!conversation.speech.spoken.contains(&FAREWELL.to_string()));
    }

    #[test]
    fn test_continuation_answer_is_case_sensitive() {
        // "yes." must terminate: only the exact "Yes." continues
        let speech = ScriptedSpeech::new(&["how many wells are there?", "yes."]);
        let chat = ScriptedChat::new(vec![Ok("There are 1000 wells.".to_string())]);
        let mut conversation = ConversationLoop::new(speech, chat);

        conversation.run().unwrap();

        assert_eq!(conversation.phase(), Phase::Terminated);
        assert_eq!(conversation.chat.dispatched.len(), 1);
        assert_eq!(
            conversation.speech.spoken.last().map(String::as_str),
            Some(FAREWELL)
        );
    }

    #[test]
    fn test_turn_error_speaks_apology_and_continues() {
        let speech = ScriptedSpeech::new(&["bad question", "exit"]);
        let chat = ScriptedChat::new(vec![Err(WellspokenError::InferenceError(
            "model fell over".to_string(),
        ))]);
        let mut conversation = ConversationLoop::new(speech, chat);

        conversation.run().unwrap();

        assert_eq!(conversation.phase(), Phase::Terminated);
        assert!(conversation
            .speech
            .spoken
            .contains(&APOLOGY.to_string()));
        // The failed turn was dispatched, then the loop recovered and took
        // the exit on the next turn
        assert_eq!(conversation.chat.dispatched, vec!["bad question"]);
    }

    #[test]
    fn test_after_listening_requires_exact_exit() {
        assert_eq!(after_listening("exit"), Phase::Terminated);
        assert_eq!(after_listening("Exit"), Phase::Dispatching);
        assert_eq!(after_listening("Exit."), Phase::Dispatching);
        assert_eq!(after_listening("quit"), Phase::Dispatching);
    }

    #[test]
    fn test_after_continue_answer_variants() {
        assert_eq!(after_continue_answer("Yes."), Phase::Listening);
        assert_eq!(after_continue_answer("yes."), Phase::Terminated);
        assert_eq!(after_continue_answer("Yes"), Phase::Terminated);
        assert_eq!(after_continue_answer("YES."), Phase::Terminated);
        assert_eq!(after_continue_answer("No."), Phase::Terminated);
    }

    #[test]
    fn test_history_accumulates_across_turns() {
        let speech = ScriptedSpeech::new(&["first question", "Yes.", "second question", "No."]);
        let chat = ScriptedChat::new(vec![
            Ok("first answer".to_string()),
            Ok("second answer".to_string()),
        ]);
        let mut conversation = ConversationLoop::new(speech, chat);

        conversation.run().unwrap();

        // Two user turns and two assistant turns, in order
        assert_eq!(conversation.history().len(), 4);
    }

    #[test]
    fn test_text_mode_dispatches_and_exits() {
        let mut chat = ScriptedChat::new(vec![Ok("42 wells.".to_string())]);
        let mut history = ChatHistory::new();
        let input = std::io::Cursor::new("how many wells in Kansas?\nexit\n");
        let mut output = Vec::new();

        run_text_mode(&mut chat, &mut history, input, &mut output).unwrap();

        assert_eq!(chat.dispatched, vec!["how many wells in Kansas?"]);
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Assistant > 42 wells."));
    }

    #[test]
    fn test_text_mode_prints_user_message_on_error() {
        let mut chat = ScriptedChat::new(vec![Err(WellspokenError::InferenceError(
            "model fell over".to_string(),
        ))]);
        let mut history = ChatHistory::new();
        let input = std::io::Cursor::new("how many wells?\nexit\n");
        let mut output = Vec::new();

        run_text_mode(&mut chat, &mut history, input, &mut output).unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Response generation failed"));
        // the failed turn did not end the loop; the exit line was read
        assert_eq!(chat.dispatched, vec!["how many wells?"]);
    }

    #[test]
    fn test_text_mode_exit_is_case_insensitive() {
        let mut chat = ScriptedChat::new(vec![]);
        let mut history = ChatHistory::new();
        let input = std::io::Cursor::new("EXIT\n");
        let mut output = Vec::new();

        run_text_mode(&mut chat, &mut history, input, &mut output).unwrap();

        assert!(chat.dispatched.is_empty());
    }
}
