//! Conversation transcript as ordered rounds of paired turns.
//!
//! DESIGN
//! ======
//! The backend hands history over as two parallel arrays (human turns and
//! assistant turns, paired by index). Instead of keeping both arrays and
//! zipping them on every read, the transcript stores explicit `Round`s: one
//! human turn plus an optional reply. A round without a reply is either the
//! exchange currently in flight (`pending`) or an unanswered turn rehydrated
//! from history.
//!
//! Sequence numbers are assigned at insertion and never reused within a
//! transcript, so `turns()` is already in display order.

#[cfg(test)]
#[path = "transcript_test.rs"]
mod transcript_test;

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use super::StateError;

pub type RoundId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    Human,
    Assistant,
}

/// A single utterance in the conversation.
#[derive(Clone, Debug, PartialEq)]
pub struct Turn {
    pub round: RoundId,
    pub speaker: Speaker,
    pub text: String,
    /// Position in the transcript's total order.
    pub sequence: u64,
    /// Wall-clock milliseconds at creation. Rehydrated history gets "now".
    pub timestamp: f64,
    /// Set on the substitute turn appended when an exchange fails.
    pub is_error: bool,
}

/// One human turn and, once it arrives, its paired assistant reply.
#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    pub id: RoundId,
    pub human: Turn,
    pub reply: Option<Turn>,
}

impl Round {
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.reply.is_some()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Transcript {
    rounds: Vec<Round>,
    next_round: RoundId,
    next_sequence: u64,
    pending: Option<RoundId>,
}

impl Transcript {
    /// Pair index-aligned human/assistant arrays into rounds.
    ///
    /// Assistant entries beyond the number of human entries have nothing to
    /// pair with and are dropped.
    #[must_use]
    pub fn from_parallel(human: &[String], assistant: &[String]) -> Self {
        let mut transcript = Self::default();
        transcript.reseed(human, assistant);
        transcript
    }

    /// Replace every round with index-aligned history, like
    /// [`Transcript::from_parallel`], dropping any pending round.
    ///
    /// Round ids keep counting from where this transcript left off, so a
    /// result for a round from before the reseed never matches a new one.
    pub fn reseed(&mut self, human: &[String], assistant: &[String]) {
        if assistant.len() > human.len() {
            warn!(
                human = human.len(),
                assistant = assistant.len(),
                "transcript: dropping assistant turns without a paired human turn"
            );
        }
        self.clear();
        for (index, text) in human.iter().enumerate() {
            let id = self.open_round(text);
            if let Some(reply) = assistant.get(index) {
                self.attach_reply(id, reply, false);
            }
        }
    }

    /// Drop every round and the pending mark. Round ids are not reused.
    pub fn clear(&mut self) {
        self.rounds.clear();
        self.pending = None;
    }

    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// All turns in display order: each human turn followed by its reply.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.rounds
            .iter()
            .flat_map(|round| std::iter::once(&round.human).chain(round.reply.as_ref()))
    }

    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.rounds.len() + self.rounds.iter().filter(|r| r.is_answered()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// The round awaiting a reply from an exchange in flight, if any.
    #[must_use]
    pub fn pending(&self) -> Option<RoundId> {
        self.pending
    }

    #[must_use]
    pub fn human_turns(&self) -> Vec<String> {
        self.rounds.iter().map(|r| r.human.text.clone()).collect()
    }

    #[must_use]
    pub fn assistant_turns(&self) -> Vec<String> {
        self.rounds
            .iter()
            .filter_map(|r| r.reply.as_ref().map(|t| t.text.clone()))
            .collect()
    }

    /// Replace every human turn, re-pairing with the current replies by index.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ExchangeInFlight`] while a round is pending; the
    /// transcript is left unchanged.
    pub fn replace_human_turns(&mut self, human: &[String]) -> Result<(), StateError> {
        self.ensure_idle()?;
        let assistant = self.assistant_turns();
        self.reseed(human, &assistant);
        Ok(())
    }

    /// Replace every assistant turn, re-pairing with the current human turns by index.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ExchangeInFlight`] while a round is pending; the
    /// transcript is left unchanged.
    pub fn replace_assistant_turns(&mut self, assistant: &[String]) -> Result<(), StateError> {
        self.ensure_idle()?;
        let human = self.human_turns();
        self.reseed(&human, assistant);
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), StateError> {
        match self.pending {
            Some(round) => Err(StateError::ExchangeInFlight(round)),
            None => Ok(()),
        }
    }

    /// Append a human turn and mark its round as awaiting a reply.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ExchangeInFlight`] if another round is still
    /// pending; the transcript is left unchanged.
    pub fn begin_round(&mut self, text: &str) -> Result<RoundId, StateError> {
        self.ensure_idle()?;
        let id = self.open_round(text);
        self.pending = Some(id);
        Ok(id)
    }

    /// Attach the reply for the pending round `id` and clear the pending mark.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::RoundNotPending`] if `id` is not the pending round.
    pub fn complete_round(&mut self, id: RoundId, text: &str, is_error: bool) -> Result<&Turn, StateError> {
        if self.pending != Some(id) {
            return Err(StateError::RoundNotPending(id));
        }
        self.pending = None;
        self.attach_reply(id, text, is_error)
            .ok_or(StateError::RoundNotPending(id))
    }

    /// Drop the pending round `id` entirely, as if it had never been sent.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::RoundNotPending`] if `id` is not the pending round.
    pub fn cancel_round(&mut self, id: RoundId) -> Result<Round, StateError> {
        if self.pending != Some(id) {
            return Err(StateError::RoundNotPending(id));
        }
        self.pending = None;
        let index = self
            .rounds
            .iter()
            .rposition(|r| r.id == id)
            .ok_or(StateError::RoundNotPending(id))?;
        Ok(self.rounds.remove(index))
    }

    fn open_round(&mut self, text: &str) -> RoundId {
        let id = self.next_round;
        self.next_round += 1;
        let human = self.make_turn(id, Speaker::Human, text, false);
        self.rounds.push(Round { id, human, reply: None });
        id
    }

    fn attach_reply(&mut self, id: RoundId, text: &str, is_error: bool) -> Option<&Turn> {
        let turn = self.make_turn(id, Speaker::Assistant, text, is_error);
        let round = self.rounds.iter_mut().rev().find(|r| r.id == id)?;
        round.reply = Some(turn);
        round.reply.as_ref()
    }

    fn make_turn(&mut self, round: RoundId, speaker: Speaker, text: &str, is_error: bool) -> Turn {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Turn { round, speaker, text: text.to_owned(), sequence, timestamp: now_millis(), is_error }
    }
}

/// Derive the display transcript from index-paired human/assistant arrays.
///
/// For each human turn `i`, emits the human turn and then, if present,
/// `assistant[i]`. A trailing human turn without a reply is kept as is.
#[must_use]
pub fn merge(human: &[String], assistant: &[String]) -> Vec<Turn> {
    Transcript::from_parallel(human, assistant)
        .turns()
        .cloned()
        .collect()
}

fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}
