//! Read-only projections of the game for connected clients
//!
//! The display screen and the admin console render from two different
//! snapshots. Both are rebuilt from scratch from the [`Game`] after every
//! command; nothing here keeps state between calls.

use serde::Serialize;

use crate::{
    catalog::{Catalog, Question},
    game::{FaceOffAttempts, Game, Phase, RoundOutcome, Team},
};

/// An answer that is visible on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealedAnswer {
    /// Position of the answer on the board, 0 being the top answer
    pub index: usize,
    /// Answer text
    pub text: String,
    /// Points the answer is worth
    pub value: u64,
}

impl RevealedAnswer {
    /// Looks up a board answer of `question`
    ///
    /// Returns `None` if `index` is not on the board.
    pub fn of(question: &Question, index: usize) -> Option<Self> {
        question.answer(index).map(|answer| Self {
            index,
            text: answer.text.clone(),
            value: answer.value,
        })
    }
}

/// What the audience may know about the current question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    /// The question as read out
    pub prompt: String,
    /// Number of slots on the board
    pub total_answer_count: usize,
}

/// Snapshot sent to display clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSnapshot {
    /// Current phase in dotted form
    pub phase: Phase,
    /// Both teams with their scores
    pub teams: [Team; 2],
    /// The question being played
    pub current_question: Option<QuestionSummary>,
    /// Visible answers in reveal order
    pub revealed_answers: Vec<RevealedAnswer>,
    /// Points at stake this round
    pub round_pot: u64,
    /// Strikes against the controlling team
    pub strikes: u8,
    /// The team that owns the board
    pub controlling_team_index: Option<usize>,
    /// The winning team once the game is over
    pub winner: Option<usize>,
    /// How the last round was won, while it is being reviewed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_outcome: Option<RoundOutcome>,
}

/// Snapshot sent to admin clients
///
/// Serializes as the public snapshot's fields plus the admin-only ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSnapshot {
    /// Everything the display sees
    #[serde(flatten)]
    pub public: PublicSnapshot,
    /// Every question that can be selected
    pub questions: Vec<Question>,
    /// The questions of this game, in play order
    pub selected_questions: Vec<Question>,
    /// Index of the question being played
    pub current_question_index: usize,
    /// The question being played, answers included
    pub current_question_full: Option<Question>,
    /// Score at which the game ends
    pub max_score: u64,
    /// Face-off answers of this round
    pub face_off_attempts: Option<FaceOffAttempts>,
    /// The face-off winner choosing between play and pass
    pub play_or_pass_team_index: Option<usize>,
}

/// Builds the snapshot shown on the display screen
pub fn public_snapshot(game: &Game) -> PublicSnapshot {
    let data = game.data();
    let question = data.current_question();

    PublicSnapshot {
        phase: game.phase(),
        teams: data.teams.clone(),
        current_question: question.map(|q| QuestionSummary {
            prompt: q.prompt.clone(),
            total_answer_count: q.answer_count(),
        }),
        revealed_answers: question
            .map(|q| {
                data.revealed_answers
                    .iter()
                    .filter_map(|index| RevealedAnswer::of(q, *index))
                    .collect()
            })
            .unwrap_or_default(),
        round_pot: data.round_pot,
        strikes: data.strikes,
        controlling_team_index: data.controlling_team_index,
        winner: data.winner,
        round_outcome: game.phase().round_outcome(),
    }
}

/// Builds the snapshot shown on the admin console
pub fn admin_snapshot(game: &Game, catalog: &Catalog) -> AdminSnapshot {
    let data = game.data();

    AdminSnapshot {
        public: public_snapshot(game),
        questions: catalog.questions().to_vec(),
        selected_questions: data.selected_questions.clone(),
        current_question_index: data.current_question_index,
        current_question_full: data.current_question().cloned(),
        max_score: data.max_score,
        face_off_attempts: data.face_off_attempts,
        play_or_pass_team_index: data.play_or_pass_team_index,
    }
}
