//! Core game state machine
//!
//! This module contains the authoritative model of one game: the phase it
//! is in, the data each round works on, and the transitions that move the
//! game from setup through face-offs, guessing, steals and scoring to a
//! winner. Every mutation of [`GameData`] happens inside [`Game::send`].

use std::fmt::{self, Display};

use serde::Serialize;
use serde_with::SerializeDisplay;
use tracing::{debug, warn};

use crate::{
    catalog::Question,
    constants::game::{DEFAULT_MAX_SCORE, MAX_STRIKES},
};

/// Sub-phases of the face-off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceOffStep {
    /// Waiting for one of the teams to buzz in
    AwaitingBuzz,
    /// The team that buzzed in has answered and the admin is judging it
    Evaluating,
    /// The other team gets its chance after a non-top first answer
    OpponentEvaluating,
    /// Both answers are in; control goes to the higher one
    CompareFaceOff,
    /// Control has been assigned
    Resolved,
}

/// Sub-phases of the controlling team's guessing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessStep {
    /// Waiting for the controlling team's next guess
    AwaitingGuess,
    /// The guess matched the answer at this index
    Correct(usize),
    /// The guess matched nothing on the board
    Incorrect,
}

/// Sub-phases of the steal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StealStep {
    /// Waiting for the opposing team's single steal guess
    AwaitingSteal,
    /// The steal guess has been judged; `None` means it missed
    StealResolved(Option<usize>),
}

/// How a round's pot was won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundOutcome {
    /// The controlling team cleared the board
    ControllingWins,
    /// The opposing team stole the pot
    StealSuccess,
    /// The steal missed, so the controlling team keeps the pot
    StealFailed,
}

impl RoundOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::ControllingWins => "controllingWins",
            Self::StealSuccess => "stealSuccess",
            Self::StealFailed => "stealFailed",
        }
    }
}

/// Represents the current phase of the game
///
/// Compound phases carry their sub-phase. Phases displaying a dotted name
/// such as `faceOff.evaluating` are the ones clients see; the transient
/// sub-phases (`compareFaceOff`, `resolved`, `correct`, `incorrect`,
/// `stealResolved`) are passed through inside a single [`Game::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, SerializeDisplay)]
pub enum Phase {
    /// No game has been set up
    #[default]
    Idle,
    /// Teams and questions are set, waiting for the first round
    GameStart,
    /// A round is about to start
    RoundStart,
    /// The face-off deciding who controls the board
    FaceOff(FaceOffStep),
    /// The face-off winner decides whether to play or pass
    PlayOrPass,
    /// The controlling team is guessing
    ActiveRound(GuessStep),
    /// The opposing team may steal after three strikes
    StealPhase(StealStep),
    /// The pot has been awarded; the admin reviews the board
    AwardPoints(RoundOutcome),
    /// The game has a winner
    GameOver,
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::GameStart => f.write_str("gameStart"),
            Self::RoundStart => f.write_str("roundStart"),
            Self::FaceOff(step) => write!(
                f,
                "faceOff.{}",
                match step {
                    FaceOffStep::AwaitingBuzz => "awaitingBuzz",
                    FaceOffStep::Evaluating => "evaluating",
                    FaceOffStep::OpponentEvaluating => "opponentEvaluating",
                    FaceOffStep::CompareFaceOff => "compareFaceOff",
                    FaceOffStep::Resolved => "resolved",
                }
            ),
            Self::PlayOrPass => f.write_str("playOrPass"),
            Self::ActiveRound(step) => write!(
                f,
                "activeRound.{}",
                match step {
                    GuessStep::AwaitingGuess => "awaitingGuess",
                    GuessStep::Correct(_) => "correct",
                    GuessStep::Incorrect => "incorrect",
                }
            ),
            Self::StealPhase(step) => write!(
                f,
                "stealPhase.{}",
                match step {
                    StealStep::AwaitingSteal => "awaitingSteal",
                    StealStep::StealResolved(_) => "stealResolved",
                }
            ),
            Self::AwardPoints(outcome) => write!(f, "awardPoints.{}", outcome.as_str()),
            Self::GameOver => f.write_str("gameOver"),
        }
    }
}

impl Phase {
    /// The round outcome under review, if the pot has just been awarded
    pub fn round_outcome(self) -> Option<RoundOutcome> {
        match self {
            Self::AwardPoints(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// One of the two teams
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Team {
    /// Display name
    pub name: String,
    /// Points won so far; only ever increases
    pub score: u64,
}

impl Team {
    fn named(name: String) -> Self {
        Self { name, score: 0 }
    }
}

/// A team's answer during the face-off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceOffAttempt {
    /// The team that answered
    pub team_index: usize,
    /// The matched answer, `None` for a miss or a pending judgement
    pub answer_index: Option<usize>,
    /// Value of the matched answer, 0 for a miss
    pub value: u64,
}

impl FaceOffAttempt {
    fn pending(team_index: usize) -> Self {
        Self {
            team_index,
            answer_index: None,
            value: 0,
        }
    }
}

/// Both face-off answers of the current round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FaceOffAttempts {
    /// The team that buzzed in
    pub first: Option<FaceOffAttempt>,
    /// The other team, only present if the first answer was not the top one
    pub second: Option<FaceOffAttempt>,
}

/// The working data of a game
///
/// Owned by [`Game`] and changed only through its transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameData {
    /// Questions played in order, fixed at setup
    pub selected_questions: Vec<Question>,
    /// Index into `selected_questions` of the question being played
    pub current_question_index: usize,
    /// The two teams
    pub teams: [Team; 2],
    /// Score at which the game ends
    pub max_score: u64,
    /// The team that owns the board
    pub controlling_team_index: Option<usize>,
    /// Points accumulated this round
    pub round_pot: u64,
    /// Indices of the answers revealed this round, in reveal order
    pub revealed_answers: Vec<usize>,
    /// Wrong guesses by the controlling team this round
    pub strikes: u8,
    /// Face-off answers of this round
    pub face_off_attempts: Option<FaceOffAttempts>,
    /// The face-off winner that has to choose between play and pass
    pub play_or_pass_team_index: Option<usize>,
    /// The winning team, set on game over
    pub winner: Option<usize>,
}

impl Default for GameData {
    fn default() -> Self {
        Self {
            selected_questions: Vec::new(),
            current_question_index: 0,
            teams: Default::default(),
            max_score: DEFAULT_MAX_SCORE,
            controlling_team_index: None,
            round_pot: 0,
            revealed_answers: Vec::new(),
            strikes: 0,
            face_off_attempts: None,
            play_or_pass_team_index: None,
            winner: None,
        }
    }
}

impl GameData {
    /// The question being played, if any
    pub fn current_question(&self) -> Option<&Question> {
        self.selected_questions.get(self.current_question_index)
    }

    fn answer_value(&self, answer_index: usize) -> Option<u64> {
        self.current_question()
            .and_then(|q| q.answer(answer_index))
            .map(|a| a.value)
    }

    fn is_revealed(&self, answer_index: usize) -> bool {
        self.revealed_answers.contains(&answer_index)
    }

    fn all_revealed(&self) -> bool {
        self.current_question()
            .is_some_and(|q| self.revealed_answers.len() >= q.answer_count())
    }

    /// Whether `answer` names no answer or one on the current board
    fn is_on_board(&self, answer: Option<usize>) -> bool {
        answer.is_none_or(|index| self.answer_value(index).is_some())
    }

    /// Whether `answer` is a miss or a board answer not yet revealed
    fn is_fresh(&self, answer: Option<usize>) -> bool {
        self.is_on_board(answer) && answer.is_none_or(|index| !self.is_revealed(index))
    }

    fn reveal(&mut self, answer_index: usize) {
        if let Some(value) = self.answer_value(answer_index) {
            if !self.is_revealed(answer_index) {
                self.revealed_answers.push(answer_index);
                self.round_pot = self.round_pot.saturating_add(value);
            }
        }
    }

    fn start_round(&mut self) {
        self.round_pot = 0;
        self.revealed_answers.clear();
        self.strikes = 0;
        self.face_off_attempts = None;
        self.play_or_pass_team_index = None;
        self.controlling_team_index = None;
    }

    fn assign_control(&mut self, team_index: usize) {
        self.controlling_team_index = Some(team_index);
        self.play_or_pass_team_index = Some(team_index);
    }

    fn award(&mut self, team_index: Option<usize>) {
        if let Some(team) = team_index.and_then(|i| self.teams.get_mut(i)) {
            team.score = team.score.saturating_add(self.round_pot);
        }
    }

    fn score_reached_max(&self) -> bool {
        self.teams.iter().any(|team| team.score >= self.max_score)
    }

    fn no_more_questions(&self) -> bool {
        self.current_question_index + 1 >= self.selected_questions.len()
    }

    fn leader(&self) -> usize {
        if self.teams[0].score >= self.teams[1].score {
            0
        } else {
            1
        }
    }
}

/// The team opposing `team_index`
pub fn opponent(team_index: usize) -> usize {
    team_index ^ 1
}

fn is_team(team_index: usize) -> bool {
    team_index < crate::constants::game::TEAM_COUNT
}

/// Events the state machine reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Set up a new game
    Setup {
        /// Questions to play, in order
        questions: Vec<Question>,
        /// Names of team 0 and team 1
        team_names: [String; 2],
        /// Score at which the game ends
        max_score: u64,
    },
    /// Leave the game start screen for the first round
    BeginRound,
    /// Open the face-off
    Next,
    /// A team buzzed in first
    BuzzIn(usize),
    /// Judge a face-off answer; `None` is a miss
    Evaluate(Option<usize>),
    /// The face-off winner keeps the board
    Play,
    /// The face-off winner hands the board to the other team
    Pass,
    /// Judge the controlling team's guess; `None` is a strike
    SubmitAnswer(Option<usize>),
    /// Judge the steal guess; `None` is a miss
    StealAnswer(Option<usize>),
    /// Show the next hidden answer while reviewing the round
    RevealNextRemaining,
    /// Move on from the round review
    NextRound,
    /// Start over after game over
    NewGame,
}

impl Event {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup { .. } => "SETUP",
            Self::BeginRound => "BEGIN_ROUND",
            Self::Next => "NEXT",
            Self::BuzzIn(_) => "BUZZ_IN",
            Self::Evaluate(_) => "EVALUATE",
            Self::Play => "PLAY",
            Self::Pass => "PASS",
            Self::SubmitAnswer(_) => "SUBMIT_ANSWER",
            Self::StealAnswer(_) => "STEAL_ANSWER",
            Self::RevealNextRemaining => "REVEAL_NEXT_REMAINING",
            Self::NextRound => "NEXT_ROUND",
            Self::NewGame => "NEW_GAME",
        }
    }
}

/// Result of matching an event against the current phase
enum Transition {
    /// Move to a phase and run its entry actions
    To(Phase),
    /// Stay in the current phase without re-entering it
    Internal,
}

/// The state machine for a single game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Game {
    phase: Phase,
    data: GameData,
}

impl Game {
    /// Creates a game in the idle phase with default data
    pub fn new() -> Self {
        Self::default()
    }

    /// The current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The current game data
    pub fn data(&self) -> &GameData {
        &self.data
    }

    /// Applies an event
    ///
    /// Events that the current phase does not accept, or whose fields do
    /// not fit the current board, leave the game untouched.
    ///
    /// # Returns
    ///
    /// `true` if the event was applied, `false` if it was ignored
    pub fn send(&mut self, event: Event) -> bool {
        let name = event.name();
        let from = self.phase;

        let Some(transition) = self.transition(event) else {
            warn!(event = name, phase = %from, "event ignored");
            return false;
        };

        if let Transition::To(phase) = transition {
            self.enter(phase);
            while let Some(phase) = self.step() {
                self.enter(phase);
            }
        }

        debug!(event = name, from = %from, to = %self.phase, "phase transition");
        true
    }

    /// Matches an event against the current phase and performs the
    /// transition's actions
    ///
    /// Returns `None`, without touching any data, when the event does not
    /// apply.
    fn transition(&mut self, event: Event) -> Option<Transition> {
        let data = &mut self.data;

        let transition = match (self.phase, event) {
            (
                Phase::Idle,
                Event::Setup {
                    questions,
                    team_names: [first, second],
                    max_score,
                },
            ) => {
                *data = GameData {
                    selected_questions: questions,
                    teams: [Team::named(first), Team::named(second)],
                    max_score,
                    ..GameData::default()
                };
                Transition::To(Phase::GameStart)
            }
            (Phase::GameStart, Event::BeginRound) => {
                data.start_round();
                Transition::To(Phase::RoundStart)
            }
            (Phase::RoundStart, Event::Next) => {
                Transition::To(Phase::FaceOff(FaceOffStep::AwaitingBuzz))
            }
            (Phase::FaceOff(FaceOffStep::AwaitingBuzz), Event::BuzzIn(team_index))
                if is_team(team_index) =>
            {
                data.face_off_attempts = Some(FaceOffAttempts {
                    first: Some(FaceOffAttempt::pending(team_index)),
                    second: None,
                });
                Transition::To(Phase::FaceOff(FaceOffStep::Evaluating))
            }
            (Phase::FaceOff(FaceOffStep::Evaluating), Event::Evaluate(answer))
                if data.is_on_board(answer) =>
            {
                let value = answer.and_then(|i| data.answer_value(i)).unwrap_or(0);
                let attempts = data.face_off_attempts.as_mut()?;
                let first = attempts.first.as_mut()?;
                let team_index = first.team_index;
                first.answer_index = answer;
                first.value = value;

                data.revealed_answers = answer.into_iter().collect();
                data.round_pot = value;

                if answer == Some(0) {
                    data.assign_control(team_index);
                    Transition::To(Phase::FaceOff(FaceOffStep::Resolved))
                } else {
                    attempts.second = Some(FaceOffAttempt::pending(opponent(team_index)));
                    Transition::To(Phase::FaceOff(FaceOffStep::OpponentEvaluating))
                }
            }
            (Phase::FaceOff(FaceOffStep::OpponentEvaluating), Event::Evaluate(answer))
                if data.is_on_board(answer) =>
            {
                let value = answer.and_then(|i| data.answer_value(i)).unwrap_or(0);
                let second = data.face_off_attempts.as_mut()?.second.as_mut()?;
                second.answer_index = answer;
                second.value = value;

                if let Some(index) = answer {
                    data.reveal(index);
                }
                Transition::To(Phase::FaceOff(FaceOffStep::CompareFaceOff))
            }
            (Phase::PlayOrPass, Event::Play) => {
                data.controlling_team_index = data.play_or_pass_team_index;
                Transition::To(Phase::ActiveRound(GuessStep::AwaitingGuess))
            }
            (Phase::PlayOrPass, Event::Pass) => {
                data.controlling_team_index = data.play_or_pass_team_index.map(opponent);
                Transition::To(Phase::ActiveRound(GuessStep::AwaitingGuess))
            }
            (Phase::ActiveRound(GuessStep::AwaitingGuess), Event::SubmitAnswer(answer))
                if data.is_fresh(answer) =>
            {
                Transition::To(Phase::ActiveRound(
                    answer.map_or(GuessStep::Incorrect, GuessStep::Correct),
                ))
            }
            (Phase::StealPhase(StealStep::AwaitingSteal), Event::StealAnswer(answer))
                if data.is_fresh(answer) =>
            {
                Transition::To(Phase::StealPhase(StealStep::StealResolved(answer)))
            }
            (Phase::AwardPoints(_), Event::RevealNextRemaining) => {
                let question = data.current_question()?;
                let next = (0..question.answer_count()).find(|i| !data.is_revealed(*i))?;
                data.revealed_answers.push(next);
                Transition::Internal
            }
            (Phase::AwardPoints(_), Event::NextRound) => {
                if data.score_reached_max() || data.no_more_questions() {
                    data.winner = Some(data.leader());
                    Transition::To(Phase::GameOver)
                } else {
                    data.current_question_index += 1;
                    data.start_round();
                    Transition::To(Phase::RoundStart)
                }
            }
            (Phase::GameOver, Event::NewGame) => {
                *data = GameData::default();
                Transition::To(Phase::Idle)
            }
            _ => return None,
        };

        Some(transition)
    }

    /// Enters a phase, running its entry actions
    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        let data = &mut self.data;

        match phase {
            Phase::ActiveRound(GuessStep::Correct(index)) => data.reveal(index),
            Phase::ActiveRound(GuessStep::Incorrect) => {
                data.strikes = (data.strikes + 1).min(MAX_STRIKES);
            }
            Phase::AwardPoints(RoundOutcome::ControllingWins | RoundOutcome::StealFailed) => {
                data.award(data.controlling_team_index);
            }
            Phase::AwardPoints(RoundOutcome::StealSuccess) => {
                data.award(data.controlling_team_index.map(opponent));
            }
            _ => {}
        }
    }

    /// Evaluates the eventless transition out of a transient phase
    ///
    /// Returns `None` once the game rests in a phase that waits for an
    /// external event.
    fn step(&mut self) -> Option<Phase> {
        let data = &mut self.data;

        match self.phase {
            Phase::FaceOff(FaceOffStep::CompareFaceOff) => {
                let attempts = data.face_off_attempts.unwrap_or_default();
                let winner = match (attempts.first, attempts.second) {
                    (Some(first), Some(second)) if first.value < second.value => {
                        Some(second.team_index)
                    }
                    (Some(first), _) => Some(first.team_index),
                    (None, second) => second.map(|s| s.team_index),
                };
                if let Some(team_index) = winner {
                    data.assign_control(team_index);
                }
                Some(Phase::FaceOff(FaceOffStep::Resolved))
            }
            Phase::FaceOff(FaceOffStep::Resolved) => Some(Phase::PlayOrPass),
            Phase::ActiveRound(GuessStep::Correct(_)) => Some(if data.all_revealed() {
                Phase::AwardPoints(RoundOutcome::ControllingWins)
            } else {
                Phase::ActiveRound(GuessStep::AwaitingGuess)
            }),
            Phase::ActiveRound(GuessStep::Incorrect) => Some(if data.strikes >= MAX_STRIKES {
                Phase::StealPhase(StealStep::AwaitingSteal)
            } else {
                Phase::ActiveRound(GuessStep::AwaitingGuess)
            }),
            Phase::StealPhase(StealStep::StealResolved(Some(index))) => {
                data.reveal(index);
                Some(Phase::AwardPoints(RoundOutcome::StealSuccess))
            }
            Phase::StealPhase(StealStep::StealResolved(None)) => {
                Some(Phase::AwardPoints(RoundOutcome::StealFailed))
            }
            _ => None,
        }
    }
}
