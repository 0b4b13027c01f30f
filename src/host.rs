//! Command routing and broadcast
//!
//! [`Host`] owns the one live [`Game`] together with the catalog and the
//! connection registry. Admin commands are turned into state machine
//! events here, and after each command every connection is brought up to
//! date: transient signals first, in the order clients animate them, then
//! fresh snapshots for every display and admin.

use garde::Validate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    CatalogMessage, SyncMessage, UpdateMessage,
    catalog::Catalog,
    constants::game::{DEFAULT_MAX_SCORE, MAX_MAX_SCORE, MAX_SELECTED_QUESTIONS, MIN_MAX_SCORE},
    game::{Event, FaceOffStep, Game, Phase},
    names,
    session::Tunnel,
    view::{self, RevealedAnswer},
    watcher::{self, Id, Role, Watchers},
};

type ValidationResult = garde::Result;

fn validate_team_names(team_names: &[String; 2]) -> ValidationResult {
    names::team_names(team_names)
        .map(|_| ())
        .map_err(|e| garde::Error::new(e.to_string()))
}

fn default_max_score() -> u64 {
    DEFAULT_MAX_SCORE
}

/// Parameters of a new game as chosen in the setup wizard
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    /// Catalog ids of the questions to play
    #[garde(length(min = 1, max = MAX_SELECTED_QUESTIONS))]
    pub selected_question_ids: Vec<String>,
    /// Names of team 0 and team 1
    #[garde(custom(|v, _| validate_team_names(v)))]
    pub team_names: [String; 2],
    /// Score at which the game ends
    #[serde(default = "default_max_score")]
    #[garde(range(min = MIN_MAX_SCORE, max = MAX_MAX_SCORE))]
    pub max_score: u64,
}

/// Commands sent by the admin console
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    /// Start a game with the given questions and teams
    Setup(SetupRequest),
    /// Start the first round
    BeginRound,
    /// Open the face-off
    Next,
    /// A team buzzed in
    BuzzIn {
        /// The team that buzzed first
        team_index: usize,
    },
    /// Judge a face-off answer
    Evaluate {
        /// The matched answer, or `None` for a miss
        answer_index: Option<usize>,
    },
    /// The face-off winner plays
    Play,
    /// The face-off winner passes
    Pass,
    /// Judge a guess of the controlling team
    SubmitAnswer {
        /// The matched answer, or `None` for a strike
        answer_index: Option<usize>,
    },
    /// Judge the steal guess
    StealAnswer {
        /// The matched answer, or `None` for a miss
        answer_index: Option<usize>,
    },
    /// Turn over the next hidden answer during the round review
    RevealNextRemaining,
    /// Leave the round review
    ContinueAward,
    /// Move on to the next round
    NextRound,
    /// Start over after game over
    NewGame,
    /// Throw the current game away, whatever phase it is in
    Reset,
}

/// Messages received from a connection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum IncomingMessage {
    /// An unassigned connection picks its role
    Join(Role),
    /// The admin drives the game
    Command(Command),
}

impl IncomingMessage {
    /// Validates that a message matches the sender's role
    fn follows(&self, sender: Role) -> bool {
        matches!(
            (self, sender),
            (IncomingMessage::Join(_), Role::Unassigned) | (IncomingMessage::Command(_), Role::Admin)
        )
    }
}

/// The live game and everyone watching it
#[derive(Debug, Default)]
pub struct Host {
    catalog: Catalog,
    game: Game,
    watchers: Watchers,
}

impl Host {
    /// Creates a host with an idle game over the given catalog
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            game: Game::new(),
            watchers: Watchers::default(),
        }
    }

    /// The question catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The live game
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The connection registry
    pub fn watchers(&self) -> &Watchers {
        &self.watchers
    }

    /// Registers a new connection that has not chosen a role yet
    ///
    /// # Errors
    ///
    /// Returns `watcher::Error::MaximumWatchers` if the game cannot accept
    /// more connections.
    pub fn add_unassigned(&mut self, watcher_id: Id) -> Result<(), watcher::Error> {
        self.watchers.add_watcher(watcher_id, Role::Unassigned)?;
        info!(%watcher_id, "connection added");
        Ok(())
    }

    /// Forgets a connection and closes its tunnel
    pub fn remove_watcher<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        watcher_id: Id,
        tunnel_finder: F,
    ) {
        if let Some(role) = self.watchers.remove_watcher(watcher_id, tunnel_finder) {
            info!(%watcher_id, ?role, "connection removed");
        }
    }

    /// Handles a message from a connection
    ///
    /// Messages that do not fit the sender's role are dropped: only
    /// unassigned connections may join, and only admins may send commands.
    ///
    /// # Arguments
    ///
    /// * `watcher_id` - ID of the sending connection
    /// * `message` - The decoded message
    /// * `tunnel_finder` - Function to find the tunnel of a connection
    pub fn receive_message<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        watcher_id: Id,
        message: IncomingMessage,
        tunnel_finder: F,
    ) {
        let Some(role) = self.watchers.get_watcher_role(watcher_id) else {
            return;
        };

        if !message.follows(role) {
            warn!(%watcher_id, ?role, "message does not match sender role");
            return;
        }

        match message {
            IncomingMessage::Join(Role::Unassigned) => {}
            IncomingMessage::Join(role) => {
                self.watchers.update_watcher_role(watcher_id, role);
                info!(%watcher_id, ?role, "connection joined");
                self.update_session(watcher_id, tunnel_finder);
            }
            IncomingMessage::Command(command) => self.receive_command(command, tunnel_finder),
        }
    }

    /// Sends a connection everything it needs to render from scratch
    ///
    /// Admins receive the catalog followed by the admin snapshot, displays
    /// the public snapshot. Also used when a connection resumes.
    pub fn update_session<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        watcher_id: Id,
        tunnel_finder: F,
    ) {
        match self.watchers.get_watcher_role(watcher_id) {
            Some(Role::Admin) => {
                self.watchers.send_state(
                    &CatalogMessage::from(&self.catalog).into(),
                    watcher_id,
                    &tunnel_finder,
                );
                self.watchers
                    .send_state(&self.admin_state(), watcher_id, &tunnel_finder);
            }
            Some(Role::Display) => {
                self.watchers
                    .send_state(&self.display_state(), watcher_id, &tunnel_finder);
            }
            Some(Role::Unassigned) | None => {}
        }
    }

    /// Applies an admin command and brings every connection up to date
    ///
    /// Signals go out to admins and displays in this order: the steal
    /// failure of a missed opposing face-off answer before the game moves
    /// on, then any reveal, strike or steal failure the command caused.
    /// Snapshots are broadcast last, whether or not the game accepted the
    /// command.
    pub fn receive_command<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        command: Command,
        tunnel_finder: F,
    ) {
        if command == Command::Reset {
            info!(phase = %self.game.phase(), "game reset");
            self.game = Game::new();
        } else if let Some(event) = self.event(command) {
            self.apply(event, &tunnel_finder);
        }

        self.broadcast_state(&tunnel_finder);
    }

    /// Turns a command into a state machine event
    ///
    /// Returns `None` for a setup that does not validate or that selects
    /// no known question.
    fn event(&self, command: Command) -> Option<Event> {
        Some(match command {
            Command::Setup(request) => return self.setup_event(request),
            Command::BeginRound => Event::BeginRound,
            Command::Next => Event::Next,
            Command::BuzzIn { team_index } => Event::BuzzIn(team_index),
            Command::Evaluate { answer_index } => Event::Evaluate(answer_index),
            Command::Play => Event::Play,
            Command::Pass => Event::Pass,
            Command::SubmitAnswer { answer_index } => Event::SubmitAnswer(answer_index),
            Command::StealAnswer { answer_index } => Event::StealAnswer(answer_index),
            Command::RevealNextRemaining => Event::RevealNextRemaining,
            Command::ContinueAward | Command::NextRound => Event::NextRound,
            Command::NewGame => Event::NewGame,
            Command::Reset => return None,
        })
    }

    fn setup_event(&self, request: SetupRequest) -> Option<Event> {
        if let Err(report) = request.validate() {
            warn!(%report, "setup rejected");
            return None;
        }

        let Ok(team_names) = names::team_names(&request.team_names) else {
            return None;
        };

        let questions = self.catalog.select(&request.selected_question_ids);
        if questions.is_empty() {
            warn!(
                requested = request.selected_question_ids.len(),
                "setup rejected: no known question selected"
            );
            return None;
        }

        Some(Event::Setup {
            questions,
            team_names,
            max_score: request.max_score,
        })
    }

    fn apply<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, event: Event, tunnel_finder: &F) {
        let revealed_before = self.game.data().revealed_answers.clone();

        if self.game.phase() == Phase::FaceOff(FaceOffStep::OpponentEvaluating)
            && event == Event::Evaluate(None)
        {
            self.watchers
                .announce(&UpdateMessage::StealFailed, tunnel_finder);
        }

        info!(event = event.name(), "admin command");
        if !self.game.send(event.clone()) {
            return;
        }

        let data = self.game.data();
        let signal = match event {
            Event::Evaluate(Some(index))
            | Event::SubmitAnswer(Some(index))
            | Event::StealAnswer(Some(index)) => self.reveal(index),
            Event::RevealNextRemaining => data
                .revealed_answers
                .iter()
                .find(|index| !revealed_before.contains(index))
                .and_then(|index| self.reveal(*index)),
            Event::StealAnswer(None) => Some(UpdateMessage::StealFailed),
            Event::SubmitAnswer(None) => Some(UpdateMessage::Strike {
                count: data.strikes,
            }),
            _ => None,
        };

        if let Some(signal) = signal {
            self.watchers.announce(&signal, tunnel_finder);
        }
    }

    fn reveal(&self, index: usize) -> Option<UpdateMessage> {
        self.game
            .data()
            .current_question()
            .and_then(|question| RevealedAnswer::of(question, index))
            .map(UpdateMessage::from)
    }

    fn display_state(&self) -> SyncMessage {
        view::public_snapshot(&self.game).into()
    }

    fn admin_state(&self) -> SyncMessage {
        view::admin_snapshot(&self.game, &self.catalog).into()
    }

    fn broadcast_state<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, tunnel_finder: &F) {
        self.watchers
            .announce_state_specific(Role::Display, &self.display_state(), tunnel_finder);
        self.watchers
            .announce_state_specific(Role::Admin, &self.admin_state(), tunnel_finder);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::{
        collections::{HashMap, VecDeque},
        sync::{Arc, Mutex},
    };

    use pretty_assertions::assert_eq;

    use crate::{
        catalog::{Answer, Question},
        game::{GuessStep, RoundOutcome, StealStep},
        view::PublicSnapshot,
    };

    #[derive(Debug, Clone)]
    enum Sent {
        Message(UpdateMessage),
        State(SyncMessage),
    }

    #[derive(Debug, Clone, Default)]
    struct RecordingTunnel {
        sent: Arc<Mutex<VecDeque<Sent>>>,
    }

    impl Tunnel for RecordingTunnel {
        fn send_message(&self, message: &UpdateMessage) {
            self.sent
                .lock()
                .unwrap()
                .push_back(Sent::Message(message.clone()));
        }

        fn send_state(&self, state: &SyncMessage) {
            self.sent.lock().unwrap().push_back(Sent::State(state.clone()));
        }

        fn close(self) {}
    }

    struct Harness {
        host: Host,
        tunnels: HashMap<Id, RecordingTunnel>,
        admin: Id,
        display: Id,
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Question::new(
                "fruit",
                "Name a fruit",
                vec!["food".to_string()],
                vec![
                    Answer::new("Apple", 30),
                    Answer::new("Banana", 25),
                    Answer::new("Grape", 10),
                ],
            ),
            Question::new(
                "pets",
                "Name a household pet",
                vec!["animals".to_string()],
                vec![Answer::new("Cat", 20), Answer::new("Dog", 40)],
            ),
        ])
    }

    fn setup_request(ids: &[&str], max_score: u64) -> SetupRequest {
        SetupRequest {
            selected_question_ids: ids.iter().map(ToString::to_string).collect(),
            team_names: ["X".to_string(), "Y".to_string()],
            max_score,
        }
    }

    impl Harness {
        fn new() -> Self {
            let mut harness = Self {
                host: Host::new(catalog()),
                tunnels: HashMap::new(),
                admin: Id::new(),
                display: Id::new(),
            };
            let (admin, display) = (harness.admin, harness.display);
            harness.connect(admin);
            harness.connect(display);
            harness.send(admin, IncomingMessage::Join(Role::Admin));
            harness.send(display, IncomingMessage::Join(Role::Display));
            harness.drain(admin);
            harness.drain(display);
            harness
        }

        fn connect(&mut self, id: Id) {
            self.tunnels.insert(id, RecordingTunnel::default());
            self.host.add_unassigned(id).unwrap();
        }

        fn send(&mut self, id: Id, message: IncomingMessage) {
            self.host
                .receive_message(id, message, |id| self.tunnels.get(&id).cloned());
        }

        fn command(&mut self, command: Command) {
            self.send(self.admin, IncomingMessage::Command(command));
        }

        fn commands(&mut self, commands: impl IntoIterator<Item = Command>) {
            for command in commands {
                self.command(command);
            }
        }

        fn drain(&self, id: Id) -> Vec<Sent> {
            self.tunnels[&id].sent.lock().unwrap().drain(..).collect()
        }

        fn phase(&self) -> Phase {
            self.host.game().phase()
        }

        /// Signals the display received, ending with its snapshot
        fn display_signals(&self) -> (Vec<UpdateMessage>, PublicSnapshot) {
            let mut sent = self.drain(self.display);
            let Some(Sent::State(SyncMessage::Display(snapshot))) = sent.pop() else {
                panic!("display did not end with a snapshot");
            };
            let signals = sent
                .into_iter()
                .map(|s| match s {
                    Sent::Message(m) => m,
                    Sent::State(s) => panic!("unexpected state {s:?}"),
                })
                .collect();
            (signals, snapshot)
        }
    }

    fn reveal(index: usize, text: &str, value: u64) -> UpdateMessage {
        UpdateMessage::Reveal(RevealedAnswer {
            index,
            text: text.to_string(),
            value,
        })
    }

    #[test]
    fn test_admin_join_receives_catalog_then_snapshot() {
        let mut harness = Harness::new();
        let admin = Id::new();
        harness.connect(admin);
        harness.send(admin, IncomingMessage::Join(Role::Admin));

        let sent = harness.drain(admin);
        assert_eq!(sent.len(), 2);
        let Sent::State(SyncMessage::Catalog(catalog)) = &sent[0] else {
            panic!("expected catalog first, got {:?}", sent[0]);
        };
        assert_eq!(catalog.tags, vec!["animals", "food"]);
        assert_eq!(catalog.questions.len(), 2);
        assert!(matches!(&sent[1], Sent::State(SyncMessage::Admin(_))));
    }

    #[test]
    fn test_display_join_receives_public_snapshot() {
        let mut harness = Harness::new();
        let display = Id::new();
        harness.connect(display);
        harness.send(display, IncomingMessage::Join(Role::Display));

        let sent = harness.drain(display);
        assert_eq!(sent.len(), 1);
        let Sent::State(SyncMessage::Display(snapshot)) = &sent[0] else {
            panic!("expected display snapshot");
        };
        assert_eq!(snapshot.phase, Phase::Idle);
    }

    #[test]
    fn test_commands_only_accepted_from_admin() {
        let mut harness = Harness::new();
        let stranger = Id::new();
        harness.connect(stranger);

        harness.send(
            harness.display,
            IncomingMessage::Command(Command::Setup(setup_request(&["pets"], 60))),
        );
        harness.send(
            stranger,
            IncomingMessage::Command(Command::Setup(setup_request(&["pets"], 60))),
        );
        harness.send(Id::new(), IncomingMessage::Join(Role::Admin));

        assert_eq!(harness.phase(), Phase::Idle);
        assert!(harness.drain(harness.display).is_empty());
        assert!(harness.drain(stranger).is_empty());
    }

    #[test]
    fn test_joined_connection_cannot_join_again() {
        let mut harness = Harness::new();
        harness.send(harness.display, IncomingMessage::Join(Role::Admin));

        assert_eq!(
            harness.host.watchers().get_watcher_role(harness.display),
            Some(Role::Display)
        );
    }

    #[test]
    fn test_setup_resolves_catalog_order_and_cleans_names() {
        let mut harness = Harness::new();
        harness.command(Command::Setup(SetupRequest {
            selected_question_ids: vec!["pets".into(), "missing".into(), "fruit".into()],
            team_names: ["  Smiths ".to_string(), "Joneses".to_string()],
            max_score: 300,
        }));

        let data = harness.host.game().data();
        assert_eq!(harness.phase(), Phase::GameStart);
        assert_eq!(
            data.selected_questions
                .iter()
                .map(|q| q.id.as_str())
                .collect::<Vec<_>>(),
            vec!["fruit", "pets"]
        );
        assert_eq!(data.teams[0].name, "Smiths");
        assert_eq!(data.max_score, 300);
    }

    #[test]
    fn test_invalid_setups_are_ignored_but_broadcast() {
        let mut harness = Harness::new();
        let invalid = [
            setup_request(&[], 60),
            setup_request(&["missing"], 60),
            setup_request(&["pets"], 0),
            SetupRequest {
                team_names: ["Same".to_string(), "Same".to_string()],
                ..setup_request(&["pets"], 60)
            },
            SetupRequest {
                team_names: ["   ".to_string(), "Y".to_string()],
                ..setup_request(&["pets"], 60)
            },
        ];

        for request in invalid {
            assert!(request.validate().is_err() || request.selected_question_ids == ["missing"]);
            harness.command(Command::Setup(request));
            assert_eq!(harness.phase(), Phase::Idle);

            let (signals, snapshot) = harness.display_signals();
            assert!(signals.is_empty());
            assert_eq!(snapshot.phase, Phase::Idle);
        }
    }

    #[test]
    fn test_top_answer_face_off_reveals_before_snapshot() {
        let mut harness = Harness::new();
        harness.commands([
            Command::Setup(setup_request(&["pets"], 60)),
            Command::BeginRound,
            Command::Next,
            Command::BuzzIn { team_index: 0 },
        ]);
        harness.drain(harness.display);
        harness.drain(harness.admin);

        harness.command(Command::Evaluate {
            answer_index: Some(0),
        });

        let (signals, snapshot) = harness.display_signals();
        assert_eq!(signals, vec![reveal(0, "Dog", 40)]);
        assert_eq!(snapshot.phase, Phase::PlayOrPass);
        assert_eq!(snapshot.controlling_team_index, Some(0));
        assert_eq!(snapshot.round_pot, 40);

        let admin = harness.drain(harness.admin);
        assert_eq!(admin.len(), 2);
        assert!(matches!(&admin[0], Sent::Message(m) if *m == reveal(0, "Dog", 40)));
        assert!(matches!(&admin[1], Sent::State(SyncMessage::Admin(_))));
    }

    #[test]
    fn test_first_face_off_miss_sends_no_steal_failure() {
        let mut harness = Harness::new();
        harness.commands([
            Command::Setup(setup_request(&["pets"], 200)),
            Command::BeginRound,
            Command::Next,
            Command::BuzzIn { team_index: 0 },
        ]);
        harness.drain(harness.display);

        harness.command(Command::Evaluate { answer_index: None });
        let (signals, snapshot) = harness.display_signals();
        assert!(signals.is_empty());
        assert_eq!(snapshot.phase, Phase::FaceOff(FaceOffStep::OpponentEvaluating));

        harness.command(Command::Evaluate {
            answer_index: Some(1),
        });
        let (signals, snapshot) = harness.display_signals();
        assert_eq!(signals, vec![reveal(1, "Cat", 20)]);
        assert_eq!(snapshot.round_pot, 20);
        assert_eq!(snapshot.controlling_team_index, Some(1));
    }

    #[test]
    fn test_opponent_face_off_miss_signals_before_transition() {
        let mut harness = Harness::new();
        harness.commands([
            Command::Setup(setup_request(&["pets"], 200)),
            Command::BeginRound,
            Command::Next,
            Command::BuzzIn { team_index: 1 },
            Command::Evaluate {
                answer_index: Some(1),
            },
        ]);
        harness.drain(harness.display);

        harness.command(Command::Evaluate { answer_index: None });

        let (signals, snapshot) = harness.display_signals();
        assert_eq!(signals, vec![UpdateMessage::StealFailed]);
        assert_eq!(snapshot.phase, Phase::PlayOrPass);
        assert_eq!(snapshot.controlling_team_index, Some(1));
    }

    fn strike_out(harness: &mut Harness) {
        harness.commands([
            Command::Setup(setup_request(&["fruit", "pets"], 500)),
            Command::BeginRound,
            Command::Next,
            Command::BuzzIn { team_index: 0 },
            Command::Evaluate {
                answer_index: Some(0),
            },
            Command::Play,
        ]);
        harness.drain(harness.display);

        for count in 1..=3 {
            harness.command(Command::SubmitAnswer { answer_index: None });
            let (signals, snapshot) = harness.display_signals();
            assert_eq!(signals, vec![UpdateMessage::Strike { count }]);
            assert_eq!(snapshot.strikes, count);
        }
        assert_eq!(harness.phase(), Phase::StealPhase(StealStep::AwaitingSteal));
    }

    #[test]
    fn test_strikes_are_signalled_with_count() {
        let mut harness = Harness::new();
        strike_out(&mut harness);
    }

    #[test]
    fn test_missed_steal_signals_failure() {
        let mut harness = Harness::new();
        strike_out(&mut harness);

        harness.command(Command::StealAnswer { answer_index: None });

        let (signals, snapshot) = harness.display_signals();
        assert_eq!(signals, vec![UpdateMessage::StealFailed]);
        assert_eq!(snapshot.phase, Phase::AwardPoints(RoundOutcome::StealFailed));
        assert_eq!(snapshot.round_outcome, Some(RoundOutcome::StealFailed));
        assert_eq!(snapshot.teams[0].score, 30);
    }

    #[test]
    fn test_successful_steal_reveals_answer() {
        let mut harness = Harness::new();
        strike_out(&mut harness);

        harness.command(Command::StealAnswer {
            answer_index: Some(2),
        });

        let (signals, snapshot) = harness.display_signals();
        assert_eq!(signals, vec![reveal(2, "Grape", 10)]);
        assert_eq!(snapshot.teams[1].score, 40);
    }

    #[test]
    fn test_reveal_remaining_then_continue() {
        let mut harness = Harness::new();
        strike_out(&mut harness);
        harness.command(Command::StealAnswer { answer_index: None });
        harness.drain(harness.display);

        harness.command(Command::RevealNextRemaining);
        let (signals, snapshot) = harness.display_signals();
        assert_eq!(signals, vec![reveal(1, "Banana", 25)]);
        assert_eq!(snapshot.round_pot, 30);

        harness.command(Command::RevealNextRemaining);
        let (signals, _) = harness.display_signals();
        assert_eq!(signals, vec![reveal(2, "Grape", 10)]);

        harness.command(Command::RevealNextRemaining);
        let (signals, _) = harness.display_signals();
        assert!(signals.is_empty());

        harness.command(Command::ContinueAward);
        assert_eq!(harness.phase(), Phase::RoundStart);
        assert_eq!(harness.host.game().data().current_question_index, 1);
    }

    #[test]
    fn test_ignored_command_only_broadcasts() {
        let mut harness = Harness::new();
        harness.command(Command::SubmitAnswer {
            answer_index: Some(0),
        });

        let (signals, snapshot) = harness.display_signals();
        assert!(signals.is_empty());
        assert_eq!(snapshot.phase, Phase::Idle);
    }

    #[test]
    fn test_reset_from_any_phase() {
        let mut harness = Harness::new();
        harness.commands([
            Command::Setup(setup_request(&["fruit"], 500)),
            Command::BeginRound,
            Command::Next,
            Command::BuzzIn { team_index: 0 },
            Command::Evaluate {
                answer_index: Some(0),
            },
            Command::Play,
        ]);
        assert_eq!(
            harness.phase(),
            Phase::ActiveRound(GuessStep::AwaitingGuess)
        );
        harness.drain(harness.display);

        harness.command(Command::Reset);
        assert_eq!(harness.host.game(), &Game::new());
        let (signals, snapshot) = harness.display_signals();
        assert!(signals.is_empty());
        assert_eq!(snapshot.phase, Phase::Idle);

        harness.command(Command::Setup(setup_request(&["pets"], 60)));
        assert_eq!(harness.phase(), Phase::GameStart);
    }

    #[test]
    fn test_full_game_to_new_game() {
        let mut harness = Harness::new();
        harness.commands([
            Command::Setup(setup_request(&["pets"], 60)),
            Command::BeginRound,
            Command::Next,
            Command::BuzzIn { team_index: 0 },
            Command::Evaluate {
                answer_index: Some(0),
            },
            Command::Play,
            Command::SubmitAnswer {
                answer_index: Some(1),
            },
        ]);
        assert_eq!(
            harness.phase(),
            Phase::AwardPoints(RoundOutcome::ControllingWins)
        );

        harness.command(Command::NextRound);
        assert_eq!(harness.phase(), Phase::GameOver);
        assert_eq!(harness.host.game().data().winner, Some(0));

        harness.command(Command::NewGame);
        assert_eq!(harness.phase(), Phase::Idle);
    }

    #[test]
    fn test_removed_watcher_receives_nothing() {
        let mut harness = Harness::new();
        let display = harness.display;
        harness
            .host
            .remove_watcher(display, |id| harness.tunnels.get(&id).cloned());

        harness.command(Command::Setup(setup_request(&["pets"], 60)));
        assert!(harness.drain(display).is_empty());
        assert!(!harness.host.watchers().has_watcher(display));
    }

    #[test]
    fn test_command_wire_format() {
        let parse = |json: &str| serde_json::from_str::<Command>(json).unwrap();

        assert_eq!(parse(r#"{"type":"BEGIN_ROUND"}"#), Command::BeginRound);
        assert_eq!(
            parse(r#"{"type":"BUZZ_IN","teamIndex":1}"#),
            Command::BuzzIn { team_index: 1 }
        );
        assert_eq!(
            parse(r#"{"type":"EVALUATE","answerIndex":null}"#),
            Command::Evaluate { answer_index: None }
        );
        assert_eq!(
            parse(r#"{"type":"SUBMIT_ANSWER","answerIndex":2}"#),
            Command::SubmitAnswer {
                answer_index: Some(2)
            }
        );
        assert_eq!(
            parse(r#"{"type":"REVEAL_NEXT_REMAINING"}"#),
            Command::RevealNextRemaining
        );
        assert_eq!(parse(r#"{"type":"CONTINUE_AWARD"}"#), Command::ContinueAward);
        assert_eq!(parse(r#"{"type":"RESET"}"#), Command::Reset);
        assert_eq!(
            parse(
                r#"{"type":"SETUP","selectedQuestionIds":["pets"],"teamNames":["X","Y"],"maxScore":60}"#
            ),
            Command::Setup(setup_request(&["pets"], 60))
        );
        assert_eq!(
            parse(r#"{"type":"SETUP","selectedQuestionIds":["pets"],"teamNames":["X","Y"]}"#),
            Command::Setup(setup_request(&["pets"], DEFAULT_MAX_SCORE))
        );
        assert!(serde_json::from_str::<Command>(r#"{"type":"JUMP"}"#).is_err());
    }

    #[test]
    fn test_incoming_message_wire_format() {
        assert_eq!(
            serde_json::from_str::<IncomingMessage>(r#"{"Join":"Display"}"#).unwrap(),
            IncomingMessage::Join(Role::Display)
        );
        assert_eq!(
            serde_json::from_str::<IncomingMessage>(r#"{"Command":{"type":"PASS"}}"#).unwrap(),
            IncomingMessage::Command(Command::Pass)
        );
    }
}
