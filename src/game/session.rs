use log::{debug, info, trace, warn};
use std::time::Duration;
use uuid::Uuid;

use super::layout_generator::LayoutGenerator;
use super::rewards;
use super::settings::Settings;
use crate::events::EventEmitter;
use crate::model::{
    CompletionResult, Difficulty, HintOutcome, NoOpReason, Piece, PieceId, PlacementOutcome,
    Position, PuzzleType, SessionClock, SessionError, SessionEvent, SessionState, SolutionMap,
    Target, TargetId,
};

/// Release positions farther than this from every target are ignored.
pub const DEFAULT_SNAP_RADIUS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub puzzle_type: PuzzleType,
    pub difficulty: Difficulty,
    pub time_limited: bool,
    pub snap_radius: f32,
}

impl SessionConfig {
    pub fn new(puzzle_type: PuzzleType, difficulty: Difficulty) -> Self {
        Self {
            puzzle_type,
            difficulty,
            time_limited: true,
            snap_radius: DEFAULT_SNAP_RADIUS,
        }
    }

    pub fn untimed(mut self) -> Self {
        self.time_limited = false;
        self
    }

    pub fn with_snap_radius(mut self, snap_radius: f32) -> Self {
        self.snap_radius = snap_radius;
        self
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            puzzle_type: settings.puzzle_type,
            difficulty: settings.difficulty,
            time_limited: settings.time_limited,
            snap_radius: settings.effective_snap_radius(),
        }
    }
}

/// One attempt at one puzzle. Owns the canonical state, arbitrates every
/// placement and hint, and reports the reward once the last piece lands.
///
/// All calls come from a single frame loop; events are emitted synchronously
/// after each state change and before the call returns.
pub struct PuzzleSession {
    config: SessionConfig,
    generator: Box<dyn LayoutGenerator>,
    emitter: EventEmitter<SessionEvent>,
    state: SessionState,
    pieces: Vec<Piece>,
    targets: Vec<Target>,
    solution: SolutionMap,
    completed_pieces: Vec<PieceId>,
    correct_placements: u32,
    total_placements: u32,
    hints_used: u32,
    clock: SessionClock,
    playthrough_id: Uuid,
    completion: Option<CompletionResult>,
}

impl PuzzleSession {
    pub fn new(
        config: SessionConfig,
        generator: Box<dyn LayoutGenerator>,
        emitter: EventEmitter<SessionEvent>,
    ) -> Self {
        Self {
            config,
            generator,
            emitter,
            state: SessionState::NotStarted,
            pieces: Vec::new(),
            targets: Vec::new(),
            solution: SolutionMap::new(),
            completed_pieces: Vec::new(),
            correct_placements: 0,
            total_placements: 0,
            hints_used: 0,
            clock: SessionClock::default(),
            playthrough_id: Uuid::nil(),
            completion: None,
        }
    }

    fn emit(&self, event: SessionEvent) {
        self.emitter.emit(&event);
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }

        let layout = self
            .generator
            .generate(self.config.puzzle_type, self.config.difficulty);
        if let Err(err) = layout.validate() {
            warn!(target: "session", "Rejecting generated layout: {}", err);
            return Err(err.into());
        }

        self.pieces = layout.pieces;
        self.targets = layout.targets;
        self.solution = layout.solution;
        self.clock = if self.config.time_limited {
            SessionClock::counting_down(self.config.difficulty.time_limit())
        } else {
            SessionClock::counting_up()
        };
        self.playthrough_id = Uuid::new_v4();
        self.state = SessionState::Running;

        info!(
            target: "session",
            "Puzzle started; type: {:?}; difficulty: {}; pieces: {}; time limit: {:?}",
            self.config.puzzle_type,
            self.config.difficulty,
            self.pieces.len(),
            self.clock.limit
        );
        self.emit(SessionEvent::Started {
            puzzle_type: self.config.puzzle_type,
            difficulty: self.config.difficulty,
            piece_count: self.piece_count(),
        });
        self.emit(SessionEvent::ProgressUpdate {
            correct: 0,
            piece_count: self.piece_count(),
        });
        Ok(())
    }

    /// Drops all progress and goes back to `NotStarted`.
    pub fn reset(&mut self) {
        debug!(target: "session", "Resetting session {}", self.playthrough_id);
        self.state = SessionState::NotStarted;
        self.pieces.clear();
        self.targets.clear();
        self.solution = SolutionMap::new();
        self.completed_pieces.clear();
        self.correct_placements = 0;
        self.total_placements = 0;
        self.hints_used = 0;
        self.clock = SessionClock::default();
        self.playthrough_id = Uuid::nil();
        self.completion = None;
    }

    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.reset();
        self.start()
    }

    /// Advances the clock by one frame. Returns the state after the tick.
    pub fn tick(&mut self, delta: Duration) -> SessionState {
        if self.state != SessionState::Running || self.clock.is_paused() {
            return self.state;
        }

        self.clock = self.clock.advanced(delta);
        trace!(target: "session", "Tick {:?}; elapsed: {:?}", delta, self.clock.elapsed());
        self.emit(SessionEvent::TimeUpdate {
            remaining: self.clock.remaining(),
            elapsed: self.clock.elapsed(),
        });

        if self.clock.is_expired() {
            self.state = SessionState::TimedOut;
            info!(
                target: "session",
                "Time's up; placed {}/{}",
                self.correct_placements,
                self.piece_count()
            );
            self.emit(SessionEvent::TimedOut);
        }
        self.state
    }

    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Running || self.clock.is_paused() {
            return false;
        }
        self.clock = self.clock.paused();
        self.emit(SessionEvent::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != SessionState::Running || !self.clock.is_paused() {
            return false;
        }
        self.clock = self.clock.resumed();
        self.emit(SessionEvent::Resumed);
        true
    }

    fn blocked_reason(&self) -> Option<NoOpReason> {
        match self.state {
            SessionState::NotStarted => Some(NoOpReason::NotStarted),
            SessionState::Completed | SessionState::TimedOut => Some(NoOpReason::SessionTerminal),
            SessionState::Running if self.clock.is_paused() => Some(NoOpReason::Paused),
            SessionState::Running => None,
        }
    }

    fn piece_index(&self, piece_id: PieceId) -> Option<usize> {
        self.pieces.iter().position(|piece| piece.id == piece_id)
    }

    /// Closest target strictly inside the snap radius.
    pub fn nearest_target(&self, position: &Position) -> Option<&Target> {
        self.targets
            .iter()
            .map(|target| (target, target.distance_to(position)))
            .filter(|(_, distance)| *distance < self.config.snap_radius)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(target, _)| target)
    }

    fn validate_placement(&self, piece: &Piece, target: &Target) -> bool {
        match self.solution.target_for(piece.id) {
            Some(expected) => expected == target.id,
            None => target.can_accept(piece),
        }
    }

    /// Handles a piece released at `position` by the input layer.
    pub fn attempt_placement(
        &mut self,
        piece_id: PieceId,
        position: Position,
    ) -> Result<PlacementOutcome, SessionError> {
        if let Some(reason) = self.blocked_reason() {
            debug!(target: "session", "Ignoring placement of {}: {:?}", piece_id, reason);
            return Ok(PlacementOutcome::NoOp(reason));
        }

        let index = self
            .piece_index(piece_id)
            .ok_or(SessionError::InvalidPieceId(piece_id))?;
        if self.pieces[index].is_placed() {
            return Ok(PlacementOutcome::NoOp(NoOpReason::AlreadyPlaced));
        }

        let (target_id, anchor, correct) = match self.nearest_target(&position) {
            Some(target) => (
                target.id,
                target.position,
                self.validate_placement(&self.pieces[index], target),
            ),
            None => {
                trace!(target: "session", "No target near {:?} for {}", position, piece_id);
                return Ok(PlacementOutcome::NoTargetInRange);
            }
        };

        if correct {
            Ok(self.accept_placement(index, target_id, anchor))
        } else {
            Ok(self.reject_placement(piece_id, target_id))
        }
    }

    fn accept_placement(&mut self, index: usize, target: TargetId, anchor: Position) -> PlacementOutcome {
        self.correct_placements += 1;
        self.total_placements += 1;

        let piece = &mut self.pieces[index];
        piece.place_at(anchor);
        let piece_id = piece.id;
        self.completed_pieces.push(piece_id);

        debug!(
            target: "session",
            "Correct placement {} -> {}; progress: {}/{}",
            piece_id,
            target,
            self.correct_placements,
            self.piece_count()
        );
        self.emit(SessionEvent::CorrectPlacement {
            piece: piece_id,
            target,
            correct: self.correct_placements,
        });
        self.emit(SessionEvent::ProgressUpdate {
            correct: self.correct_placements,
            piece_count: self.piece_count(),
        });

        let completion = if self.correct_placements >= self.piece_count() {
            Some(self.complete())
        } else {
            None
        };
        PlacementOutcome::Accepted { target, completion }
    }

    fn reject_placement(&mut self, piece_id: PieceId, target: TargetId) -> PlacementOutcome {
        self.total_placements += 1;
        let wrong_attempts = self.wrong_attempts();

        debug!(
            target: "session",
            "Incorrect placement {} -> {}; wrong attempts: {}",
            piece_id,
            target,
            wrong_attempts
        );
        self.emit(SessionEvent::IncorrectPlacement {
            piece: piece_id,
            target,
            wrong_attempts,
        });
        PlacementOutcome::Rejected {
            target,
            wrong_attempts,
        }
    }

    fn complete(&mut self) -> CompletionResult {
        self.state = SessionState::Completed;
        let result = rewards::completion_result(
            self.config.puzzle_type,
            self.config.difficulty,
            self.correct_placements,
            self.total_placements,
            self.hints_used,
            &self.clock,
            self.playthrough_id,
        );
        info!(
            target: "session",
            "Puzzle complete! stars: {}; coins: {}; accuracy: {:.2}; time: {:?}",
            result.stars_earned,
            result.coins_earned,
            result.accuracy,
            result.completion_time
        );
        self.completion = Some(result.clone());
        self.emit(SessionEvent::PuzzleComplete(result.clone()));
        result
    }

    /// Points at the first unplaced piece (creation order) and where it goes.
    pub fn use_hint(&mut self) -> HintOutcome {
        if let Some(reason) = self.blocked_reason() {
            return HintOutcome::NoOp(reason);
        }
        if !self.config.difficulty.hints_allowed() {
            return HintOutcome::NoOp(NoOpReason::HintsDisabled);
        }
        if self.hints_used >= self.max_hints() {
            return HintOutcome::NoOp(NoOpReason::HintsExhausted);
        }

        let Some(piece) = self.pieces.iter().find(|piece| !piece.is_placed()) else {
            return HintOutcome::NoOp(NoOpReason::NothingToHint);
        };
        let piece_id = piece.id;
        let target = self.solution.target_for(piece_id).or_else(|| {
            self.targets
                .iter()
                .find(|target| target.can_accept(piece))
                .map(|target| target.id)
        });
        let Some(target) = target else {
            warn!(target: "session", "No target accepts {}; hint not spent", piece_id);
            return HintOutcome::NoOp(NoOpReason::NothingToHint);
        };

        self.hints_used += 1;
        info!(
            target: "session",
            "Hint used: {} -> {}; remaining: {}",
            piece_id,
            target,
            self.hints_remaining()
        );
        self.emit(SessionEvent::HintUsed {
            piece: piece_id,
            target,
            hints_used: self.hints_used,
        });
        HintOutcome::Given {
            piece: piece_id,
            target,
            remaining: self.hints_remaining(),
        }
    }

    /// Input-layer drag update. Placed pieces stay put.
    pub fn move_piece(&mut self, piece_id: PieceId, position: Position) -> Result<bool, SessionError> {
        let index = self
            .piece_index(piece_id)
            .ok_or(SessionError::InvalidPieceId(piece_id))?;
        Ok(self.pieces[index].move_to(position))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn puzzle_type(&self) -> PuzzleType {
        self.config.puzzle_type
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn piece_count(&self) -> u32 {
        self.pieces.len() as u32
    }

    pub fn correct_placements(&self) -> u32 {
        self.correct_placements
    }

    pub fn total_placements(&self) -> u32 {
        self.total_placements
    }

    pub fn wrong_attempts(&self) -> u32 {
        self.total_placements - self.correct_placements
    }

    pub fn accuracy(&self) -> f64 {
        rewards::accuracy(self.correct_placements, self.total_placements)
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn max_hints(&self) -> u32 {
        self.config.difficulty.max_hints()
    }

    pub fn hints_remaining(&self) -> u32 {
        self.max_hints().saturating_sub(self.hints_used)
    }

    pub fn can_use_hint(&self) -> bool {
        self.blocked_reason().is_none()
            && self.config.difficulty.hints_allowed()
            && self.hints_used < self.max_hints()
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn time_remaining(&self) -> Option<Duration> {
        self.clock.remaining()
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, piece_id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id == piece_id)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, target_id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|target| target.id == target_id)
    }

    pub fn solution(&self) -> &SolutionMap {
        &self.solution
    }

    pub fn completed_pieces(&self) -> &[PieceId] {
        &self.completed_pieces
    }

    pub fn completion(&self) -> Option<&CompletionResult> {
        self.completion.as_ref()
    }

    pub fn playthrough_id(&self) -> Uuid {
        self.playthrough_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Channel, EventQueue};
    use crate::game::layout_generator::StandardLayoutGenerator;
    use crate::model::{
        Acceptance, AttributeKey, AttributeValue, Attributes, PieceColor, PuzzleLayout,
    };
    use crate::tests::UsingLogger;
    use test_context::test_context;

    struct FixedLayout(PuzzleLayout);

    impl LayoutGenerator for FixedLayout {
        fn generate(&self, _: PuzzleType, _: Difficulty) -> PuzzleLayout {
            self.0.clone()
        }
    }

    fn standard_session(config: SessionConfig) -> (PuzzleSession, EventQueue<SessionEvent>) {
        let (emitter, observer) = Channel::new();
        let queue = EventQueue::attach(&observer);
        let session = PuzzleSession::new(config, Box::new(StandardLayoutGenerator::new()), emitter);
        (session, queue)
    }

    fn started(puzzle_type: PuzzleType, difficulty: Difficulty) -> (PuzzleSession, EventQueue<SessionEvent>) {
        let (mut session, queue) = standard_session(SessionConfig::new(puzzle_type, difficulty));
        session.start().unwrap();
        queue.drain();
        (session, queue)
    }

    fn solution_position(session: &PuzzleSession, piece: PieceId) -> Position {
        let target = session.solution().target_for(piece).unwrap();
        session.target(target).unwrap().position
    }

    fn place_correctly(session: &mut PuzzleSession, piece: PieceId) -> PlacementOutcome {
        let position = solution_position(session, piece);
        session.attempt_placement(piece, position).unwrap()
    }

    fn piece_ids(session: &PuzzleSession) -> Vec<PieceId> {
        session.pieces().iter().map(|piece| piece.id).collect()
    }

    #[test]
    fn test_start_emits_and_runs() {
        let (mut session, queue) = standard_session(SessionConfig::new(
            PuzzleType::ShapeMatching,
            Difficulty::Easy,
        ));
        assert_eq!(session.state(), SessionState::NotStarted);

        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.piece_count(), 3);
        assert_eq!(session.time_remaining(), Some(Duration::from_secs(300)));
        assert_eq!(
            queue.drain(),
            vec![
                SessionEvent::Started {
                    puzzle_type: PuzzleType::ShapeMatching,
                    difficulty: Difficulty::Easy,
                    piece_count: 3,
                },
                SessionEvent::ProgressUpdate {
                    correct: 0,
                    piece_count: 3
                },
            ]
        );

        assert_eq!(session.start(), Err(SessionError::AlreadyStarted));
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_perfect_easy_run(_: &mut UsingLogger) {
        let (mut session, _queue) = started(PuzzleType::ShapeMatching, Difficulty::Easy);
        session.tick(Duration::from_secs(30));

        let ids = piece_ids(&session);
        let mut outcome = None;
        for id in ids {
            outcome = Some(place_correctly(&mut session, id));
        }

        let Some(PlacementOutcome::Accepted {
            completion: Some(result),
            ..
        }) = outcome
        else {
            panic!("last placement should complete the puzzle");
        };
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(result.accuracy, 1.0);
        assert_eq!(result.stars_earned, 3);
        assert_eq!(result.coins_earned, 45);
        assert_eq!(result.wrong_attempts, 0);
        assert_eq!(result.completion_time, Duration::from_secs(30));
        assert_eq!(result.playthrough_id, session.playthrough_id());
        assert_eq!(session.completion(), Some(&result));
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_expert_run_with_mistakes(_: &mut UsingLogger) {
        let (mut session, _queue) = started(PuzzleType::NumberSequence, Difficulty::Expert);
        session.tick(Duration::from_secs(70));

        let ids = piece_ids(&session);
        for pair in ids.windows(2).take(3) {
            let wrong = solution_position(&session, pair[1]);
            let outcome = session.attempt_placement(pair[0], wrong).unwrap();
            assert!(matches!(outcome, PlacementOutcome::Rejected { .. }));
        }
        for id in ids {
            assert!(place_correctly(&mut session, id).is_accepted());
        }

        let result = session.completion().unwrap();
        assert_eq!(session.total_placements(), 13);
        assert_eq!(session.correct_placements(), 10);
        assert_eq!(result.wrong_attempts, 3);
        assert!((result.accuracy - 10.0 / 13.0).abs() < 1e-9);
        // no accuracy star, no time star (50 of 120s left), no-hints star
        assert_eq!(result.stars_earned, 2);
        assert_eq!(result.coins_earned, 50 + 15);
    }

    #[test]
    fn test_incorrect_placement_leaves_piece_unplaced() {
        let (mut session, queue) = started(PuzzleType::Jigsaw, Difficulty::Normal);
        let ids = piece_ids(&session);

        let outcome = session
            .attempt_placement(ids[0], solution_position(&session, ids[1]))
            .unwrap();

        let expected_target = session.solution().target_for(ids[1]).unwrap();
        assert_eq!(
            outcome,
            PlacementOutcome::Rejected {
                target: expected_target,
                wrong_attempts: 1
            }
        );
        assert!(!session.piece(ids[0]).unwrap().is_placed());
        assert_eq!(session.correct_placements(), 0);
        assert_eq!(session.total_placements(), 1);
        assert_eq!(
            queue.drain(),
            vec![SessionEvent::IncorrectPlacement {
                piece: ids[0],
                target: expected_target,
                wrong_attempts: 1
            }]
        );
    }

    #[test]
    fn test_rejected_piece_can_be_dragged_back() {
        let (mut session, _queue) = started(PuzzleType::Jigsaw, Difficulty::Normal);
        let ids = piece_ids(&session);
        let start = session.piece(ids[0]).unwrap().position();
        let wrong = solution_position(&session, ids[1]);

        assert!(session.move_piece(ids[0], wrong).unwrap());
        let outcome = session.attempt_placement(ids[0], wrong).unwrap();
        assert!(matches!(outcome, PlacementOutcome::Rejected { .. }));

        assert!(session.move_piece(ids[0], start).unwrap());
        assert_eq!(session.piece(ids[0]).unwrap().position(), start);
        assert!(matches!(
            session.move_piece(PieceId(9_999), start),
            Err(SessionError::InvalidPieceId(_))
        ));

        // once placed, a piece stays where it snapped
        let right = solution_position(&session, ids[0]);
        session.attempt_placement(ids[0], right).unwrap();
        assert!(!session.move_piece(ids[0], start).unwrap());
    }

    #[test]
    fn test_no_target_in_range() {
        let (mut session, queue) = started(PuzzleType::ShapeMatching, Difficulty::Easy);
        let id = piece_ids(&session)[0];

        let outcome = session
            .attempt_placement(id, Position::new(50.0, 50.0))
            .unwrap();

        assert_eq!(outcome, PlacementOutcome::NoTargetInRange);
        assert_eq!(session.total_placements(), 0);
        assert_eq!(session.correct_placements(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_snap_radius_is_exclusive_and_picks_nearest() {
        let (mut session, _queue) = started(PuzzleType::Jigsaw, Difficulty::Easy);
        let target = session.targets()[0].position;

        let edge = Position::new(target.x + DEFAULT_SNAP_RADIUS, target.y);
        assert!(session.nearest_target(&edge).is_none());

        let near = Position::new(target.x + 0.4, target.y);
        assert_eq!(session.nearest_target(&near).map(|t| t.id), Some(TargetId(0)));

        let id = piece_ids(&session)[0];
        assert!(session.attempt_placement(id, near).unwrap().is_accepted());
        assert_eq!(session.piece(id).unwrap().position(), target);
    }

    #[test]
    fn test_placed_piece_cannot_be_placed_again() {
        let (mut session, _queue) = started(PuzzleType::Jigsaw, Difficulty::Normal);
        let id = piece_ids(&session)[0];
        assert!(place_correctly(&mut session, id).is_accepted());

        let again = place_correctly(&mut session, id);
        assert_eq!(again, PlacementOutcome::NoOp(NoOpReason::AlreadyPlaced));
        assert_eq!(session.correct_placements(), 1);
        assert_eq!(session.total_placements(), 1);
        assert_eq!(session.completed_pieces(), &[id]);

        assert_eq!(session.move_piece(id, Position::new(3.0, 3.0)), Ok(false));
    }

    #[test]
    fn test_unknown_piece_is_reported() {
        let (mut session, _queue) = started(PuzzleType::Jigsaw, Difficulty::Easy);
        assert_eq!(
            session.attempt_placement(PieceId(999), Position::default()),
            Err(SessionError::InvalidPieceId(PieceId(999)))
        );
        assert_eq!(
            session.move_piece(PieceId(999), Position::default()),
            Err(SessionError::InvalidPieceId(PieceId(999)))
        );
        assert_eq!(session.total_placements(), 0);
    }

    #[test]
    fn test_calls_before_start_are_ignored() {
        let (mut session, queue) = standard_session(SessionConfig::new(
            PuzzleType::Jigsaw,
            Difficulty::Easy,
        ));
        assert_eq!(
            session.attempt_placement(PieceId(0), Position::default()),
            Ok(PlacementOutcome::NoOp(NoOpReason::NotStarted))
        );
        assert_eq!(session.use_hint(), HintOutcome::NoOp(NoOpReason::NotStarted));
        assert_eq!(session.tick(Duration::from_secs(1)), SessionState::NotStarted);
        assert_eq!(session.accuracy(), 1.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_completed_session_is_terminal() {
        let (mut session, queue) = started(PuzzleType::Jigsaw, Difficulty::Easy);
        for id in piece_ids(&session) {
            place_correctly(&mut session, id);
        }
        assert_eq!(session.state(), SessionState::Completed);
        let elapsed = session.elapsed();
        queue.drain();

        assert_eq!(session.tick(Duration::from_secs(10)), SessionState::Completed);
        assert_eq!(session.elapsed(), elapsed);
        assert_eq!(
            session.attempt_placement(PieceId(0), Position::default()),
            Ok(PlacementOutcome::NoOp(NoOpReason::SessionTerminal))
        );
        assert_eq!(session.use_hint(), HintOutcome::NoOp(NoOpReason::SessionTerminal));
        assert!(!session.pause());
        assert_eq!(session.correct_placements(), session.piece_count());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_final_placement_event_order() {
        let (mut session, queue) = started(PuzzleType::NumberSequence, Difficulty::Easy);
        let ids = piece_ids(&session);
        place_correctly(&mut session, ids[0]);
        place_correctly(&mut session, ids[1]);
        queue.drain();

        place_correctly(&mut session, ids[2]);
        let events = queue.drain();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            SessionEvent::CorrectPlacement { correct: 3, .. }
        ));
        assert_eq!(
            events[1],
            SessionEvent::ProgressUpdate {
                correct: 3,
                piece_count: 3
            }
        );
        assert!(matches!(events[2], SessionEvent::PuzzleComplete(_)));
    }

    #[test]
    fn test_hints_are_capped() {
        let (mut session, queue) = started(PuzzleType::Jigsaw, Difficulty::Normal);
        let max = session.max_hints();
        assert_eq!(max, 3);

        for used in 1..=max {
            let outcome = session.use_hint();
            assert!(matches!(outcome, HintOutcome::Given { remaining, .. } if remaining == max - used));
        }
        assert!(!session.can_use_hint());
        assert_eq!(session.use_hint(), HintOutcome::NoOp(NoOpReason::HintsExhausted));
        assert_eq!(session.hints_used(), max);

        let hint_events = queue
            .drain()
            .into_iter()
            .filter(|event| matches!(event, SessionEvent::HintUsed { .. }))
            .count();
        assert_eq!(hint_events, max as usize);
    }

    #[test]
    fn test_hint_targets_first_unplaced_piece() {
        let (mut session, _queue) = started(PuzzleType::ShapeMatching, Difficulty::Easy);
        let ids = piece_ids(&session);

        let first = session.use_hint();
        assert_eq!(
            first,
            HintOutcome::Given {
                piece: ids[0],
                target: session.solution().target_for(ids[0]).unwrap(),
                remaining: 4,
            }
        );
        assert!(!session.piece(ids[0]).unwrap().is_placed());

        place_correctly(&mut session, ids[0]);
        match session.use_hint() {
            HintOutcome::Given { piece, .. } => assert_eq!(piece, ids[1]),
            other => panic!("expected a hint, got {:?}", other),
        }
    }

    #[test]
    fn test_hints_disabled_for_expert() {
        let (mut session, queue) = started(PuzzleType::ShapeMatching, Difficulty::Expert);
        assert!(!session.can_use_hint());
        assert_eq!(session.use_hint(), HintOutcome::NoOp(NoOpReason::HintsDisabled));
        assert_eq!(session.hints_used(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_hint_cost_shows_in_reward() {
        let (mut session, _queue) = started(PuzzleType::Jigsaw, Difficulty::Easy);
        session.use_hint();
        session.use_hint();
        for id in piece_ids(&session) {
            place_correctly(&mut session, id);
        }
        let result = session.completion().unwrap();
        assert_eq!(result.hints_used, 2);
        // base + accuracy + time; no no-hints star
        assert_eq!(result.stars_earned, 3);
        assert_eq!(result.coins_earned, 10 + 20 + 15 - 10);
    }

    #[test]
    fn test_color_sorting_by_attribute() {
        let (mut session, _queue) = started(PuzzleType::ColorSorting, Difficulty::Medium);
        let bin_for = |session: &PuzzleSession, piece: PieceId| {
            let piece = session.piece(piece).unwrap();
            session
                .targets()
                .iter()
                .find(|target| target.can_accept(piece))
                .map(|target| (target.id, target.position))
                .unwrap()
        };

        let ids = piece_ids(&session);
        match session.use_hint() {
            HintOutcome::Given { piece, target, .. } => {
                assert_eq!(piece, ids[0]);
                assert_eq!(target, bin_for(&session, ids[0]).0);
            }
            other => panic!("expected a hint, got {:?}", other),
        }
        assert_eq!(session.hints_used(), 1);
        assert!(session.solution().target_for(ids[0]).is_none());

        // pieces 0 and 4 share a color, so they share a bin
        let (_, red_bin) = bin_for(&session, ids[0]);
        assert!(session.attempt_placement(ids[0], red_bin).unwrap().is_accepted());
        assert!(session.attempt_placement(ids[4], red_bin).unwrap().is_accepted());

        let (_, blue_bin) = bin_for(&session, ids[1]);
        assert!(matches!(
            session.attempt_placement(ids[2], blue_bin).unwrap(),
            PlacementOutcome::Rejected { .. }
        ));

        for id in ids {
            let (_, bin) = bin_for(&session, id);
            session.attempt_placement(id, bin).unwrap();
        }
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.wrong_attempts(), 1);
    }

    #[test]
    fn test_accept_any_target() {
        let layout = PuzzleLayout::new(
            vec![Piece::new(
                PieceId(0),
                Attributes::new().with(AttributeKey::Color, AttributeValue::Color(PieceColor::Cyan)),
                Position::new(0.0, 3.0),
            )],
            vec![Target::new(TargetId(7), Acceptance::Any, Position::new(0.0, 0.0))],
            SolutionMap::new(),
        );
        let (emitter, _observer) = Channel::new();
        let mut session = PuzzleSession::new(
            SessionConfig::new(PuzzleType::ColorSorting, Difficulty::Easy),
            Box::new(FixedLayout(layout)),
            emitter,
        );
        session.start().unwrap();

        let outcome = session
            .attempt_placement(PieceId(0), Position::new(0.2, 0.1))
            .unwrap();
        assert!(matches!(
            outcome,
            PlacementOutcome::Accepted {
                target: TargetId(7),
                completion: Some(_)
            }
        ));
    }

    #[test]
    fn test_hint_not_spent_when_nothing_accepts_piece() {
        let layout = PuzzleLayout::new(
            vec![Piece::new(
                PieceId(0),
                Attributes::new().with(AttributeKey::Color, AttributeValue::Color(PieceColor::Cyan)),
                Position::new(0.0, 3.0),
            )],
            vec![Target::accepting(
                TargetId(0),
                Attributes::new().with(AttributeKey::Color, AttributeValue::Color(PieceColor::Red)),
                Position::new(0.0, 0.0),
            )],
            SolutionMap::new(),
        );
        let (emitter, observer) = Channel::new();
        let queue = EventQueue::attach(&observer);
        let mut session = PuzzleSession::new(
            SessionConfig::new(PuzzleType::ColorSorting, Difficulty::Easy),
            Box::new(FixedLayout(layout)),
            emitter,
        );
        session.start().unwrap();
        queue.drain();

        assert_eq!(session.use_hint(), HintOutcome::NoOp(NoOpReason::NothingToHint));
        assert_eq!(session.hints_used(), 0);
        assert_eq!(session.hints_remaining(), 5);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_invalid_layout_is_rejected() {
        let (emitter, _observer) = Channel::new();
        let mut session = PuzzleSession::new(
            SessionConfig::new(PuzzleType::Jigsaw, Difficulty::Easy),
            Box::new(FixedLayout(PuzzleLayout::default())),
            emitter,
        );
        assert_eq!(
            session.start(),
            Err(SessionError::InvalidLayout(crate::model::LayoutError::NoPieces))
        );
        assert_eq!(session.state(), SessionState::NotStarted);
    }

    #[test]
    fn test_times_out() {
        let (mut session, queue) = started(PuzzleType::Jigsaw, Difficulty::Easy);
        assert_eq!(session.tick(Duration::from_secs(299)), SessionState::Running);
        assert_eq!(session.time_remaining(), Some(Duration::from_secs(1)));

        assert_eq!(session.tick(Duration::from_secs(2)), SessionState::TimedOut);
        assert_eq!(session.time_remaining(), Some(Duration::ZERO));
        assert!(session.completion().is_none());

        let events = queue.drain();
        assert_eq!(events.last(), Some(&SessionEvent::TimedOut));

        let id = piece_ids(&session)[0];
        assert_eq!(
            place_correctly(&mut session, id),
            PlacementOutcome::NoOp(NoOpReason::SessionTerminal)
        );
        assert_eq!(session.tick(Duration::from_secs(1)), SessionState::TimedOut);
    }

    #[test]
    fn test_untimed_session_counts_up() {
        let (mut session, queue) = standard_session(
            SessionConfig::new(PuzzleType::Jigsaw, Difficulty::Expert).untimed(),
        );
        session.start().unwrap();
        queue.drain();

        assert_eq!(session.tick(Duration::from_secs(1_000)), SessionState::Running);
        assert_eq!(session.time_remaining(), None);
        assert_eq!(session.elapsed(), Duration::from_secs(1_000));
        assert_eq!(
            queue.drain(),
            vec![SessionEvent::TimeUpdate {
                remaining: None,
                elapsed: Duration::from_secs(1_000)
            }]
        );

        for id in piece_ids(&session) {
            place_correctly(&mut session, id);
        }
        let result = session.completion().unwrap();
        // base + accuracy + no hints, no time star when untimed
        assert_eq!(result.stars_earned, 3);
        assert_eq!(result.coins_earned, 50 + 20);
        assert_eq!(result.completion_time, Duration::from_secs(1_000));
    }

    #[test]
    fn test_pause_blocks_everything() {
        let (mut session, queue) = started(PuzzleType::Jigsaw, Difficulty::Easy);
        assert!(session.pause());
        assert!(!session.pause());
        assert!(session.is_paused());

        session.tick(Duration::from_secs(100));
        assert_eq!(session.elapsed(), Duration::ZERO);
        let id = piece_ids(&session)[0];
        assert_eq!(
            place_correctly(&mut session, id),
            PlacementOutcome::NoOp(NoOpReason::Paused)
        );
        assert_eq!(session.use_hint(), HintOutcome::NoOp(NoOpReason::Paused));

        assert!(session.resume());
        assert!(place_correctly(&mut session, id).is_accepted());
        assert_eq!(
            queue.drain()[..2],
            [SessionEvent::Paused, SessionEvent::Resumed]
        );
    }

    #[test]
    fn test_restart_clears_progress_and_keeps_layout() {
        let (mut session, _queue) = started(PuzzleType::PatternCompletion, Difficulty::Medium);
        let layout_before: Vec<_> = session.targets().to_vec();
        let first_playthrough = session.playthrough_id();
        let id = piece_ids(&session)[0];
        place_correctly(&mut session, id);
        session.use_hint();
        session.tick(Duration::from_secs(5));

        session.restart().unwrap();

        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.correct_placements(), 0);
        assert_eq!(session.total_placements(), 0);
        assert_eq!(session.hints_used(), 0);
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert!(session.completed_pieces().is_empty());
        assert!(session.pieces().iter().all(|piece| !piece.is_placed()));
        assert_eq!(session.targets(), &layout_before[..]);
        assert_ne!(session.playthrough_id(), first_playthrough);
    }

    #[test]
    fn test_reset_returns_to_not_started() {
        let (mut session, _queue) = started(PuzzleType::Jigsaw, Difficulty::Easy);
        session.reset();
        assert_eq!(session.state(), SessionState::NotStarted);
        assert!(session.pieces().is_empty());
        assert_eq!(session.tick(Duration::from_secs(1)), SessionState::NotStarted);
        session.start().unwrap();
        assert_eq!(session.piece_count(), 3);
    }

    #[test]
    fn test_counters_stay_consistent() {
        let (mut session, _queue) = started(PuzzleType::ShapeMatching, Difficulty::Hard);
        let ids = piece_ids(&session);
        let positions: Vec<Position> = ids
            .iter()
            .map(|id| solution_position(&session, *id))
            .collect();

        // every piece tried on every slot, in order
        for id in &ids {
            for position in &positions {
                let _ = session.attempt_placement(*id, *position).unwrap();
                assert!(session.correct_placements() <= session.total_placements());
                assert!(session.correct_placements() <= session.piece_count());
                assert!((0.0..=1.0).contains(&session.accuracy()));
            }
        }
        assert_eq!(session.state(), SessionState::Completed);
    }
}
