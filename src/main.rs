use kidpuzzle::events::{Channel, EventQueue};
use kidpuzzle::game::{
    Achievements, JsonFileStore, Progression, PuzzleSession, SessionConfig, Settings,
    StandardLayoutGenerator,
};
use kidpuzzle::model::{
    HintOutcome, PieceId, PlacementOutcome, Position, RewardEvent, SessionEvent, SessionState,
};
use kidpuzzle::Destroyable;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::Duration;

const FRAME: Duration = Duration::from_micros(16_667);
const FRAMES_PER_MOVE: u32 = 45;

fn init_logging() {
    env_logger::init();
}

/// Where the autoplayer would drop `piece`: its solution slot, or the first
/// slot that takes it.
fn drop_point(session: &PuzzleSession, piece: PieceId) -> Option<Position> {
    let target = match session.solution().target_for(piece) {
        Some(target) => session.target(target),
        None => {
            let piece = session.piece(piece)?;
            session.targets().iter().find(|target| target.can_accept(piece))
        }
    };
    target.map(|target| target.position)
}

fn wrong_drop_point(session: &PuzzleSession, piece: PieceId) -> Option<Position> {
    let piece = session.piece(piece)?;
    let right = drop_point(session, piece.id)?;
    session
        .targets()
        .iter()
        .find(|target| target.position != right && !target.can_accept(piece))
        .map(|target| target.position)
}

fn next_unplaced(session: &PuzzleSession) -> Option<PieceId> {
    session
        .pieces()
        .iter()
        .find(|piece| !piece.is_placed())
        .map(|piece| piece.id)
}

/// Plays one session frame by frame until it completes or runs out of time.
/// With `clumsy` set the player asks for a hint and fumbles the first drop.
fn autoplay<F: FnMut()>(session: &mut PuzzleSession, clumsy: bool, mut end_of_frame: F) {
    let mut fumbled = !clumsy;
    if clumsy {
        if let HintOutcome::Given { piece, target, .. } = session.use_hint() {
            info!("Hint: {} goes to {:?}", piece, target);
        }
    }

    let mut frame = 0u32;
    while session.tick(FRAME) == SessionState::Running {
        frame += 1;
        if frame % FRAMES_PER_MOVE == 0 {
            if let Some(piece) = next_unplaced(session) {
                let drop = if fumbled {
                    drop_point(session, piece)
                } else {
                    fumbled = true;
                    wrong_drop_point(session, piece).or_else(|| drop_point(session, piece))
                };
                let Some(position) = drop else {
                    error!("Nowhere to put {}", piece);
                    break;
                };

                let Some(start) = session.piece(piece).map(|piece| piece.position()) else {
                    error!("Lost track of {}", piece);
                    break;
                };
                if let Err(err) = session.move_piece(piece, position) {
                    warn!("Could not drag {}: {}", piece, err);
                }
                match session.attempt_placement(piece, position) {
                    Ok(PlacementOutcome::Rejected { .. }) => {
                        debug!("{} bounced back", piece);
                        if let Err(err) = session.move_piece(piece, start) {
                            warn!("Could not return {}: {}", piece, err);
                        }
                    }
                    Ok(outcome) => debug!("{} -> {:?}", piece, outcome),
                    Err(err) => {
                        error!("Placement failed: {}", err);
                        break;
                    }
                }
            }
        }
        end_of_frame();
    }
    end_of_frame();
}

fn main() {
    init_logging();

    let settings = Settings::load();
    let config = SessionConfig::from_settings(&settings);
    let generator = match Settings::seed_from_env() {
        Some(seed) => StandardLayoutGenerator::with_seed(seed),
        None => StandardLayoutGenerator::new(),
    };

    let (emitter, observer) = Channel::new();
    observer.subscribe(|event: &SessionEvent| match event {
        SessionEvent::TimeUpdate { .. } => (),
        SessionEvent::PuzzleComplete(result) => info!(
            "Completed in {:.1}s with {} stars",
            result.completion_time.as_secs_f64(),
            result.stars_earned
        ),
        other => info!("{:?}", other),
    });
    let mut queue = EventQueue::attach(&observer);

    let store_path = JsonFileStore::default_path()
        .unwrap_or_else(|| PathBuf::from("kidpuzzle-progress.json"));
    let progression =
        Progression::with_total_levels(JsonFileStore::open(store_path), settings.total_levels);

    let (reward_emitter, reward_observer) = Channel::new();
    reward_observer.subscribe(|event: &RewardEvent| match event {
        RewardEvent::AchievementUnlocked(achievement) => {
            println!("Achievement unlocked: {}!", achievement.title())
        }
        RewardEvent::DailyRewardClaimed { day, reward } => {
            println!("Day {} reward: {:?}", day, reward)
        }
        other => debug!("{:?}", other),
    });
    let mut achievements = Achievements::new(progression, reward_emitter);
    if let Err(err) = achievements.claim_daily_reward() {
        warn!("Could not claim daily reward: {}", err);
    }

    let mut session = PuzzleSession::new(config, Box::new(generator), emitter);
    if let Err(err) = session.start() {
        error!("Could not start puzzle: {}", err);
        std::process::exit(1);
    }

    println!(
        "Level {}: {:?} on {} ({} pieces)",
        achievements.progression().current_level(),
        session.puzzle_type(),
        session.difficulty(),
        session.piece_count()
    );

    autoplay(&mut session, Settings::is_debug_mode(), || {
        queue.dispatch(&mut achievements);
    });
    queue.destroy();

    match session.completion() {
        Some(result) => println!(
            "Stars: {}  Coins: {}  Accuracy: {:.0}%  Time: {:.1}s  Hints: {}  Mistakes: {}",
            result.stars_earned,
            result.coins_earned,
            result.accuracy * 100.0,
            result.completion_time.as_secs_f64(),
            result.hints_used,
            result.wrong_attempts
        ),
        None => println!(
            "Out of time with {}/{} pieces placed",
            session.correct_placements(),
            session.piece_count()
        ),
    }
    let progression = achievements.progression();
    println!(
        "Total stars: {}  Total coins: {}  Next level: {}/{}",
        progression.total_stars(),
        progression.total_coins(),
        progression.current_level(),
        progression.total_levels()
    );
}
