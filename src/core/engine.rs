use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_core::RngCore;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::core::command::Command;
use crate::core::game::{GameState, GameStatus, GuessError, Notice, Snapshot};
use crate::core::rules::LevelSpec;

/// Owns the session state and applies every game rule.
///
/// Each command replaces the state wholesale and returns the new [`Snapshot`].
/// Observers obtained from [`GameEngine::subscribe`] are woken only when the
/// snapshot actually changed.
pub struct GameEngine<R = StdRng> {
    state: GameState,
    rng: R,
    updates: watch::Sender<Snapshot>,
}

impl GameEngine<StdRng> {
    /// Engine seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Reproducible engine, for tests and `--seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for GameEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> GameEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        let state = GameState::default();
        let (updates, _) = watch::channel(state.snapshot());
        Self { state, rng, updates }
    }

    /// Last-value receiver; starts out having seen the current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn apply(&mut self, command: Command) -> Snapshot {
        match command {
            Command::Start => self.start_game(),
            Command::Guess(input) => self.on_guess(&input),
            Command::Hint(input) => self.on_hint(input.as_deref()),
            Command::NextLevel => self.go_next_level(),
            Command::Restart => self.restart_game(),
        }
    }

    pub fn start_game(&mut self) -> Snapshot {
        self.start_level(1)
    }

    pub fn restart_game(&mut self) -> Snapshot {
        info!(from_level = self.state.level, "restarting game");
        self.start_level(1)
    }

    /// Callers only do this after a win; the engine does not check.
    pub fn go_next_level(&mut self) -> Snapshot {
        self.start_level(self.state.level.saturating_add(1))
    }

    pub fn on_guess(&mut self, input: &str) -> Snapshot {
        if self.state.status != GameStatus::Running {
            debug!(status = ?self.state.status, "guess ignored, no level running");
            return self.snapshot();
        }

        let guess = match self.validate(input) {
            Ok(guess) => guess,
            Err(error) => {
                debug!(%error, input, "guess rejected");
                let next = GameState {
                    error: Some(error),
                    ..self.state.clone()
                };
                return self.replace(next);
            }
        };

        let current = &self.state;
        let next = if guess == current.target {
            info!(level = current.level, target = current.target, "level won");
            GameState {
                notice: Notice::Won { target: current.target },
                status: GameStatus::Won,
                error: None,
                ..current.clone()
            }
        } else {
            let remaining = current.remaining_chances.saturating_sub(1);
            if remaining == 0 {
                info!(level = current.level, target = current.target, "level lost");
                GameState {
                    remaining_chances: 0,
                    notice: Notice::Lost { target: current.target },
                    status: GameStatus::Lost,
                    error: None,
                    ..current.clone()
                }
            } else {
                let notice = if guess > current.target {
                    Notice::TooHigh
                } else {
                    Notice::TooLow
                };
                debug!(guess, remaining, "wrong guess");
                GameState {
                    remaining_chances: remaining,
                    notice,
                    error: None,
                    ..current.clone()
                }
            }
        };
        self.replace(next)
    }

    /// A hint costs one chance and is refused when it would use up the last one.
    pub fn on_hint(&mut self, input: Option<&str>) -> Snapshot {
        if self.state.status != GameStatus::Running {
            debug!(status = ?self.state.status, "hint ignored, no level running");
            return self.snapshot();
        }

        let current = &self.state;
        if current.remaining_chances <= 1 {
            debug!("hint refused, last chance");
            let next = GameState {
                notice: Notice::HintsUnavailable,
                error: None,
                ..current.clone()
            };
            return self.replace(next);
        }

        let notice = match input.and_then(|text| parse_number(text).ok()) {
            None => Notice::HintNeedsNumber,
            Some(reference) if i64::from(reference) > i64::from(current.target) => {
                Notice::HintLower { reference }
            }
            Some(reference) => Notice::HintHigher { reference },
        };
        debug!(?notice, remaining = current.remaining_chances - 1, "hint given");
        let next = GameState {
            remaining_chances: current.remaining_chances - 1,
            notice,
            error: None,
            ..current.clone()
        };
        self.replace(next)
    }

    fn start_level(&mut self, level: u32) -> Snapshot {
        let spec = LevelSpec::for_level(level);
        let target = self.rng.random_range(1..=spec.range_max);
        info!(
            level = spec.level,
            range_max = spec.range_max,
            chances = spec.chances,
            "level started"
        );
        self.replace(GameState {
            level: spec.level,
            target,
            range_max: spec.range_max,
            remaining_chances: spec.chances,
            notice: Notice::NewRound {
                range_max: spec.range_max,
            },
            status: GameStatus::Running,
            error: None,
        })
    }

    fn validate(&self, input: &str) -> Result<u32, GuessError> {
        let number = parse_number(input)?;
        match u32::try_from(number) {
            Ok(guess) if (1..=self.state.range_max).contains(&guess) => Ok(guess),
            _ => Err(GuessError::OutOfRange),
        }
    }

    fn replace(&mut self, next: GameState) -> Snapshot {
        self.state = next;
        let snapshot = self.state.snapshot();
        self.updates.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });
        snapshot
    }
}

/// Signed 32-bit parse: `-3` is a number (and out of range), `3000000000` is not.
/// Surrounding whitespace makes the text invalid.
fn parse_number(input: &str) -> Result<i32, GuessError> {
    input.parse::<i32>().map_err(|_| GuessError::InvalidInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(seed: u64) -> GameEngine {
        let mut engine = GameEngine::seeded(seed);
        engine.start_game();
        engine
    }

    fn wrong_guess(engine: &GameEngine) -> String {
        let target = engine.state.target;
        let wrong = if target == 1 { 2 } else { 1 };
        wrong.to_string()
    }

    #[test]
    fn new_engine_is_idle_until_started() {
        let mut engine = GameEngine::seeded(1);
        assert_eq!(engine.snapshot().status, GameStatus::Idle);

        let snap = engine.start_game();
        assert_eq!(snap.status, GameStatus::Running);
        assert_eq!(snap.level, 1);
        assert_eq!(snap.range_max, 10);
        assert_eq!(snap.remaining_chances, 4);
        assert_eq!(snap.error, None);
        assert_eq!(snap.revealed, None);
        assert!((1..=10).contains(&engine.state.target));
    }

    #[test]
    fn commands_before_start_do_nothing() {
        let mut engine = GameEngine::seeded(1);
        let before = engine.state.clone();
        engine.on_guess("5");
        engine.on_hint(Some("5"));
        assert_eq!(engine.state, before);
    }

    #[test]
    fn invalid_text_is_rejected_without_touching_state() {
        let mut engine = running(2);
        let before = engine.state.clone();

        for input in ["abc", "", "  ", " 5", "5 ", "1.5", "3000000000", "0x5"] {
            let snap = engine.on_guess(input);
            assert_eq!(snap.error, Some(GuessError::InvalidInput), "input {input:?}");
            assert_eq!(engine.state.level, before.level);
            assert_eq!(engine.state.target, before.target);
            assert_eq!(engine.state.range_max, before.range_max);
            assert_eq!(engine.state.remaining_chances, before.remaining_chances);
            assert_eq!(engine.state.status, GameStatus::Running);
            assert_eq!(engine.state.notice, before.notice);
        }
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut engine = running(3);
        let chances = engine.state.remaining_chances;
        for input in ["0", "11", "15", "-3"] {
            let snap = engine.on_guess(input);
            assert_eq!(snap.error, Some(GuessError::OutOfRange), "input {input:?}");
            assert_eq!(snap.remaining_chances, chances);
        }
    }

    #[test]
    fn valid_guess_clears_error() {
        let mut engine = running(4);
        engine.on_guess("nope");
        let guess = wrong_guess(&engine);
        let snap = engine.on_guess(&guess);
        assert_eq!(snap.error, None);
    }

    #[test]
    fn correct_guess_wins_and_reveals() {
        let mut engine = running(5);
        let target = engine.state.target;
        let snap = engine.on_guess(&target.to_string());
        assert_eq!(snap.status, GameStatus::Won);
        assert_eq!(snap.revealed, Some(target));
        assert_eq!(snap.message, Notice::Won { target }.to_string());
        assert_eq!(snap.remaining_chances, 4);
    }

    #[test]
    fn correct_guess_on_last_chance_still_wins() {
        let mut engine = running(6);
        engine.state.remaining_chances = 1;
        let target = engine.state.target;
        let snap = engine.on_guess(&target.to_string());
        assert_eq!(snap.status, GameStatus::Won);
        assert_eq!(snap.remaining_chances, 1);
    }

    #[test]
    fn wrong_guesses_report_direction() {
        let mut engine = running(7);
        engine.state.target = 5;
        let snap = engine.on_guess("8");
        assert_eq!(snap.message, Notice::TooHigh.to_string());
        assert_eq!(snap.remaining_chances, 3);
        let snap = engine.on_guess("2");
        assert_eq!(snap.message, Notice::TooLow.to_string());
        assert_eq!(snap.remaining_chances, 2);
        assert_eq!(snap.status, GameStatus::Running);
    }

    #[test]
    fn running_out_of_chances_loses() {
        let mut engine = running(8);
        let target = engine.state.target;
        let wrong = wrong_guess(&engine);
        let mut snap = engine.snapshot();
        for _ in 0..4 {
            snap = engine.on_guess(&wrong);
        }
        assert_eq!(snap.status, GameStatus::Lost);
        assert_eq!(snap.remaining_chances, 0);
        assert_eq!(snap.revealed, Some(target));
        assert_eq!(snap.message, Notice::Lost { target }.to_string());

        // terminal: further guesses are ignored
        let after = engine.on_guess(&target.to_string());
        assert_eq!(after.status, GameStatus::Lost);
    }

    #[test]
    fn hint_costs_a_chance_and_points_the_way() {
        let mut engine = running(9);
        engine.state.target = 6;

        let snap = engine.on_hint(Some("9"));
        assert_eq!(snap.message, Notice::HintLower { reference: 9 }.to_string());
        assert_eq!(snap.remaining_chances, 3);

        let snap = engine.on_hint(Some("2"));
        assert_eq!(snap.message, Notice::HintHigher { reference: 2 }.to_string());
        assert_eq!(snap.remaining_chances, 2);
        assert_eq!(snap.status, GameStatus::Running);
        assert_eq!(engine.state.target, 6);
    }

    #[test]
    fn hint_without_number_still_costs_a_chance() {
        let mut engine = running(10);
        let snap = engine.on_hint(None);
        assert_eq!(snap.message, Notice::HintNeedsNumber.to_string());
        assert_eq!(snap.remaining_chances, 3);

        let snap = engine.on_hint(Some("xyz"));
        assert_eq!(snap.message, Notice::HintNeedsNumber.to_string());
        assert_eq!(snap.remaining_chances, 2);
    }

    #[test]
    fn hint_refused_on_last_chance() {
        let mut engine = running(11);
        engine.state.remaining_chances = 1;
        engine.on_guess("zzz");
        let snap = engine.on_hint(Some("3"));
        assert_eq!(snap.message, Notice::HintsUnavailable.to_string());
        assert_eq!(snap.remaining_chances, 1);
        assert_eq!(snap.status, GameStatus::Running);
        assert_eq!(snap.error, None);
    }

    #[test]
    fn next_level_widens_range() {
        let mut engine = running(12);
        let target = engine.state.target;
        engine.on_guess(&target.to_string());

        let snap = engine.go_next_level();
        assert_eq!(snap.level, 2);
        assert_eq!(snap.range_max, 15);
        assert_eq!(snap.status, GameStatus::Running);
        assert_eq!(snap.message, Notice::NewRound { range_max: 15 }.to_string());
        assert!((1..=15).contains(&engine.state.target));
    }

    #[test]
    fn restart_returns_to_level_one() {
        let mut engine = running(13);
        engine.go_next_level();
        engine.go_next_level();
        assert_eq!(engine.state.level, 3);

        let snap = engine.restart_game();
        assert_eq!(snap.level, 1);
        assert_eq!(snap.range_max, 10);
        assert_eq!(snap.remaining_chances, 4);
        assert_eq!(snap.status, GameStatus::Running);
    }

    #[test]
    fn targets_stay_in_range_across_levels() {
        let mut engine = running(14);
        for _ in 0..40 {
            let state = engine.state();
            assert!((1..=state.range_max).contains(&state.target));
            engine.go_next_level();
        }
        assert_eq!(engine.state.range_max, crate::core::rules::MAX_RANGE);
    }

    #[test]
    fn same_seed_same_targets() {
        let mut a = running(99);
        let mut b = running(99);
        for _ in 0..5 {
            assert_eq!(a.state.target, b.state.target);
            a.go_next_level();
            b.go_next_level();
        }
    }

    #[test]
    fn subscribers_see_changes_only() {
        let mut engine = GameEngine::seeded(15);
        let mut rx = engine.subscribe();
        assert!(!rx.has_changed().unwrap());

        engine.start_game();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status, GameStatus::Running);

        engine.on_guess("abc");
        assert!(rx.has_changed().unwrap());
        let _ = rx.borrow_and_update();

        // identical rejection publishes nothing new
        engine.on_guess("abc");
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn apply_dispatches_commands() {
        let mut engine = GameEngine::seeded(16);
        assert_eq!(engine.apply(Command::Start).status, GameStatus::Running);
        assert_eq!(
            engine.apply(Command::Guess("abc".into())).error,
            Some(GuessError::InvalidInput)
        );
        assert_eq!(engine.apply(Command::Hint(None)).remaining_chances, 3);
        assert_eq!(engine.apply(Command::NextLevel).level, 2);
        assert_eq!(engine.apply(Command::Restart).level, 1);
    }
}
