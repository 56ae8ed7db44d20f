use std::time::Duration;

use crate::util::Jitter;

/// Chance that a space is followed by an extra hesitation.
const HESITATION_CHANCE: f64 = 0.1;

/// Keystroke timing for one typing run. Values are already clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct TypingConfig {
    pub words_per_minute: u32,
    /// Per-character typo probability in `[0, 1]`.
    pub typo_rate: f64,
    pub pause_after_comma: Duration,
    pub pause_after_period: Duration,
    /// Upper bound of the occasional hesitation after a space.
    pub random_hesitation: Duration,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 120,
            typo_rate: 0.0,
            pause_after_comma: Duration::from_millis(500),
            pause_after_period: Duration::from_millis(1000),
            random_hesitation: Duration::from_millis(500),
        }
    }
}

impl TypingConfig {
    /// `60 / (wpm * 6)` seconds: a five-letter word plus a space per "word".
    pub fn base_delay(&self) -> Duration {
        let chars_per_second = f64::from(self.words_per_minute.max(1)) * 6.0 / 60.0;
        Duration::from_secs_f64(1.0 / chars_per_second)
    }

    /// Pause after pressing `c`: the base delay with ±20% variation, plus
    /// punctuation pauses and the occasional hesitation after a space.
    pub fn delay_after(&self, c: char, rng: &mut Jitter) -> Duration {
        let mut delay = self.base_delay().mul_f64(rng.between(0.8, 1.2));
        match c {
            ',' => delay += self.pause_after_comma,
            '.' => delay += self.pause_after_period,
            ' ' if rng.chance(HESITATION_CHANCE) => {
                delay += self.random_hesitation.mul_f64(rng.unit());
            }
            _ => {}
        }
        delay
    }

    /// Delay after the wrong key, before the corrective Backspace.
    pub fn typo_notice(&self) -> Duration {
        self.base_delay() * 2
    }

    /// Delay after the Backspace, before the correct key.
    pub fn typo_recover(&self) -> Duration {
        self.base_delay().mul_f64(1.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_delay_at_120_wpm() {
        let config = TypingConfig::default();
        let ms = config.base_delay().as_secs_f64() * 1000.0;
        assert!((ms - 83.333).abs() < 0.01);
    }

    #[test]
    fn letters_vary_within_twenty_percent() {
        let config = TypingConfig::default();
        let base = config.base_delay();
        let mut rng = Jitter::seeded(4);
        for _ in 0..200 {
            let d = config.delay_after('a', &mut rng);
            assert!(d >= base.mul_f64(0.8) && d <= base.mul_f64(1.2));
        }
    }

    #[test]
    fn punctuation_adds_pause() {
        let config = TypingConfig::default();
        let mut rng = Jitter::seeded(4);
        assert!(config.delay_after(',', &mut rng) >= Duration::from_millis(500));
        assert!(config.delay_after('.', &mut rng) >= Duration::from_millis(1000));
    }

    #[test]
    fn hesitation_is_bounded() {
        let config = TypingConfig::default();
        let ceiling = config.base_delay().mul_f64(1.2) + config.random_hesitation;
        let mut rng = Jitter::seeded(8);
        let mut hesitated = false;
        for _ in 0..500 {
            let d = config.delay_after(' ', &mut rng);
            assert!(d <= ceiling);
            hesitated |= d > config.base_delay().mul_f64(1.2);
        }
        assert!(hesitated);
    }

    #[test]
    fn zero_wpm_does_not_divide_by_zero() {
        let config = TypingConfig {
            words_per_minute: 0,
            ..TypingConfig::default()
        };
        assert_eq!(config.base_delay(), Duration::from_secs(10));
    }
}
