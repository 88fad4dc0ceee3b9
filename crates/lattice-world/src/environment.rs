//! Time of day and weather.

use std::f64::consts::PI;

pub const TICKS_PER_DAY: i64 = 24_000;

/// Global environment state of a world.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldEnvironment {
    /// Time of day in ticks. Negative values freeze the daylight cycle at
    /// their absolute value.
    pub time: i64,
    /// Total ticks the world has existed.
    pub age: i64,
    /// Rain strength, 0 to 1.
    pub rain: f32,
    /// Thunder strength, 0 to 1.
    pub thunder: f32,
    pub hardcore: bool,
}

impl WorldEnvironment {
    /// One world tick. A frozen (negative) time does not advance.
    pub fn advance(&mut self) {
        self.age += 1;
        if self.time >= 0 {
            self.time += 1;
        }
    }

    /// Sun position in `0..1`; 0 at noon, 0.5 at midnight.
    pub fn sky_angle(&self) -> f64 {
        let day = self.time.unsigned_abs() as f64 / TICKS_PER_DAY as f64 - 0.25;
        let fraction = day - day.floor();
        let angle = 0.5 - (fraction * PI).cos() / 2.0;
        (fraction * 2.0 + angle) / 3.0
    }

    /// Brightness multiplier for sky light, `0.2..=1.0`.
    pub fn light_base(&self) -> f64 {
        let mut base = 1.0 - ((self.sky_angle() * 2.0 * PI).cos() * 2.0 + 0.2);
        base = 1.0 - base.clamp(0.0, 1.0);
        let rain = f64::from(self.rain);
        let thunder = f64::from(self.thunder);
        base *= 1.0 - rain * 5.0 / 16.0;
        base *= 1.0 - thunder * rain * 5.0 / 16.0;
        base * 0.8 + 0.2
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn at(time: i64) -> WorldEnvironment {
        WorldEnvironment {
            time,
            ..Default::default()
        }
    }

    #[test]
    fn test_noon_is_brightest_and_midnight_darkest() {
        let noon = at(6_000);
        let midnight = at(18_000);
        assert!(noon.sky_angle().abs() < 1e-9, "{}", noon.sky_angle());
        assert!((midnight.sky_angle() - 0.5).abs() < 1e-9);
        assert!((noon.light_base() - 1.0).abs() < 1e-9);
        assert!((midnight.light_base() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_rain_dims_daylight() {
        let clear = at(6_000);
        let rainy = WorldEnvironment { rain: 1.0, ..clear };
        let stormy = WorldEnvironment { thunder: 1.0, ..rainy };
        assert!(rainy.light_base() < clear.light_base());
        assert!(stormy.light_base() < rainy.light_base());
        assert!(stormy.light_base() >= 0.2);
    }

    #[test]
    fn test_frozen_time_does_not_advance() {
        let mut environment = at(-1_000);
        environment.advance();
        assert_eq!(environment.time, -1_000);
        assert_eq!(environment.age, 1);
        assert_eq!(environment.sky_angle(), at(1_000).sky_angle());
    }
}
