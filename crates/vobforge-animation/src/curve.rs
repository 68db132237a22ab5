//! Scalar keyframe curves

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

/// Keys sorted by time, linearly interpolated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationCurve {
    pub keys: Vec<Keyframe>,
}

impl AnimationCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two keys holding `value` from `start` to `end`
    pub fn constant(start: f32, end: f32, value: f32) -> Self {
        Self {
            keys: vec![
                Keyframe { time: start, value },
                Keyframe { time: end, value },
            ],
        }
    }

    pub fn add_key(&mut self, time: f32, value: f32) {
        self.keys.push(Keyframe { time, value });
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn duration(&self) -> f32 {
        match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Value at `time`, clamped to the first and last key
    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        let next = self.keys.partition_point(|k| k.time <= time);
        let (a, b) = (self.keys[next - 1], self.keys[next]);
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return a.value;
        }
        let t = (time - a.time) / span;
        a.value + (b.value - a.value) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_curve() {
        let curve = AnimationCurve::constant(0.0, 2.0 / 25.0, 1.5);
        assert_eq!(curve.len(), 2);
        assert!((curve.duration() - 0.08).abs() < 1e-6);
        assert_eq!(curve.evaluate(0.04), 1.5);
    }

    #[test]
    fn test_linear_evaluation() {
        let mut curve = AnimationCurve::new();
        curve.add_key(0.0, 0.0);
        curve.add_key(1.0, 10.0);
        curve.add_key(2.0, 0.0);
        assert!((curve.evaluate(0.5) - 5.0).abs() < 1e-6);
        assert!((curve.evaluate(1.5) - 5.0).abs() < 1e-6);
        assert_eq!(curve.evaluate(-1.0), 0.0);
        assert_eq!(curve.evaluate(9.0), 0.0);
    }

    #[test]
    fn test_empty_curve() {
        assert_eq!(AnimationCurve::new().evaluate(1.0), 0.0);
    }
}
