// ============================================================
// Layer 3 — Emotions Record
// ============================================================
// One value per emotion dimension, always in the same order:
//
//   love, joy, fright, anger, fear, sorrow
//
// The same record carries integer labels (u8 in 0..=3),
// normalised targets (f32 in [0,1]), raw per-head logits
// (tensors) and final predictions (f32 in [0,3]).
//
// Reference: Rust Book §10 (Generic Data Types)

/// Highest intensity an annotator can assign.
pub const MAX_INTENSITY: u8 = 3;

/// Six named values, one per emotion dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Emotions<T> {
    pub love:   T,
    pub joy:    T,
    pub fright: T,
    pub anger:  T,
    pub fear:   T,
    pub sorrow: T,
}

/// Column names in field order. Used for file headers and logs.
pub const EMOTION_NAMES: [&str; 6] = ["love", "joy", "fright", "anger", "fear", "sorrow"];

impl<T> Emotions<T> {
    pub fn from_array([love, joy, fright, anger, fear, sorrow]: [T; 6]) -> Self {
        Self { love, joy, fright, anger, fear, sorrow }
    }

    pub fn into_array(self) -> [T; 6] {
        [self.love, self.joy, self.fright, self.anger, self.fear, self.sorrow]
    }

    pub fn as_ref(&self) -> Emotions<&T> {
        Emotions {
            love:   &self.love,
            joy:    &self.joy,
            fright: &self.fright,
            anger:  &self.anger,
            fear:   &self.fear,
            sorrow: &self.sorrow,
        }
    }

    /// Apply `f` to every field in declaration order.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Emotions<U> {
        Emotions {
            love:   f(self.love),
            joy:    f(self.joy),
            fright: f(self.fright),
            anger:  f(self.anger),
            fear:   f(self.fear),
            sorrow: f(self.sorrow),
        }
    }

    /// Like `map`, stopping at the first error.
    pub fn try_map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<Emotions<U>, E> {
        Ok(Emotions {
            love:   f(self.love)?,
            joy:    f(self.joy)?,
            fright: f(self.fright)?,
            anger:  f(self.anger)?,
            fear:   f(self.fear)?,
            sorrow: f(self.sorrow)?,
        })
    }

    pub fn zip<U>(self, other: Emotions<U>) -> Emotions<(T, U)> {
        Emotions {
            love:   (self.love, other.love),
            joy:    (self.joy, other.joy),
            fright: (self.fright, other.fright),
            anger:  (self.anger, other.anger),
            fear:   (self.fear, other.fear),
            sorrow: (self.sorrow, other.sorrow),
        }
    }

    /// Pair every value with its column name.
    pub fn named(self) -> [(&'static str, T); 6] {
        let [a, b, c, d, e, f] = self.into_array();
        [
            (EMOTION_NAMES[0], a),
            (EMOTION_NAMES[1], b),
            (EMOTION_NAMES[2], c),
            (EMOTION_NAMES[3], d),
            (EMOTION_NAMES[4], e),
            (EMOTION_NAMES[5], f),
        ]
    }
}

impl Emotions<u8> {
    /// Map integer labels onto [0,1] for the sigmoid-based loss.
    pub fn normalized(self) -> Emotions<f32> {
        self.map(|v| v as f32 / MAX_INTENSITY as f32)
    }
}

impl<T: Clone> Emotions<Vec<T>> {
    /// Transpose per-emotion columns back into per-row records.
    /// Columns shorter than `love` are an invariant violation upstream;
    /// rows stop at the shortest column.
    pub fn into_rows(self) -> Vec<Emotions<T>> {
        let len = self.as_ref().into_array().iter().map(|c| c.len()).min().unwrap_or(0);
        (0..len)
            .map(|i| self.as_ref().map(|col| col[i].clone()))
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_order_matches_names() {
        let e = Emotions::from_array([0u8, 1, 2, 3, 0, 1]);
        assert_eq!(e.joy, 1);
        assert_eq!(e.anger, 3);
        let named = e.named();
        assert_eq!(named[2], ("fright", 2));
        assert_eq!(named[5], ("sorrow", 1));
    }

    #[test]
    fn test_normalized_levels_are_exact() {
        let e = Emotions::from_array([0u8, 1, 2, 3, 3, 0]).normalized();
        assert_eq!(e.love, 0.0);
        assert_eq!(e.joy, 1.0 / 3.0);
        assert_eq!(e.fright, 2.0 / 3.0);
        assert_eq!(e.anger, 1.0);
    }

    #[test]
    fn test_into_rows_transposes_columns() {
        let cols = Emotions::from_array([
            vec![1.0f32, 2.0],
            vec![3.0, 4.0],
            vec![5.0, 6.0],
            vec![7.0, 8.0],
            vec![9.0, 10.0],
            vec![11.0, 12.0],
        ]);
        let rows = cols.into_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].into_array(), [2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
    }
}
