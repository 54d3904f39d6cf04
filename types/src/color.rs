//! Color values and channel-space distance.

use serde::{Deserialize, Serialize};

/// An RGB color sampled from or matched against the screen.
///
/// Serialized as a 3-element array (`[r, g, b]`) to match the persisted
/// definition records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Euclidean distance in channel space.
    ///
    /// Max possible distance is ~441.7 (black to white). Tolerances in
    /// definitions are expressed on this scale.
    pub fn distance(&self, other: &Rgb) -> f32 {
        let dr = f32::from(self.0) - f32::from(other.0);
        let dg = f32::from(self.1) - f32::from(other.1);
        let db = f32::from(self.2) - f32::from(other.2);
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Rgb(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let a = Rgb(100, 100, 100);
        let b = Rgb(110, 95, 105);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn distance_examples() {
        // The worked examples from the availability rules.
        let target = Rgb(100, 100, 100);
        let close = Rgb(110, 95, 105);
        let far = Rgb(150, 150, 150);
        assert!((target.distance(&close) - 12.247).abs() < 0.01);
        assert!((target.distance(&far) - 86.602).abs() < 0.01);
        assert!(target.distance(&close) <= 20.0);
        assert!(target.distance(&far) > 20.0);
    }

    #[test]
    fn serializes_as_array() {
        let json = serde_json::to_string(&Rgb(1, 2, 3)).unwrap();
        assert_eq!(json, "[1,2,3]");
        let back: Rgb = serde_json::from_str("[255,0,128]").unwrap();
        assert_eq!(back, Rgb(255, 0, 128));
    }
}
