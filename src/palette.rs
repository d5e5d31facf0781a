//! Globe colours.

use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Scale brightness; `k` is clamped to `[0, 1]`.
    pub fn dim(self, k: f64) -> Rgb {
        let k = k.clamp(0.0, 1.0);
        let f = |c: u8| (c as f64 * k).round() as u8;
        Rgb(f(self.0), f(self.1), f(self.2))
    }

    /// Linear blend toward `other`; `t = 0` is `self`.
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let f = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(f(self.0, other.0), f(self.1, other.1), f(self.2, other.2))
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Color {
        Color::Rgb { r: c.0, g: c.1, b: c.2 }
    }
}

pub const INDIGO: Rgb = Rgb(99, 102, 241);
pub const ORANGE: Rgb = Rgb(249, 115, 22);
pub const LAVENDER: Rgb = Rgb(165, 180, 255);
pub const RIPPLE: Rgb = Rgb(139, 150, 255);
pub const PARTICLE: Rgb = Rgb(220, 225, 255);
pub const STAR: Rgb = Rgb(200, 210, 255);
pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const SLATE: Rgb = Rgb(148, 163, 184);
pub const TEXT: Rgb = Rgb(226, 232, 240);

// land is brighter than a canvas fill would be; braille dots are sparse
pub const LAND: Rgb = Rgb(38, 132, 170);
pub const LAND_EDGE: Rgb = Rgb(64, 170, 205);

pub const OCEAN: Rgb = Rgb(8, 18, 38);
pub const ATMOSPHERE: Rgb = Rgb(14, 22, 56);
pub const TOOLTIP_BG: Rgb = Rgb(8, 12, 24);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim_and_mix_clamp() {
        assert_eq!(WHITE.dim(2.0), WHITE);
        assert_eq!(WHITE.dim(0.0), Rgb(0, 0, 0));
        assert_eq!(INDIGO.mix(ORANGE, 1.0), ORANGE);
        assert_eq!(Rgb(0, 0, 0).mix(Rgb(200, 100, 50), 0.5), Rgb(100, 50, 25));
    }
}
