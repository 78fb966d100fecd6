//! Appearance selection at spawn time

use crate::particle::Appearance;
use crate::rand::RandomSource;
use mousei_core::Color;

/// A weighted hue band; spawned colors pick a band by weight, then a hue
/// uniformly inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueBand {
    pub weight: f32,
    /// Degrees
    pub hue_min: f32,
    /// Degrees
    pub hue_max: f32,
    /// [0, 1]
    pub saturation: f32,
    /// [0, 1]
    pub lightness: f32,
}

impl HueBand {
    pub const fn new(weight: f32, hue_min: f32, hue_max: f32) -> Self {
        Self {
            weight,
            hue_min,
            hue_max,
            saturation: 0.4,
            lightness: 0.45,
        }
    }
}

/// Muted taegeuk red and blue with an occasional obangsaek gold accent
pub fn kculture_bands() -> Vec<HueBand> {
    vec![
        HueBand::new(0.45, 340.0, 355.0),
        HueBand::new(0.45, 215.0, 230.0),
        HueBand::new(0.10, 40.0, 55.0),
    ]
}

/// Where particle appearances come from
#[derive(Debug, Clone, PartialEq)]
pub enum AppearanceSource {
    /// Solid colors drawn from weighted hue bands
    Palette(Vec<HueBand>),
    /// One of `count` host-provided textures, chosen uniformly
    Textures { count: u16 },
}

impl AppearanceSource {
    /// Draw one appearance. Consumes exactly two random numbers for either
    /// source.
    pub fn sample(&self, rng: &mut impl RandomSource) -> Appearance {
        let pick = rng.next_f32();
        let detail = rng.next_f32();
        match self {
            AppearanceSource::Palette(bands) => {
                let total: f32 = bands.iter().map(|b| b.weight).sum();
                let mut target = pick * total;
                let band = bands
                    .iter()
                    .find(|b| {
                        if target < b.weight {
                            true
                        } else {
                            target -= b.weight;
                            false
                        }
                    })
                    .or(bands.last());
                match band {
                    Some(b) => {
                        let hue = b.hue_min + detail * (b.hue_max - b.hue_min);
                        Appearance::Color(Color::from_hsl(hue, b.saturation, b.lightness))
                    }
                    None => Appearance::Color(Color::WHITE),
                }
            }
            AppearanceSource::Textures { count } => {
                let index = ((pick * *count as f32) as u16).min(count.saturating_sub(1));
                Appearance::Texture(index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::ParticleRng;

    /// Replays a fixed sequence
    struct Scripted(Vec<f32>);

    impl RandomSource for Scripted {
        fn next_f32(&mut self) -> f32 {
            self.0.remove(0)
        }
    }

    #[test]
    fn weighted_band_selection() {
        let source = AppearanceSource::Palette(kculture_bands());

        let Appearance::Color(red) = source.sample(&mut Scripted(vec![0.10, 0.5])) else {
            panic!("expected color");
        };
        assert!(red.r > red.b);

        let Appearance::Color(blue) = source.sample(&mut Scripted(vec![0.60, 0.5])) else {
            panic!("expected color");
        };
        assert!(blue.b > blue.r);

        let Appearance::Color(gold) = source.sample(&mut Scripted(vec![0.95, 0.5])) else {
            panic!("expected color");
        };
        assert!(gold.r > gold.b && gold.g > gold.b);
    }

    #[test]
    fn texture_indices_cover_the_set() {
        let source = AppearanceSource::Textures { count: 9 };
        let mut rng = ParticleRng::new(11);
        let mut seen = [false; 9];
        for _ in 0..2000 {
            match source.sample(&mut rng) {
                Appearance::Texture(i) => seen[i as usize] = true,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn both_sources_consume_two_draws() {
        let mut a = Scripted(vec![0.1, 0.2, 0.3]);
        AppearanceSource::Textures { count: 4 }.sample(&mut a);
        assert_eq!(a.0, vec![0.3]);

        let mut b = Scripted(vec![0.1, 0.2, 0.3]);
        AppearanceSource::Palette(kculture_bands()).sample(&mut b);
        assert_eq!(b.0, vec![0.3]);
    }
}
