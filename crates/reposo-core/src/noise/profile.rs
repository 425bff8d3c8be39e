//! Noise profiles and asset-name resolution.

use core::fmt;
use core::str::FromStr;

/// Ambience shaping algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum NoiseProfile {
    /// 1/f noise.
    #[default]
    Pink = 0,
    /// 1/f² noise from a clamped integrator.
    Brown = 1,
    /// High-passed pink noise with sparse droplets.
    RainLight = 2,
    /// Dense rain with occasional thunder.
    RainHeavy = 3,
    /// Brown noise through a very slow low-pass.
    Wind = 4,
    /// Wind-like bed with a 0.1 Hz swell.
    Ocean = 5,
    /// Quiet bed with cricket chirps and frog croaks.
    Forest = 6,
    /// Band-blended pink flow with bubbles.
    River = 7,
}

// Checked in order: "heavy" and "thunder" must win over plain "rain".
const KEYWORDS: [(NoiseProfile, &[&str]); 6] = [
    (NoiseProfile::RainHeavy, &["rain_heavy", "heavy", "thunder"]),
    (NoiseProfile::RainLight, &["rain"]),
    (NoiseProfile::Wind, &["wind"]),
    (NoiseProfile::Ocean, &["ocean", "wave", "sea"]),
    (NoiseProfile::Forest, &["forest", "night", "cricket"]),
    (NoiseProfile::River, &["river", "stream", "creek"]),
];

impl NoiseProfile {
    /// Every profile.
    pub const ALL: [Self; 8] = [
        Self::Pink,
        Self::Brown,
        Self::RainLight,
        Self::RainHeavy,
        Self::Wind,
        Self::Ocean,
        Self::Forest,
        Self::River,
    ];

    /// Snake-case name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pink => "pink",
            Self::Brown => "brown",
            Self::RainLight => "rain_light",
            Self::RainHeavy => "rain_heavy",
            Self::Wind => "wind",
            Self::Ocean => "ocean",
            Self::Forest => "forest",
            Self::River => "river",
        }
    }

    /// Decode from the `repr(u8)` discriminant. Unknown values map to Pink.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Brown,
            2 => Self::RainLight,
            3 => Self::RainHeavy,
            4 => Self::Wind,
            5 => Self::Ocean,
            6 => Self::Forest,
            7 => Self::River,
            _ => Self::Pink,
        }
    }

    /// Resolve a free-text asset identifier by case-insensitive keyword match.
    ///
    /// Unmatched identifiers resolve to [`NoiseProfile::Pink`].
    ///
    /// ```rust
    /// use reposo_core::NoiseProfile;
    ///
    /// assert_eq!(NoiseProfile::from_asset_id("rain_heavy"), NoiseProfile::RainHeavy);
    /// assert_eq!(NoiseProfile::from_asset_id("Summer_Rain"), NoiseProfile::RainLight);
    /// assert_eq!(NoiseProfile::from_asset_id("lullaby"), NoiseProfile::Pink);
    /// ```
    pub fn from_asset_id(asset_id: &str) -> Self {
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| contains_ignore_case(asset_id, w)))
            .map_or(Self::Pink, |(profile, _)| *profile)
    }
}

impl fmt::Display for NoiseProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a profile name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNoiseProfileError;

impl fmt::Display for ParseNoiseProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown noise profile")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseNoiseProfileError {}

impl FromStr for NoiseProfile {
    type Err = ParseNoiseProfileError;

    /// Exact profile names only (`-` accepted for `_`). Use
    /// [`NoiseProfile::from_asset_id`] for keyword matching.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| {
                let name = p.name();
                name.len() == s.len()
                    && name
                        .bytes()
                        .zip(s.bytes())
                        .all(|(a, b)| a == b.to_ascii_lowercase() || (a == b'_' && b == b'-'))
            })
            .ok_or(ParseNoiseProfileError)
    }
}

/// Strip directories and the extension from an asset path.
///
/// `"sounds/ambience/Ocean_Waves.ogg"` becomes `"Ocean_Waves"`.
pub fn asset_id_from_path(path: &str) -> &str {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file.rfind('.') {
        Some(0) | None => file,
        Some(dot) => &file[..dot],
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let (h, n) = (haystack.as_bytes(), needle.as_bytes());
    if n.is_empty() {
        return true;
    }
    h.windows(n.len()).any(|w| w.eq_ignore_ascii_case(n))
}
