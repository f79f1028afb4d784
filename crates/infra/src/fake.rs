//! Seeded fake-data generator for catalog entries.
//!
//! Values are drawn from small built-in vocabularies. The same seed always
//! yields the same sequence of values.

use cadence_core::SyntheticData;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bea", "Carlos", "Dana", "Elif", "Farah", "Gus", "Hana", "Ines", "Jonah", "Kemal",
    "Lena", "Marco", "Nia", "Oskar", "Priya", "Quinn", "Rosa", "Soren", "Tomas", "Uma", "Vera",
    "Wes", "Yara", "Zeb",
];

const LAST_NAMES: &[&str] = &[
    "Abara", "Bishop", "Castillo", "Dvorak", "Eriksen", "Fontaine", "Garza", "Holm", "Ivanova",
    "Jensen", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "Okafor", "Petrov", "Quist",
    "Romero", "Sato", "Tanaka", "Urban", "Vance", "Weller", "Young", "Zimmer",
];

const WORDS: &[&str] = &[
    "amber", "echo", "velvet", "harbor", "signal", "lantern", "meadow", "static", "copper",
    "orbit", "willow", "cinder", "tide", "marble", "river", "neon", "summit", "hollow", "prism",
    "ember", "canyon", "frost", "drift", "saffron", "thunder", "glass", "horizon", "ivory",
    "juniper", "kernel", "lumen", "mosaic",
];

const ADJECTIVES: &[&str] = &[
    "adaptive", "balanced", "cross-platform", "distributed", "ergonomic", "focused",
    "horizontal", "innovative", "managed", "open-source", "proactive", "reactive", "robust",
    "seamless", "synergistic", "universal", "virtual", "web-enabled",
];

const NOUNS: &[&str] = &[
    "algorithm", "archive", "capability", "circuit", "core", "framework", "groupware",
    "hierarchy", "interface", "matrix", "migration", "model", "paradigm", "portal", "protocol",
    "solution", "throughput", "workforce",
];

const DOMAINS: &[&str] = &["com", "net", "org", "io", "info", "biz"];

/// `SyntheticData` backed by a seeded `StdRng`.
#[derive(Debug, Clone)]
pub struct FakeCatalogData {
    rng: StdRng,
}

impl FakeCatalogData {
    /// Deterministic generator for `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Seeded when `seed` is given, entropy-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Boxed generator for experiment data factories.
    pub fn boxed(seed: Option<u64>) -> Box<dyn SyntheticData> {
        Box::new(Self::new(seed))
    }

    fn pick(&mut self, pool: &'static [&'static str]) -> &'static str {
        pool.choose(&mut self.rng).copied().unwrap_or_default()
    }
}

impl SyntheticData for FakeCatalogData {
    fn name(&mut self) -> String {
        format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    fn word(&mut self) -> String {
        self.pick(WORDS).to_string()
    }

    fn catch_phrase(&mut self) -> String {
        let adjective = capitalize(self.pick(ADJECTIVES));
        format!("{adjective} {} {}", self.pick(WORDS), self.pick(NOUNS))
    }

    fn sentence(&mut self) -> String {
        let count = self.rng.gen_range(4..=9);
        let words: Vec<&str> = (0..count).map(|_| self.pick(WORDS)).collect();
        format!("{}.", capitalize(&words.join(" ")))
    }

    fn url(&mut self) -> String {
        format!("https://www.{}{}.{}/", self.pick(WORDS), self.pick(NOUNS), self.pick(DOMAINS))
    }

    fn decimal(&mut self, left_digits: u32, right_digits: u32) -> f64 {
        let scale = 10_u64.saturating_pow(right_digits);
        let upper = 10_u64.saturating_pow(left_digits.saturating_add(right_digits));
        // At least one unit of the last digit keeps the value positive
        let raw = self.rng.gen_range(1..upper.max(2));
        raw as f64 / scale as f64
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
