use cadence_core::SyntheticData;

/// Counter-based data source. Every call yields a new, predictable value.
#[derive(Debug, Default, Clone)]
pub struct CountingData {
    calls: u64,
}

impl CountingData {
    pub fn boxed() -> Box<dyn SyntheticData> {
        Box::new(Self::default())
    }

    fn next(&mut self) -> u64 {
        self.calls += 1;
        self.calls
    }
}

impl SyntheticData for CountingData {
    fn name(&mut self) -> String {
        format!("Artist {}", self.next())
    }

    fn word(&mut self) -> String {
        format!("album{}", self.next())
    }

    fn catch_phrase(&mut self) -> String {
        format!("Playlist number {}", self.next())
    }

    fn sentence(&mut self) -> String {
        format!("Song title {}.", self.next())
    }

    fn url(&mut self) -> String {
        format!("https://video.example/{}", self.next())
    }

    fn decimal(&mut self, _left_digits: u32, _right_digits: u32) -> f64 {
        let tick = self.next() % 9 + 1;
        tick as f64 / 2.0
    }
}
