/// Append-only log of reaction latencies in milliseconds.
///
/// The running average is recomputed on every append so readers never see a stale
/// value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionSamples {
    samples: Vec<u64>,
    average: Option<f64>,
}

impl ReactionSamples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, latency_ms: u64) {
        self.samples.push(latency_ms);
        let sum: u64 = self.samples.iter().sum();
        self.average = Some(sum as f64 / self.samples.len() as f64);
    }

    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<u64> {
        self.samples.last().copied()
    }

    pub fn average(&self) -> Option<f64> {
        self.average
    }

    pub fn best(&self) -> Option<u64> {
        self.samples.iter().min().copied()
    }

    /// Population standard deviation, a consistency readout.
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.average?;
        let variance = self
            .samples
            .iter()
            .map(|&s| (s as f64 - mean).powi(2))
            .sum::<f64>()
            / self.samples.len() as f64;
        Some(variance.sqrt())
    }
}
