//! In-memory sample buffer
//!
//! Samples are kept in arrival order until the controller fetches them.
//! There is no capacity limit; a recording session is bounded by the
//! controller fetching regularly.

use crate::codec::{Field, Sample};

/// FIFO accumulation of decoded samples
#[derive(Debug, Default)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
    /// Samples appended since creation
    total_appended: u64,
    /// Non-empty fetches served
    fetches: u64,
    /// Largest depth seen between fetches
    high_water: usize,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample at the tail
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
        self.total_appended += 1;
        self.high_water = self.high_water.max(self.samples.len());
    }

    /// Take every buffered sample, leaving the buffer empty
    ///
    /// Fetch and clear happen under the same exclusive borrow, so no append
    /// can land between them.
    pub fn take_all(&mut self) -> Vec<Sample> {
        let samples = std::mem::take(&mut self.samples);
        if !samples.is_empty() {
            self.fetches += 1;
        }
        samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Get statistics
    pub fn stats(&self) -> SampleBufferStats {
        SampleBufferStats {
            depth: self.samples.len(),
            high_water: self.high_water,
            total_appended: self.total_appended,
            fetches: self.fetches,
        }
    }
}

/// Render samples as consecutive `name:value` blocks
pub fn render_samples(samples: &[Sample], layout: &[(&str, Field)]) -> String {
    let mut out = String::with_capacity(samples.len() * layout.len() * 24);
    for sample in samples {
        sample.render_into(layout, &mut out);
    }
    out
}

/// Sample buffer statistics
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBufferStats {
    pub depth: usize,
    pub high_water: usize,
    pub total_appended: u64,
    pub fetches: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SampleBuilder;

    fn sample_at(timestamp: f64) -> Sample {
        SampleBuilder::new()
            .with(Field::Timestamp, timestamp)
            .build()
            .unwrap()
    }

    #[test]
    fn test_fifo_take_all() {
        let mut buffer = SampleBuffer::new();
        for t in [3.0, 1.0, 2.0] {
            buffer.push(sample_at(t));
        }
        assert_eq!(buffer.len(), 3);

        let taken = buffer.take_all();
        let order: Vec<_> = taken.iter().map(|s| s.timestamp().unwrap()).collect();
        assert_eq!(order, vec![3.0, 1.0, 2.0]);
        assert!(buffer.is_empty());
        assert!(buffer.take_all().is_empty());
    }

    #[test]
    fn test_stats() {
        let mut buffer = SampleBuffer::new();
        buffer.push(sample_at(1.0));
        buffer.push(sample_at(2.0));
        buffer.take_all();
        buffer.push(sample_at(3.0));
        buffer.take_all();
        buffer.take_all();

        let stats = buffer.stats();
        assert_eq!(stats.depth, 0);
        assert_eq!(stats.high_water, 2);
        assert_eq!(stats.total_appended, 3);
        assert_eq!(stats.fetches, 2);
    }

    #[test]
    fn test_render_blocks() {
        let layout = [("timestamp", Field::Timestamp), ("diameter_px", Field::DiameterPx)];
        let rendered = render_samples(&[sample_at(1.0), sample_at(2.5)], &layout);

        assert_eq!(
            rendered,
            "timestamp:1.000000\ndiameter_px:-1.000000\ntimestamp:2.500000\ndiameter_px:-1.000000\n"
        );
    }
}
