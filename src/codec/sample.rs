//! Normalized telemetry sample
//!
//! A [`Sample`] holds whichever recognized fields were present in one ingest
//! payload. Absent fields are `None` internally and are rendered with the
//! historical `-1.0` sentinel on the control channel.

use std::fmt::Write as _;

use crate::constants::SENTINEL;

/// Every field a decoder can extract from a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Sensor clock, in seconds
    Timestamp,
    /// Pupil diameter in image pixels (flat records)
    DiameterPx,
    /// Detection confidence of the top-level record
    Confidence,
    /// Normalized gaze position, horizontal
    GazeX,
    /// Normalized gaze position, vertical
    GazeY,
    /// Confidence of the eye-camera sub-record
    PupilConfidence,
    /// Diameter reported by the eye-camera sub-record
    PupilDiameterPx,
}

impl Field {
    pub const COUNT: usize = 7;

    pub const ALL: [Field; Field::COUNT] = [
        Field::Timestamp,
        Field::DiameterPx,
        Field::Confidence,
        Field::GazeX,
        Field::GazeY,
        Field::PupilConfidence,
        Field::PupilDiameterPx,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// One decoded telemetry record with at least one populated field
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    values: [Option<f64>; Field::COUNT],
}

impl Sample {
    /// Value of a field, if it was present on the wire
    pub fn get(&self, field: Field) -> Option<f64> {
        self.values[field.index()]
    }

    /// Value of a field, or the sentinel when absent
    pub fn value_or_sentinel(&self, field: Field) -> f64 {
        self.get(field).unwrap_or(SENTINEL)
    }

    pub fn timestamp(&self) -> Option<f64> {
        self.get(Field::Timestamp)
    }

    /// Fields that were present on the wire, in declaration order
    pub fn populated(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL
            .into_iter()
            .filter(|field| self.values[field.index()].is_some())
    }

    /// Append this sample as `name:value` lines in the given field order
    pub fn render_into(&self, layout: &[(&str, Field)], out: &mut String) {
        for (name, field) in layout {
            let _ = writeln!(out, "{}:{:.6}", name, self.value_or_sentinel(*field));
        }
    }
}

/// Accumulates extracted fields; only yields a [`Sample`] if one was set
#[derive(Debug, Clone, Default)]
pub struct SampleBuilder {
    values: [Option<f64>; Field::COUNT],
}

impl SampleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: f64) -> &mut Self {
        self.values[field.index()] = Some(value);
        self
    }

    pub fn with(mut self, field: Field, value: f64) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Finish the record; `None` when no recognized field was extracted
    pub fn build(self) -> Option<Sample> {
        if self.is_empty() {
            None
        } else {
            Some(Sample {
                values: self.values,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder_yields_nothing() {
        assert!(SampleBuilder::new().build().is_none());
    }

    #[test]
    fn test_absent_fields_use_sentinel() {
        let sample = SampleBuilder::new()
            .with(Field::Timestamp, 12.5)
            .build()
            .unwrap();

        assert_eq!(sample.timestamp(), Some(12.5));
        assert_eq!(sample.get(Field::DiameterPx), None);
        assert_eq!(sample.value_or_sentinel(Field::DiameterPx), -1.0);
        assert_eq!(sample.populated().collect::<Vec<_>>(), vec![Field::Timestamp]);
    }

    #[test]
    fn test_render_layout() {
        let sample = SampleBuilder::new()
            .with(Field::Timestamp, 1.0)
            .with(Field::DiameterPx, 5.5)
            .build()
            .unwrap();

        let mut out = String::new();
        sample.render_into(
            &[
                ("timestamp", Field::Timestamp),
                ("diameter_px", Field::DiameterPx),
                ("confidence", Field::Confidence),
            ],
            &mut out,
        );

        assert_eq!(
            out,
            "timestamp:1.000000\ndiameter_px:5.500000\nconfidence:-1.000000\n"
        );
    }
}
