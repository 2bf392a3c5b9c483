//! Ingest payload decoder
//!
//! Turns raw ingest payloads into [`Sample`]s. Three wire shapes are
//! supported, selected once at startup:
//!
//! - [`PayloadFormat::FlatArray`]: JSON array holding exactly one flat object
//!   (`timestamp`, `diameter`, `confidence`)
//! - [`PayloadFormat::NestedGaze`]: JSON array holding exactly one gaze object
//!   (`timestamp`, `confidence`, `norm_pos`, and a `base` array whose first
//!   element carries the eye-camera `confidence`/`diameter`)
//! - [`PayloadFormat::BinaryMap`]: a single MessagePack map with flat keys
//!
//! A missing key leaves its field absent. A present key of the wrong type is
//! skipped with a [`FieldWarning`]; the rest of the record is still read.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

use crate::codec::packed::Packed;
use crate::codec::sample::{Field, Sample, SampleBuilder};
use crate::error::DecodeError;

/// Wire shape of the ingest payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum PayloadFormat {
    FlatArray,
    #[default]
    NestedGaze,
    BinaryMap,
}

const FLAT_LAYOUT: &[(&str, Field)] = &[
    ("timestamp", Field::Timestamp),
    ("diameter_px", Field::DiameterPx),
    ("confidence", Field::Confidence),
];

const NESTED_LAYOUT: &[(&str, Field)] = &[
    ("timestamp", Field::Timestamp),
    ("gaze_confidence", Field::Confidence),
    ("gaze_norm_pos_x", Field::GazeX),
    ("gaze_norm_pos_y", Field::GazeY),
    ("pupil_confidence", Field::PupilConfidence),
    ("pupil_diameter_px", Field::PupilDiameterPx),
];

const BINARY_LAYOUT: &[(&str, Field)] = &[
    ("timestamp", Field::Timestamp),
    ("diameter_px", Field::DiameterPx),
    ("confidence", Field::Confidence),
    ("gaze_norm_pos_x", Field::GazeX),
    ("gaze_norm_pos_y", Field::GazeY),
];

impl PayloadFormat {
    /// Field names and order used when replying to `receive_data`
    pub fn reply_layout(&self) -> &'static [(&'static str, Field)] {
        match self {
            PayloadFormat::FlatArray => FLAT_LAYOUT,
            PayloadFormat::NestedGaze => NESTED_LAYOUT,
            PayloadFormat::BinaryMap => BINARY_LAYOUT,
        }
    }

    /// Topic prefix the sensor publishes this shape under
    pub fn default_topic(&self) -> &'static str {
        match self {
            PayloadFormat::FlatArray => "pupil_positions",
            PayloadFormat::NestedGaze => "gaze_positions",
            PayloadFormat::BinaryMap => "pupil.",
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadFormat::FlatArray => "flat_array",
            PayloadFormat::NestedGaze => "nested_gaze",
            PayloadFormat::BinaryMap => "binary_map",
        };
        f.write_str(name)
    }
}

/// Non-fatal problem found while extracting a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWarning {
    /// Key present, but its value has the wrong type; the field is skipped
    WrongType {
        key: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    /// `norm_pos` held neither zero nor two elements
    NormPosLength(usize),
    /// `base` held more than one element; only the first one was read
    ExtraBaseRecords(usize),
    /// The first `base` element was not an object
    BaseNotObject(&'static str),
    /// A binary map key that is not text; its entry is skipped
    NonTextKey(&'static str),
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldWarning::WrongType { key, expected, got } => {
                write!(f, "field '{}' should be {}, got {}", key, expected, got)
            }
            FieldWarning::NormPosLength(len) => write!(
                f,
                "expected zero or two elements in 'norm_pos', got {}",
                len
            ),
            FieldWarning::ExtraBaseRecords(len) => write!(
                f,
                "expected one element in 'base', got {}; only the first was read",
                len
            ),
            FieldWarning::BaseNotObject(got) => {
                write!(f, "expected an object inside 'base', got {}", got)
            }
            FieldWarning::NonTextKey(got) => write!(f, "skipping map entry with a {} key", got),
        }
    }
}

/// Result of extracting one payload, before the non-empty check
#[derive(Debug, Default)]
pub struct Extraction {
    pub fields: SampleBuilder,
    pub warnings: Vec<FieldWarning>,
}

/// Parse a payload and pull out every recognized field it carries
pub fn extract(format: PayloadFormat, payload: &[u8]) -> Result<Extraction, DecodeError> {
    let mut extraction = Extraction::default();

    match format {
        PayloadFormat::FlatArray => {
            let root: Value = serde_json::from_slice(payload)?;
            let record = single_record(&root)?;
            extraction.scalar(record, "timestamp", Field::Timestamp);
            extraction.scalar(record, "diameter", Field::DiameterPx);
            extraction.scalar(record, "confidence", Field::Confidence);
        }
        PayloadFormat::NestedGaze => {
            let root: Value = serde_json::from_slice(payload)?;
            let record = single_record(&root)?;
            extraction.scalar(record, "timestamp", Field::Timestamp);
            extraction.scalar(record, "confidence", Field::Confidence);
            extraction.norm_pos(record);
            extraction.base(record);
        }
        PayloadFormat::BinaryMap => {
            let root: Packed = rmp_serde::from_slice(payload)?;
            let entries = match root {
                Packed::Map(entries) => entries,
                other => {
                    return Err(DecodeError::UnexpectedRoot {
                        expected: "map",
                        got: other.kind(),
                    })
                }
            };
            let record = extraction.packed_record(entries);
            extraction.scalar(&record, "timestamp", Field::Timestamp);
            extraction.scalar(&record, "diameter", Field::DiameterPx);
            extraction.scalar(&record, "confidence", Field::Confidence);
            extraction.norm_pos(&record);
        }
    }

    Ok(extraction)
}

/// The text encodings wrap their record in a one-element array
fn single_record(root: &Value) -> Result<&Map<String, Value>, DecodeError> {
    let records = root.as_array().ok_or(DecodeError::UnexpectedRoot {
        expected: "array",
        got: kind_of(root),
    })?;

    match records.as_slice() {
        [record] => record.as_object().ok_or(DecodeError::UnexpectedRoot {
            expected: "object",
            got: kind_of(record),
        }),
        other => Err(DecodeError::RecordCount(other.len())),
    }
}

pub(super) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Binary map keys read by the decoder, with the type each must hold
const BINARY_KEYS: &[(&str, &str)] = &[
    ("timestamp", "number"),
    ("diameter", "number"),
    ("confidence", "number"),
    ("norm_pos", "array"),
];

impl Extraction {
    /// Keep the text-keyed entries JSON can hold; warn about recognized keys
    /// whose values it cannot
    fn packed_record(&mut self, entries: Vec<(Packed, Packed)>) -> Map<String, Value> {
        let mut record = Map::with_capacity(entries.len());
        for (key, value) in entries {
            let key = match key {
                Packed::Plain(Value::String(key)) => key,
                other => {
                    self.warnings.push(FieldWarning::NonTextKey(other.kind()));
                    continue;
                }
            };

            match value.into_json() {
                Ok(value) => {
                    record.insert(key, value);
                }
                // Unknown keys are ignored whatever they hold
                Err(got) => {
                    let known = BINARY_KEYS.iter().find(|(name, _)| *name == key.as_str());
                    if let Some(&(name, expected)) = known {
                        self.warnings.push(FieldWarning::WrongType {
                            key: name,
                            expected,
                            got,
                        });
                    }
                }
            }
        }
        record
    }

    fn scalar(&mut self, record: &Map<String, Value>, key: &'static str, field: Field) {
        let Some(value) = record.get(key) else {
            return;
        };

        match value.as_f64() {
            Some(number) => {
                self.fields.set(field, number);
            }
            None => self.warnings.push(FieldWarning::WrongType {
                key,
                expected: "number",
                got: kind_of(value),
            }),
        }
    }

    fn norm_pos(&mut self, record: &Map<String, Value>) {
        let Some(value) = record.get("norm_pos") else {
            return;
        };

        let Some(elements) = value.as_array() else {
            self.warnings.push(FieldWarning::WrongType {
                key: "norm_pos",
                expected: "array",
                got: kind_of(value),
            });
            return;
        };

        match elements.as_slice() {
            [] => {}
            [x, y] => {
                for (element, field) in [(x, Field::GazeX), (y, Field::GazeY)] {
                    match element.as_f64() {
                        Some(number) => {
                            self.fields.set(field, number);
                        }
                        None => self.warnings.push(FieldWarning::WrongType {
                            key: "norm_pos",
                            expected: "number",
                            got: kind_of(element),
                        }),
                    }
                }
            }
            other => self.warnings.push(FieldWarning::NormPosLength(other.len())),
        }
    }

    /// Eye-camera data; newer sensor software names the member `base_data`
    fn base(&mut self, record: &Map<String, Value>) {
        let Some((key, value)) = ["base", "base_data"]
            .into_iter()
            .find_map(|key| record.get(key).map(|value| (key, value)))
        else {
            return;
        };

        let Some(elements) = value.as_array() else {
            self.warnings.push(FieldWarning::WrongType {
                key,
                expected: "array",
                got: kind_of(value),
            });
            return;
        };

        if let Some(first) = elements.first() {
            match first.as_object() {
                Some(base) => {
                    self.scalar(base, "confidence", Field::PupilConfidence);
                    self.scalar(base, "diameter", Field::PupilDiameterPx);
                }
                None => self.warnings.push(FieldWarning::BaseNotObject(kind_of(first))),
            }
        }

        if elements.len() > 1 {
            self.warnings
                .push(FieldWarning::ExtraBaseRecords(elements.len()));
        }
    }
}

/// Payload decoder for one configured wire format
pub struct PayloadDecoder {
    format: PayloadFormat,
    /// Payloads that produced a sample
    payloads_decoded: u64,
    /// Payloads dropped (malformed or without recognized fields)
    payloads_rejected: u64,
    /// Fields skipped across all payloads
    field_warnings: u64,
}

impl PayloadDecoder {
    pub fn new(format: PayloadFormat) -> Self {
        Self {
            format,
            payloads_decoded: 0,
            payloads_rejected: 0,
            field_warnings: 0,
        }
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    /// Decode one payload into a sample
    ///
    /// Field warnings are logged and counted here. A payload without any
    /// recognized field is rejected with [`DecodeError::NoRecognizedFields`].
    pub fn decode(&mut self, payload: &[u8]) -> Result<Sample, DecodeError> {
        let extraction = match extract(self.format, payload) {
            Ok(extraction) => extraction,
            Err(e) => {
                self.payloads_rejected += 1;
                return Err(e);
            }
        };

        for warning in &extraction.warnings {
            warn!("Skipping field while decoding {} payload: {}", self.format, warning);
        }
        self.field_warnings += extraction.warnings.len() as u64;

        match extraction.fields.build() {
            Some(sample) => {
                self.payloads_decoded += 1;
                debug!(
                    "Decoded sample: timestamp={:?} diameter={:?}",
                    sample.timestamp(),
                    sample
                        .get(Field::DiameterPx)
                        .or(sample.get(Field::PupilDiameterPx))
                );
                Ok(sample)
            }
            None => {
                self.payloads_rejected += 1;
                Err(DecodeError::NoRecognizedFields)
            }
        }
    }

    /// Get statistics
    pub fn stats(&self) -> DecoderStats {
        DecoderStats {
            payloads_decoded: self.payloads_decoded,
            payloads_rejected: self.payloads_rejected,
            field_warnings: self.field_warnings,
        }
    }
}

/// Decoder statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecoderStats {
    pub payloads_decoded: u64,
    pub payloads_rejected: u64,
    pub field_warnings: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn decode(format: PayloadFormat, payload: &[u8]) -> Result<Sample, DecodeError> {
        PayloadDecoder::new(format).decode(payload)
    }

    #[test]
    fn test_flat_record() {
        let sample = decode(
            PayloadFormat::FlatArray,
            br#"[{"timestamp": 1.0, "diameter": 5.5}]"#,
        )
        .unwrap();

        assert_eq!(sample.timestamp(), Some(1.0));
        assert_eq!(sample.get(Field::DiameterPx), Some(5.5));
        assert_eq!(sample.get(Field::Confidence), None);
    }

    #[test]
    fn test_flat_record_count() {
        let empty = decode(PayloadFormat::FlatArray, b"[]");
        assert!(matches!(empty, Err(DecodeError::RecordCount(0))));

        let two = decode(
            PayloadFormat::FlatArray,
            br#"[{"timestamp": 1.0}, {"timestamp": 2.0}]"#,
        );
        assert!(matches!(two, Err(DecodeError::RecordCount(2))));
    }

    #[test]
    fn test_flat_root_must_be_array() {
        let result = decode(PayloadFormat::FlatArray, br#"{"timestamp": 1.0}"#);
        assert!(matches!(
            result,
            Err(DecodeError::UnexpectedRoot {
                expected: "array",
                got: "object"
            })
        ));
    }

    #[test]
    fn test_malformed_json() {
        let result = decode(PayloadFormat::FlatArray, b"[{\"timestamp\": ");
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_no_recognized_fields() {
        let mut decoder = PayloadDecoder::new(PayloadFormat::FlatArray);
        let result = decoder.decode(br#"[{"id": 0, "method": "2d c++"}]"#);

        assert!(matches!(result, Err(DecodeError::NoRecognizedFields)));
        assert_eq!(decoder.stats().payloads_rejected, 1);
        assert_eq!(decoder.stats().payloads_decoded, 0);
    }

    #[test]
    fn test_wrong_type_skips_only_that_field() {
        let mut decoder = PayloadDecoder::new(PayloadFormat::FlatArray);
        let sample = decoder
            .decode(br#"[{"timestamp": 3.0, "diameter": "wide", "confidence": 0.9}]"#)
            .unwrap();

        assert_eq!(sample.timestamp(), Some(3.0));
        assert_eq!(sample.get(Field::DiameterPx), None);
        assert_eq!(sample.get(Field::Confidence), Some(0.9));
        assert_eq!(decoder.stats().field_warnings, 1);
    }

    #[test]
    fn test_integer_values_accepted() {
        let sample = decode(PayloadFormat::FlatArray, br#"[{"diameter": 42}]"#).unwrap();
        assert_eq!(sample.get(Field::DiameterPx), Some(42.0));
    }

    #[test]
    fn test_nested_gaze_record() {
        let payload = json!([{
            "timestamp": 10.25,
            "confidence": 0.8,
            "norm_pos": [0.25, 0.75],
            "base": [{"confidence": 0.95, "diameter": 31.5}]
        }]);
        let sample = decode(PayloadFormat::NestedGaze, payload.to_string().as_bytes()).unwrap();

        assert_eq!(sample.timestamp(), Some(10.25));
        assert_eq!(sample.get(Field::Confidence), Some(0.8));
        assert_eq!(sample.get(Field::GazeX), Some(0.25));
        assert_eq!(sample.get(Field::GazeY), Some(0.75));
        assert_eq!(sample.get(Field::PupilConfidence), Some(0.95));
        assert_eq!(sample.get(Field::PupilDiameterPx), Some(31.5));
    }

    #[test]
    fn test_nested_norm_pos_length_is_a_warning() {
        let payload = br#"[{"timestamp": 1.0, "norm_pos": [0.1, 0.2, 0.3]}]"#;
        let extraction = extract(PayloadFormat::NestedGaze, payload).unwrap();

        assert_eq!(extraction.warnings, vec![FieldWarning::NormPosLength(3)]);
        let sample = extraction.fields.build().unwrap();
        assert_eq!(sample.timestamp(), Some(1.0));
        assert_eq!(sample.get(Field::GazeX), None);
    }

    #[test]
    fn test_nested_empty_norm_pos_is_silent() {
        let extraction =
            extract(PayloadFormat::NestedGaze, br#"[{"timestamp": 1.0, "norm_pos": []}]"#)
                .unwrap();
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn test_nested_extra_base_records() {
        let payload = json!([{
            "base": [{"diameter": 20.0}, {"diameter": 99.0}]
        }]);
        let extraction = extract(PayloadFormat::NestedGaze, payload.to_string().as_bytes()).unwrap();

        assert_eq!(extraction.warnings, vec![FieldWarning::ExtraBaseRecords(2)]);
        let sample = extraction.fields.build().unwrap();
        assert_eq!(sample.get(Field::PupilDiameterPx), Some(20.0));
    }

    #[test]
    fn test_nested_base_data_alias() {
        let payload = br#"[{"base_data": [{"confidence": 0.5}]}]"#;
        let sample = decode(PayloadFormat::NestedGaze, payload).unwrap();
        assert_eq!(sample.get(Field::PupilConfidence), Some(0.5));
    }

    #[test]
    fn test_nested_base_not_object() {
        let extraction =
            extract(PayloadFormat::NestedGaze, br#"[{"timestamp": 2.0, "base": [7]}]"#).unwrap();
        assert_eq!(extraction.warnings, vec![FieldWarning::BaseNotObject("number")]);
    }

    #[test]
    fn test_binary_map_record() {
        let mut record = std::collections::BTreeMap::new();
        record.insert("timestamp", json!(4.5));
        record.insert("diameter", json!(28.0));
        record.insert("norm_pos", json!([0.5, 0.5]));
        record.insert("method", json!("3d c++"));
        let payload = rmp_serde::to_vec_named(&record).unwrap();

        let sample = decode(PayloadFormat::BinaryMap, &payload).unwrap();
        assert_eq!(sample.timestamp(), Some(4.5));
        assert_eq!(sample.get(Field::DiameterPx), Some(28.0));
        assert_eq!(sample.get(Field::GazeX), Some(0.5));
        assert_eq!(sample.get(Field::Confidence), None);
    }

    #[test]
    fn test_binary_map_wrong_type() {
        let mut record = std::collections::BTreeMap::new();
        record.insert("timestamp", json!(true));
        record.insert("confidence", json!(0.7));
        let payload = rmp_serde::to_vec_named(&record).unwrap();

        let extraction = extract(PayloadFormat::BinaryMap, &payload).unwrap();
        assert_eq!(
            extraction.warnings,
            vec![FieldWarning::WrongType {
                key: "timestamp",
                expected: "number",
                got: "boolean"
            }]
        );
        let sample = extraction.fields.build().unwrap();
        assert_eq!(sample.get(Field::Confidence), Some(0.7));
    }

    #[test]
    fn test_binary_map_root_must_be_map() {
        let payload = rmp_serde::to_vec(&vec![1.0, 2.0]).unwrap();
        let result = decode(PayloadFormat::BinaryMap, &payload);
        assert!(matches!(
            result,
            Err(DecodeError::UnexpectedRoot { expected: "map", .. })
        ));
    }

    /// MessagePack helpers for values serde_json cannot produce
    fn fixstr(text: &str) -> Vec<u8> {
        let mut out = vec![0xa0 | text.len() as u8];
        out.extend_from_slice(text.as_bytes());
        out
    }

    fn float64(value: f64) -> Vec<u8> {
        let mut out = vec![0xcb];
        out.extend_from_slice(&value.to_be_bytes());
        out
    }

    fn bin8(data: &[u8]) -> Vec<u8> {
        let mut out = vec![0xc4, data.len() as u8];
        out.extend_from_slice(data);
        out
    }

    fn fixmap(entries: &[(Vec<u8>, Vec<u8>)]) -> Vec<u8> {
        let mut out = vec![0x80 | entries.len() as u8];
        for (key, value) in entries {
            out.extend_from_slice(key);
            out.extend_from_slice(value);
        }
        out
    }

    #[test]
    fn test_binary_value_on_known_key_skips_only_that_field() {
        let payload = fixmap(&[
            (fixstr("timestamp"), float64(4.5)),
            (fixstr("diameter"), bin8(&[1, 2, 3])),
        ]);
        let mut decoder = PayloadDecoder::new(PayloadFormat::BinaryMap);
        let sample = decoder.decode(&payload).unwrap();

        assert_eq!(sample.timestamp(), Some(4.5));
        assert_eq!(sample.get(Field::DiameterPx), None);
        assert_eq!(decoder.stats().field_warnings, 1);

        let extraction = extract(PayloadFormat::BinaryMap, &payload).unwrap();
        assert_eq!(
            extraction.warnings,
            vec![FieldWarning::WrongType {
                key: "diameter",
                expected: "number",
                got: "binary"
            }]
        );
    }

    #[test]
    fn test_binary_value_on_unknown_key_is_ignored() {
        let payload = fixmap(&[
            (fixstr("timestamp"), float64(4.5)),
            (fixstr("raw"), bin8(&[0xde, 0xad])),
        ]);
        let extraction = extract(PayloadFormat::BinaryMap, &payload).unwrap();

        assert!(extraction.warnings.is_empty());
        assert_eq!(extraction.fields.build().unwrap().timestamp(), Some(4.5));
    }

    #[test]
    fn test_integer_key_is_skipped_with_warning() {
        let payload = fixmap(&[(fixstr("timestamp"), float64(4.5)), (vec![0x07], float64(1.0))]);
        let extraction = extract(PayloadFormat::BinaryMap, &payload).unwrap();

        assert_eq!(extraction.warnings, vec![FieldWarning::NonTextKey("number")]);
        assert_eq!(extraction.fields.build().unwrap().timestamp(), Some(4.5));
    }

    #[test]
    fn test_binary_norm_pos_element() {
        // norm_pos = [0.5, bin8[]]
        let mut norm_pos = vec![0x92];
        norm_pos.extend(float64(0.5));
        norm_pos.extend(bin8(&[]));
        let payload = fixmap(&[(fixstr("confidence"), float64(0.9)), (fixstr("norm_pos"), norm_pos)]);

        let extraction = extract(PayloadFormat::BinaryMap, &payload).unwrap();
        assert_eq!(
            extraction.warnings,
            vec![FieldWarning::WrongType {
                key: "norm_pos",
                expected: "array",
                got: "binary"
            }]
        );
        let sample = extraction.fields.build().unwrap();
        assert_eq!(sample.get(Field::Confidence), Some(0.9));
        assert_eq!(sample.get(Field::GazeX), None);
    }

    #[test]
    fn test_truncated_binary_map_is_rejected() {
        let mut payload = fixmap(&[(fixstr("timestamp"), float64(4.5))]);
        payload.truncate(payload.len() - 3);
        let result = decode(PayloadFormat::BinaryMap, &payload);
        assert!(matches!(result, Err(DecodeError::MessagePack(_))));
    }

    #[test]
    fn test_format_config_names() {
        let format: PayloadFormat = serde_json::from_str("\"binary_map\"").unwrap();
        assert_eq!(format, PayloadFormat::BinaryMap);
        assert_eq!(format.to_string(), "binary_map");

        for format in PayloadFormat::value_variants() {
            let flag = format.to_possible_value().unwrap();
            let from_config: PayloadFormat =
                serde_json::from_value(json!(flag.get_name())).unwrap();
            assert_eq!(&from_config, format);
            assert_eq!(PayloadFormat::from_str(&format.to_string(), false), Ok(*format));
        }
    }

    /// Values with exact short decimal forms, so JSON text round-trips them
    fn eighths(max: u32) -> impl Strategy<Value = f64> {
        (0..=max).prop_map(|n| f64::from(n) / 8.0)
    }

    proptest! {
        #[test]
        fn prop_flat_subset_populates_exactly_present_fields(
            timestamp in proptest::option::of(eighths(8_000_000)),
            diameter in proptest::option::of(eighths(1_600)),
            confidence in proptest::option::of(eighths(8)),
        ) {
            let mut record = Map::new();
            if let Some(v) = timestamp { record.insert("timestamp".into(), json!(v)); }
            if let Some(v) = diameter { record.insert("diameter".into(), json!(v)); }
            if let Some(v) = confidence { record.insert("confidence".into(), json!(v)); }
            let payload = Value::Array(vec![Value::Object(record)]).to_string();

            let result = decode(PayloadFormat::FlatArray, payload.as_bytes());

            if timestamp.is_none() && diameter.is_none() && confidence.is_none() {
                prop_assert!(matches!(result, Err(DecodeError::NoRecognizedFields)));
            } else {
                let sample = result.unwrap();
                prop_assert_eq!(sample.get(Field::Timestamp), timestamp);
                prop_assert_eq!(sample.get(Field::DiameterPx), diameter);
                prop_assert_eq!(sample.get(Field::Confidence), confidence);
                for field in [Field::GazeX, Field::GazeY, Field::PupilConfidence, Field::PupilDiameterPx] {
                    prop_assert_eq!(sample.value_or_sentinel(field), -1.0);
                }
            }
        }
    }
}
