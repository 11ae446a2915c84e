//! Decoding raw service records into analysis-ready values.
//!
//! The service returns heterogeneous payloads; the declared datatype of the
//! owning variable decides the decoding rule:
//!
//! | datatype        | decoded shape            |
//! |-----------------|--------------------------|
//! | `MATRIXNUMERIC` | `Array2<f64>`            |
//! | `VECTORNUMERIC` | `Array1<f64>`            |
//! | `VECTORSTRING`  | `Vec<String>`            |
//! | `NUMERIC`       | `f64`                    |
//! | `FUNDAMENTAL`   | constant presence marker |
//! | `TEXTUAL`       | `String`                 |
//! | anything else   | raw payload passthrough  |
//!
//! Decoding never hard-fails on a bad record: an unrecognized tag, a payload
//! whose shape contradicts the declared tag, or a ragged matrix degrades to
//! a logged warning plus [`Value::Raw`], keeping the rest of the result
//! usable.

use log::warn;
use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::service::{RawSample, RawValue};
use crate::timestamp::{ServiceTimestamp, TimeFormat, TimestampError, Timestamps};
use crate::variable::VariableDataType;

/// One decoded sample value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Value {
    /// Scalar numeric sample.
    Scalar(f64),
    /// 1-D numeric sample.
    Vector(Array1<f64>),
    /// 2-D numeric sample.
    Matrix(Array2<f64>),
    /// 1-D string sample.
    StringVector(Vec<String>),
    /// Textual sample.
    Text(String),
    /// Presence marker for a fundamental event (numeric value 1).
    Fundamental,
    /// Undecoded passthrough of a payload this client could not shape.
    Raw(RawValue),
}

impl Value {
    /// Scalar view of the value, where one exists. Fundamental markers
    /// read as `1`.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(x) => Some(*x),
            Value::Fundamental => Some(1.0),
            _ => None,
        }
    }
}

/// An ordered sequence of decoded samples for one variable.
///
/// `timestamps` and `values` are index-aligned and always the same length;
/// ordering is whatever the service returned (the client does not re-sort).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    /// Sample timestamps, in the caller's requested representation.
    pub timestamps: Timestamps,
    /// Sample values, parallel to `timestamps`.
    pub values: Vec<Value>,
}

impl Series {
    /// An empty series in the given timestamp representation.
    pub fn empty(format: TimeFormat) -> Self {
        Series { timestamps: Timestamps::with_format(format), values: Vec::new() }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Pack row-major rows into an `Array2`, handing the rows back when they
/// are ragged so the caller can pass them through undecoded.
fn matrix_from_rows(rows: Vec<Vec<f64>>) -> Result<Array2<f64>, Vec<Vec<f64>>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(rows);
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((nrows, ncols), flat).map_err(|_| rows)
}

/// Decode one raw payload according to the owning variable's datatype.
pub fn normalize_value(payload: RawValue, data_type: &VariableDataType) -> Value {
    match (data_type, payload) {
        (VariableDataType::Numeric, RawValue::Double(x)) => Value::Scalar(x),
        (VariableDataType::VectorNumeric, RawValue::DoubleVector(v)) => {
            Value::Vector(Array1::from_vec(v))
        }
        (VariableDataType::MatrixNumeric, RawValue::DoubleMatrix(rows)) => {
            match matrix_from_rows(rows) {
                Ok(m) => Value::Matrix(m),
                Err(rows) => {
                    warn!("ragged matrix payload, returning the raw record");
                    Value::Raw(RawValue::DoubleMatrix(rows))
                }
            }
        }
        (VariableDataType::VectorString, RawValue::StringVector(v)) => Value::StringVector(v),
        (VariableDataType::Textual, RawValue::Varchar(s)) => Value::Text(s),
        // Fundamentals are presence-only; any payload decodes to the marker.
        (VariableDataType::Fundamental, _) => Value::Fundamental,
        (VariableDataType::Other(tag), payload) => {
            warn!("unsupported datatype {tag}, returning the raw record");
            Value::Raw(payload)
        }
        (data_type, payload) => {
            warn!(
                "payload shape does not match declared datatype {}, returning the raw record",
                data_type.as_tag()
            );
            Value::Raw(payload)
        }
    }
}

/// Decode one raw sample into its timestamp and shaped value.
pub fn normalize_sample(
    sample: RawSample,
    data_type: &VariableDataType,
) -> (ServiceTimestamp, Value) {
    (sample.stamp, normalize_value(sample.payload, data_type))
}

/// Decode a full retrieval response into a [`Series`], in the order
/// received, rendering timestamps per `format`.
pub fn normalize_series(
    samples: Vec<RawSample>,
    data_type: &VariableDataType,
    format: TimeFormat,
) -> Result<Series, TimestampError> {
    let mut timestamps = Timestamps::with_format(format);
    let mut values = Vec::with_capacity(samples.len());
    for sample in samples {
        let (stamp, value) = normalize_sample(sample, data_type);
        timestamps.push_raw(stamp)?;
        values.push(value);
    }
    Ok(Series { timestamps, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn sample(secs: i64, payload: RawValue) -> RawSample {
        RawSample { stamp: ServiceTimestamp::new(secs, 0), payload }
    }

    #[test]
    fn numeric_decodes_to_scalar() {
        let v = normalize_value(RawValue::Double(2.5), &VariableDataType::Numeric);
        assert_eq!(v, Value::Scalar(2.5));
        assert_eq!(v.as_scalar(), Some(2.5));
    }

    #[test]
    fn vector_numeric_decodes_to_array1() {
        let v = normalize_value(
            RawValue::DoubleVector(vec![1.0, 2.0, 3.0]),
            &VariableDataType::VectorNumeric,
        );
        assert_eq!(v, Value::Vector(arr1(&[1.0, 2.0, 3.0])));
    }

    #[test]
    fn matrix_numeric_decodes_to_array2() {
        let v = normalize_value(
            RawValue::DoubleMatrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
            &VariableDataType::MatrixNumeric,
        );
        assert_eq!(v, Value::Matrix(arr2(&[[1.0, 2.0], [3.0, 4.0]])));
    }

    #[test]
    fn ragged_matrix_falls_back_to_raw() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        let v = normalize_value(
            RawValue::DoubleMatrix(rows.clone()),
            &VariableDataType::MatrixNumeric,
        );
        assert_eq!(v, Value::Raw(RawValue::DoubleMatrix(rows)));
    }

    #[test]
    fn fundamental_decodes_to_marker_regardless_of_payload() {
        let v = normalize_value(RawValue::Marker, &VariableDataType::Fundamental);
        assert_eq!(v, Value::Fundamental);
        assert_eq!(v.as_scalar(), Some(1.0));

        let v = normalize_value(RawValue::Double(7.0), &VariableDataType::Fundamental);
        assert_eq!(v, Value::Fundamental);
    }

    #[test]
    fn unknown_datatype_passes_payload_through() {
        let v = normalize_value(
            RawValue::Varchar("blob".to_string()),
            &VariableDataType::Other("BLOB".to_string()),
        );
        assert_eq!(v, Value::Raw(RawValue::Varchar("blob".to_string())));
    }

    #[test]
    fn shape_mismatch_passes_payload_through() {
        let v = normalize_value(RawValue::Varchar("oops".to_string()), &VariableDataType::Numeric);
        assert_eq!(v, Value::Raw(RawValue::Varchar("oops".to_string())));
    }

    #[test]
    fn series_keeps_timestamps_and_values_parallel() {
        let samples = vec![
            sample(10, RawValue::Double(1.0)),
            sample(20, RawValue::Double(2.0)),
            sample(30, RawValue::Double(3.0)),
        ];
        let series =
            normalize_series(samples, &VariableDataType::Numeric, TimeFormat::UnixSeconds).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.timestamps.len(), series.values.len());
        assert_eq!(series.values[1], Value::Scalar(2.0));
    }

    #[test]
    fn series_preserves_service_order() {
        // Deliberately out of order; the client must not re-sort.
        let samples = vec![sample(30, RawValue::Double(3.0)), sample(10, RawValue::Double(1.0))];
        let series =
            normalize_series(samples, &VariableDataType::Numeric, TimeFormat::UnixSeconds).unwrap();
        match &series.timestamps {
            Timestamps::Unix(seq) => assert_eq!(seq, &vec![30.0, 10.0]),
            Timestamps::Utc(_) => panic!("unix format expected"),
        }
    }
}
