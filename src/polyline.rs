//! Encoded polyline codec
//!
//! Decodes the compact ASCII polyline format used by the directions proxy:
//! every coordinate is stored as the signed, zig-zag encoded difference to the
//! previous one, split into 5-bit chunks offset by 63.

use thiserror::Error;

use crate::models::Coordinate;

/// Precision used by the directions proxy (1e-5 degrees)
pub const DEFAULT_PRECISION: u32 = 5;

/// Widest value a single chunked varint may carry before it is rejected
const MAX_SHIFT: u32 = 60;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("invalid character 0x{byte:02x} at position {position}")]
    InvalidCharacter { byte: u8, position: usize },

    #[error("truncated value at position {position}")]
    Truncated { position: usize },

    #[error("latitude at position {position} has no longitude")]
    MissingLongitude { position: usize },

    #[error("value starting at position {position} overflows")]
    Overflow { position: usize },

    #[error("decoded point ({lat}, {lng}) is outside valid coordinate bounds")]
    OutOfRange { lat: f64, lng: f64 },
}

/// Decode a polyline at the default 1e-5 precision.
///
/// An empty string decodes to an empty path. Malformed input is rejected as a
/// whole; no partially decoded path is ever returned.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, DecodeError> {
    decode_with_precision(encoded, DEFAULT_PRECISION)
}

pub fn decode_with_precision(
    encoded: &str,
    precision: u32,
) -> Result<Vec<Coordinate>, DecodeError> {
    let factor = scale(precision);
    let bytes = encoded.as_bytes();

    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        let start = index;
        let (delta_lat, next) = next_value(bytes, index)?;
        if next >= bytes.len() {
            return Err(DecodeError::MissingLongitude { position: start });
        }
        let (delta_lng, next) = next_value(bytes, next)?;
        index = next;

        lat = lat
            .checked_add(delta_lat)
            .ok_or(DecodeError::Overflow { position: start })?;
        lng = lng
            .checked_add(delta_lng)
            .ok_or(DecodeError::Overflow { position: start })?;

        let point = Coordinate {
            lat: lat as f64 / factor,
            lng: lng as f64 / factor,
        };
        if !point.is_valid() {
            return Err(DecodeError::OutOfRange {
                lat: point.lat,
                lng: point.lng,
            });
        }
        points.push(point);
    }

    Ok(points)
}

/// Encode a path at the default 1e-5 precision.
#[must_use]
pub fn encode(points: &[Coordinate]) -> String {
    encode_with_precision(points, DEFAULT_PRECISION)
}

#[must_use]
pub fn encode_with_precision(points: &[Coordinate], precision: u32) -> String {
    let factor = scale(precision);
    let mut encoded = String::with_capacity(points.len() * 8);
    let mut previous_lat: i64 = 0;
    let mut previous_lng: i64 = 0;

    for point in points {
        let lat = (point.lat * factor).round() as i64;
        let lng = (point.lng * factor).round() as i64;
        push_value(lat - previous_lat, &mut encoded);
        push_value(lng - previous_lng, &mut encoded);
        previous_lat = lat;
        previous_lng = lng;
    }

    encoded
}

fn scale(precision: u32) -> f64 {
    10_f64.powi(i32::try_from(precision).unwrap_or(5))
}

/// Read one zig-zag varint starting at `index`, returning it and the index
/// of the first byte after it.
fn next_value(bytes: &[u8], mut index: usize) -> Result<(i64, usize), DecodeError> {
    let start = index;
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(index) else {
            return Err(DecodeError::Truncated { position: index });
        };
        if !(63..=126).contains(&byte) {
            return Err(DecodeError::InvalidCharacter {
                byte,
                position: index,
            });
        }
        if shift > MAX_SHIFT {
            return Err(DecodeError::Overflow { position: start });
        }

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        index += 1;

        if chunk < 0x20 {
            break;
        }
    }

    let value = if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Ok((value, index))
}

fn push_value(value: i64, encoded: &mut String) {
    let mut remaining = if value < 0 {
        !(value << 1)
    } else {
        value << 1
    } as u64;

    while remaining >= 0x20 {
        encoded.push(char::from(((0x20 | (remaining & 0x1f)) + 63) as u8));
        remaining >>= 5;
    }
    encoded.push(char::from((remaining + 63) as u8));
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Coord;
    use rstest::rstest;

    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn reference_points() -> Vec<Coordinate> {
        vec![
            Coordinate { lat: 38.5, lng: -120.2 },
            Coordinate { lat: 40.7, lng: -120.95 },
            Coordinate { lat: 43.252, lng: -126.453 },
        ]
    }

    fn assert_close(actual: &[Coordinate], expected: &[Coordinate]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a.lat - e.lat).abs() < 1e-5, "lat {} vs {}", a.lat, e.lat);
            assert!((a.lng - e.lng).abs() < 1e-5, "lng {} vs {}", a.lng, e.lng);
        }
    }

    #[test]
    fn test_decode_reference_polyline() {
        let points = decode(REFERENCE).unwrap();
        assert_close(&points, &reference_points());
    }

    #[test]
    fn test_decode_empty_is_empty_path() {
        assert_eq!(decode("").unwrap(), Vec::new());
    }

    #[test]
    fn test_encode_reference_polyline() {
        assert_eq!(encode(&reference_points()), REFERENCE);
    }

    #[test]
    fn test_reencode_matches_reference_encoder() {
        // Boulder area walk, encoded by the georust implementation
        let path = vec![
            Coord { x: -105.27055, y: 40.01499 },
            Coord { x: -105.26921, y: 40.01622 },
            Coord { x: -105.25102, y: 40.00745 },
            Coord { x: -105.2499, y: 40.0 },
        ];
        let encoded = ::polyline::encode_coordinates(path.clone(), 5).unwrap();

        let decoded = decode(&encoded).unwrap();
        let expected: Vec<Coordinate> = path
            .iter()
            .map(|c| Coordinate { lat: c.y, lng: c.x })
            .collect();
        assert_close(&decoded, &expected);
        assert_eq!(encode(&decoded), encoded);
    }

    #[test]
    fn test_precision_six_round_trip() {
        let points = vec![
            Coordinate { lat: 40.014_991, lng: -105.270_551 },
            Coordinate { lat: 39.739_236, lng: -104.990_251 },
        ];
        let encoded = encode_with_precision(&points, 6);
        let decoded = decode_with_precision(&encoded, 6).unwrap();
        assert_eq!(decoded.len(), 2);
        assert!((decoded[1].lat - 39.739_236).abs() < 1e-6);
        assert!((decoded[1].lng + 104.990_251).abs() < 1e-6);
    }

    #[rstest]
    #[case::dangling_continuation("_p~iF~ps|", DecodeError::Truncated { position: 9 })]
    #[case::latitude_without_longitude("_p~iF", DecodeError::MissingLongitude { position: 0 })]
    #[case::space_character("_p~iF ps|U", DecodeError::InvalidCharacter { byte: b' ', position: 5 })]
    fn test_decode_rejects_malformed(#[case] input: &str, #[case] expected: DecodeError) {
        assert_eq!(decode(input).unwrap_err(), expected);
    }

    #[test]
    fn test_decode_rejects_out_of_range_points() {
        let encoded = encode_with_precision(&[Coordinate { lat: 95.0, lng: 0.0 }], 5);
        assert!(matches!(
            decode(&encoded),
            Err(DecodeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_overlong_value() {
        let encoded = "~".repeat(20);
        assert!(matches!(
            decode(&encoded),
            Err(DecodeError::Overflow { .. })
        ));
    }
}
