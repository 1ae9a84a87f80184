use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use burrow_system_scenario::{Layout, LayoutError};
use serde::{Deserialize, Serialize};

const TRANSFER_DOMAIN: &str = "burrow";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const TRANSFER_HEADER: &str = "burrow:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a layout into a single-line string suitable for sharing.
pub(crate) fn encode(layout: &Layout) -> Result<String, LayoutTransferError> {
    let rendered = layout.to_string();
    let payload = SerializableLayout {
        rows: rendered.lines().map(str::to_owned).collect(),
    };
    let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    let size = layout.size();
    Ok(format!(
        "{TRANSFER_HEADER}:{}x{}:{encoded}",
        size.width(),
        size.height()
    ))
}

/// Decodes a layout from its transfer string.
pub(crate) fn decode(value: &str) -> Result<Layout, LayoutTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LayoutTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
    let dimensions = parts
        .next()
        .ok_or(LayoutTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LayoutTransferError::InvalidEncoding)?;
    let decoded: SerializableLayout =
        serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;
    let layout =
        Layout::parse(&decoded.rows.join("\n")).map_err(LayoutTransferError::InvalidLayout)?;

    let size = layout.size();
    if size.width() != columns || size.height() != rows {
        return Err(LayoutTransferError::DimensionMismatch {
            declared: (columns, rows),
            decoded: (size.width(), size.height()),
        });
    }
    Ok(layout)
}

/// Returns `true` when the value looks like a layout transfer string.
pub(crate) fn is_transfer_string(value: &str) -> bool {
    value
        .trim()
        .strip_prefix(TRANSFER_HEADER)
        .map_or(false, |rest| rest.starts_with(FIELD_DELIMITER))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLayout {
    rows: Vec<String>,
}

/// Errors that can occur while decoding layout transfer strings.
#[derive(Debug)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded layout.
    MissingPrefix,
    /// The encoded layout did not contain a version segment.
    MissingVersion,
    /// The encoded layout did not include grid dimensions.
    MissingDimensions,
    /// The encoded layout did not include the payload segment.
    MissingPayload,
    /// The encoded layout used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded layout used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded layout.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
    /// The decoded rows do not form a valid layout.
    InvalidLayout(LayoutError),
    /// The decoded rows disagree with the declared dimensions.
    DimensionMismatch {
        /// Columns and rows named in the header.
        declared: (u32, u32),
        /// Columns and rows of the decoded layout.
        decoded: (u32, u32),
    },
}

impl fmt::Display for LayoutTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "layout string was empty"),
            Self::MissingPrefix => write!(f, "layout string is missing the prefix"),
            Self::MissingVersion => write!(f, "layout string is missing the version"),
            Self::MissingDimensions => write!(f, "layout string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "layout string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "layout prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "layout version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode layout payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse layout payload: {error}")
            }
            Self::InvalidLayout(error) => write!(f, "layout payload is malformed: {error}"),
            Self::DimensionMismatch {
                declared: (columns, rows),
                decoded: (width, height),
            } => write!(
                f,
                "layout header declares {columns}x{rows} but the payload is {width}x{height}"
            ),
        }
    }
}

impl Error for LayoutTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            Self::InvalidLayout(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(LayoutTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORRIDOR: &str = "
        ..%..
        A.#.T
        ..$H.
    ";

    #[test]
    fn layouts_survive_transfer() {
        let layout = Layout::parse(CORRIDOR).expect("layout parses");

        let encoded = encode(&layout).expect("layout encodes");
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:5x3:")));
        assert!(is_transfer_string(&encoded));

        let decoded = decode(&encoded).expect("layout decodes");
        assert_eq!(decoded, layout);
    }

    #[test]
    fn foreign_prefixes_are_rejected() {
        assert!(matches!(
            decode("maze:v1:5x3:e30"),
            Err(LayoutTransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            decode("burrow:v2:5x3:e30"),
            Err(LayoutTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            decode("   "),
            Err(LayoutTransferError::EmptyPayload)
        ));
        assert!(!is_transfer_string("layouts/corridor.txt"));
    }

    #[test]
    fn declared_dimensions_must_match_payload() {
        let layout = Layout::parse(CORRIDOR).expect("layout parses");
        let encoded = encode(&layout).expect("layout encodes");
        let tampered = encoded.replacen(":5x3:", ":4x3:", 1);

        assert!(matches!(
            decode(&tampered),
            Err(LayoutTransferError::DimensionMismatch {
                declared: (4, 3),
                decoded: (5, 3),
            })
        ));
    }

    #[test]
    fn malformed_dimensions_are_reported() {
        assert!(matches!(
            decode("burrow:v1:0x3:e30"),
            Err(LayoutTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("burrow:v1:five:e30"),
            Err(LayoutTransferError::InvalidDimensions(_))
        ));
    }
}
