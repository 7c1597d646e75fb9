//! Leaf field values with confidence and on-page position

use thiserror::Error;

/// Scalar value carried by a [`Field`]
///
/// `Null` means "requested but not found" - the model was asked for the
/// field and explicitly reported its absence.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text content as it appeared in the document
    Text(String),
    /// Numeric content (amounts, quantities)
    Number(f64),
    /// Requested but not found in the document
    Null,
}

impl FieldValue {
    /// True if this value marks an absent field
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Borrow the text content, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// Errors from position validation
#[derive(Error, Debug, PartialEq)]
pub enum PositionError {
    /// Page numbers are 1-based
    #[error("page number must be >= 1")]
    InvalidPage,

    /// Bounding box coordinates must describe a non-empty rectangle
    #[error("bounding box must satisfy x1 < x2 and y1 < y2")]
    InvalidBox,

    /// Coordinates are percentages of the page
    #[error("bounding box coordinate {0} out of range [0, 100]")]
    OutOfRange(f64),
}

/// Where on the page a field was found
///
/// Coordinates are percentages of page width/height, `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// 1-based page number
    pub page_number: u32,
    /// `[x1, y1, x2, y2]` as percentages, `x1 < x2`, `y1 < y2`
    pub bounding_box: [f64; 4],
}

impl Position {
    /// Create a validated position
    pub fn new(page_number: u32, bounding_box: [f64; 4]) -> Result<Self, PositionError> {
        if page_number < 1 {
            return Err(PositionError::InvalidPage);
        }
        let [x1, y1, x2, y2] = bounding_box;
        for c in bounding_box {
            if !(0.0..=100.0).contains(&c) {
                return Err(PositionError::OutOfRange(c));
            }
        }
        if x1 >= x2 || y1 >= y2 {
            return Err(PositionError::InvalidBox);
        }
        Ok(Self {
            page_number,
            bounding_box,
        })
    }
}

/// A leaf value extracted from the document
///
/// A Field never contains nested Fields; repeating or hierarchical data
/// lives in the surrounding [`crate::ExtractedNode`] tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// The extracted value
    pub value: FieldValue,
    /// Confidence in [0, 1]; absent when confidence reporting is disabled
    pub confidence: Option<f64>,
    /// On-page position, when position reporting is enabled
    pub position: Option<Position>,
}

impl Field {
    /// Create a field with no confidence or position
    pub fn new(value: impl Into<FieldValue>) -> Self {
        Self {
            value: value.into(),
            confidence: None,
            position: None,
        }
    }

    /// Create a field with a confidence score, clamped into [0, 1]
    pub fn with_confidence(value: impl Into<FieldValue>, confidence: f64) -> Self {
        Self {
            value: value.into(),
            confidence: Some(confidence.clamp(0.0, 1.0)),
            position: None,
        }
    }

    /// Attach a position
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// A "requested but not found" field with the conventional low confidence
    pub fn not_found() -> Self {
        Self::with_confidence(FieldValue::Null, 0.1)
    }
}
