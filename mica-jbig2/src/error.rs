//! Error types for JBIG2 region decoding.

use core::fmt;

/// The main error type for region decoding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A header value is inconsistent with the format.
    Header(HeaderError),
    /// A decoded value does not fit into its target type.
    Overflow,
    /// The data ended before a required code was found.
    UnexpectedEof,
}

/// Errors caused by invalid region parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// A region dimension or code length is out of range.
    InvalidDimension,
    /// The region has more pixels than the configured budget allows.
    TooManyPixels,
    /// An invalid or unsupported template was selected.
    InvalidTemplate,
    /// An adaptive template pixel refers to a pixel that is not yet decoded.
    InvalidAtPixel,
    /// Invalid combination operator value.
    InvalidCombinationOperator,
    /// Reserved bits are not zero.
    ReservedBits,
    /// The MMR data does not describe a valid sequence of lines.
    MmrDesync,
    /// The MMR data ended with an end-of-block marker before all lines
    /// were decoded.
    MissingRows,
}

/// A [`DecodeError`] annotated with the location at which it occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionDecodeError {
    /// The number of the segment that failed to decode, if known.
    pub segment_number: Option<u32>,
    /// The byte offset into the segment data at which the failing stage
    /// started.
    pub offset: usize,
    /// The underlying error.
    pub error: DecodeError,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(e) => write!(f, "{e}"),
            Self::Overflow => write!(f, "arithmetic overflow"),
            Self::UnexpectedEof => write!(f, "unexpected end of data"),
        }
    }
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension => write!(f, "invalid region dimension"),
            Self::TooManyPixels => write!(f, "region exceeds the pixel budget"),
            Self::InvalidTemplate => write!(f, "invalid template"),
            Self::InvalidAtPixel => write!(f, "invalid adaptive template pixel location"),
            Self::InvalidCombinationOperator => write!(f, "invalid combination operator"),
            Self::ReservedBits => write!(f, "reserved bits must be zero"),
            Self::MmrDesync => write!(f, "MMR data is out of sync"),
            Self::MissingRows => write!(f, "MMR data ended before the last row"),
        }
    }
}

impl fmt::Display for RegionDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.segment_number {
            Some(number) => write!(
                f,
                "segment {number} at offset {}: {}",
                self.offset, self.error
            ),
            None => write!(f, "region at offset {}: {}", self.offset, self.error),
        }
    }
}

impl core::error::Error for DecodeError {}
impl core::error::Error for HeaderError {}

impl core::error::Error for RegionDecodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<HeaderError> for DecodeError {
    fn from(e: HeaderError) -> Self {
        Self::Header(e)
    }
}

impl From<mica_ccitt::DecodeError> for DecodeError {
    fn from(e: mica_ccitt::DecodeError) -> Self {
        match e {
            mica_ccitt::DecodeError::UnexpectedEof => Self::UnexpectedEof,
            mica_ccitt::DecodeError::InvalidCode | mica_ccitt::DecodeError::LineOverflow => {
                Self::Header(HeaderError::MmrDesync)
            }
            mica_ccitt::DecodeError::Overflow => Self::Overflow,
        }
    }
}

impl From<RegionDecodeError> for DecodeError {
    fn from(e: RegionDecodeError) -> Self {
        e.error
    }
}

/// Result type for region decoding operations.
pub type Result<T> = core::result::Result<T, DecodeError>;

/// Attach a segment number and byte offset to the error of a fallible stage.
pub(crate) trait Locate<T> {
    fn locate(
        self,
        segment_number: Option<u32>,
        offset: usize,
    ) -> core::result::Result<T, RegionDecodeError>;
}

impl<T> Locate<T> for Result<T> {
    fn locate(
        self,
        segment_number: Option<u32>,
        offset: usize,
    ) -> core::result::Result<T, RegionDecodeError> {
        self.map_err(|error| RegionDecodeError {
            segment_number,
            offset,
            error,
        })
    }
}

macro_rules! bail {
    ($err:expr) => {
        return Err($err.into())
    };
}

macro_rules! err {
    ($err:expr) => {
        Err($err.into())
    };
}

pub(crate) use bail;
pub(crate) use err;
