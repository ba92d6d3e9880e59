// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline errors.

use crate::clock::ClockMode;

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Broad category of a [`TimelineError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call is not allowed in the timeline's current lifecycle state
    InvalidState,
    /// The call received an argument it cannot accept
    InvalidArgument,
    /// Clock configuration could not be read or written
    Config,
}

/// Errors raised by timeline authoring and playback
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// Authoring call after the timeline was started
    #[error("Timeline is started and can no longer be edited")]
    AlreadyStarted,

    /// Play called on a playing timeline
    #[error("Timeline is already playing")]
    AlreadyPlaying,

    /// Scrub called while a tick task is attached
    #[error("Cannot scrub while playing; pause first")]
    ScrubWhilePlaying,

    /// Playback control called on a nested timeline
    #[error("Nested timelines are controlled by their parent")]
    NestedControl,

    /// A span was advanced before its timeline was started
    #[error("Timeline has not been started")]
    NotStarted,

    /// Nesting a timeline that is already started
    #[error("Nested timeline must not be started")]
    NestedStarted,

    /// Nesting a timeline that contains loop markers
    #[error("Nested timeline must not contain loop markers")]
    NestedLoop,

    /// Nesting a timeline driven by another clock mode
    #[error("Nested timeline mode {nested:?} does not match parent mode {parent:?}")]
    ClockModeMismatch {
        /// Parent clock mode
        parent: ClockMode,
        /// Nested clock mode
        nested: ClockMode,
    },

    /// Nesting a timeline created for another host
    #[error("Nested timeline must be created from the same host as the parent timeline")]
    HostMismatch,

    /// Variable lookup for an unknown name
    #[error("{0} is not defined in the timeline vars")]
    VarNotDefined(String),

    /// Variable lookup with the wrong type
    #[error("Timeline var {name} is not a {expected}")]
    VarTypeMismatch {
        /// Variable name
        name: String,
        /// Requested type
        expected: &'static str,
    },

    /// Negative or non-finite duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(f32),

    /// Non-finite timecode or tick delta
    #[error("Invalid timecode: {0}")]
    InvalidTimecode(f32),

    /// Malformed clock configuration
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Clock configuration could not be serialized
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] ron::Error),
}

impl TimelineError {
    /// Get the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyStarted
            | Self::AlreadyPlaying
            | Self::ScrubWhilePlaying
            | Self::NestedControl
            | Self::NotStarted => ErrorKind::InvalidState,
            Self::NestedStarted
            | Self::NestedLoop
            | Self::ClockModeMismatch { .. }
            | Self::HostMismatch
            | Self::VarNotDefined(_)
            | Self::VarTypeMismatch { .. }
            | Self::InvalidDuration(_)
            | Self::InvalidTimecode(_) => ErrorKind::InvalidArgument,
            Self::ConfigParse(_) | Self::ConfigWrite(_) => ErrorKind::Config,
        }
    }
}

/// Reject negative or non-finite durations
pub(crate) fn validate_duration(duration: f32) -> Result<f32> {
    if duration.is_finite() && duration >= 0.0 {
        Ok(duration)
    } else {
        Err(TimelineError::InvalidDuration(duration))
    }
}

/// Reject non-finite timecodes
pub(crate) fn validate_timecode(timecode: f32) -> Result<f32> {
    if timecode.is_finite() {
        Ok(timecode)
    } else {
        Err(TimelineError::InvalidTimecode(timecode))
    }
}
