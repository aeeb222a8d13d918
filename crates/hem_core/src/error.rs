use thiserror::Error;

/// Record-level decode failures. The engine resolves every one of these
/// locally by dropping the record and bumping a diagnostic counter.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("transport reported a failed receive")]
    TransportFailure,

    #[error("unknown event code: {0}")]
    UnknownEventCode(u8),

    #[error("malformed record: event code {code} expects {expected} bytes, found {found}")]
    MalformedRecord { code: u8, expected: usize, found: usize },

    #[error("payload too large: {size} bytes (capacity {capacity})")]
    PayloadTooLarge { size: usize, capacity: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("threshold `{name}` must be greater than zero")]
    ZeroThreshold { name: &'static str },
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("capture truncated: record at offset {offset} needs {needed} more bytes")]
    Truncated { offset: u64, needed: usize },

    #[error("invalid record in capture: {0}")]
    Record(#[from] DecodeError),
}

impl DecodeError {
    /// Malformed and unknown records are counted separately from transport
    /// failures in the diagnostics.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            DecodeError::MalformedRecord { .. }
                | DecodeError::UnknownEventCode(_)
                | DecodeError::PayloadTooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_classification() {
        assert!(DecodeError::UnknownEventCode(9).is_malformed());
        assert!(DecodeError::MalformedRecord { code: 1, expected: 122, found: 3 }.is_malformed());
        assert!(!DecodeError::TransportFailure.is_malformed());
    }

    #[test]
    fn test_display_mentions_sizes() {
        let err = DecodeError::MalformedRecord { code: 2, expected: 1, found: 4 };
        let msg = err.to_string();
        assert!(msg.contains("expects 1"));
        assert!(msg.contains("found 4"));
    }
}
