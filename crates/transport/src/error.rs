//! Transport failure type

use std::fmt;
use std::sync::Arc;

/// Failure to establish or complete an HTTP exchange.
///
/// The cause is kept behind an `Arc` so one failure can be handed to several
/// waiters (single-flight session acquisition) without string conversion.
#[derive(Debug, Clone)]
pub struct TransportError {
    cause: Arc<dyn std::error::Error + Send + Sync>,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport failure: {}", self.cause)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.cause)
    }
}

impl TransportError {
    pub fn new(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            cause: Arc::new(cause),
        }
    }

    /// True when the underlying cause was a client-side timeout.
    pub fn is_timeout(&self) -> bool {
        self.cause
            .downcast_ref::<reqwest::Error>()
            .is_some_and(reqwest::Error::is_timeout)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_includes_cause() {
        let err = TransportError::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ));
        assert_eq!(
            err.to_string(),
            "transport failure: connection reset by peer"
        );
    }

    #[test]
    fn source_is_preserved_across_clones() {
        let err = TransportError::new(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "dns lookup timed out",
        ));
        let cloned = err.clone();
        let source = cloned.source().expect("cause must be kept");
        assert!(source.downcast_ref::<std::io::Error>().is_some());
        assert!(!cloned.is_timeout(), "io timeouts are not reqwest timeouts");
    }
}
