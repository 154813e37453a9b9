//! Streaming events of a generation request.
//!
//! A reply arrives as [`StreamEvent::Chunk`]s terminated by either
//! [`StreamEvent::Done`] or [`StreamEvent::Failed`]. A failure ends that
//! one request only.

/// An event in a streamed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text fragment
    Chunk(String),
    /// Normal end of the reply
    Done,
    /// The service reported an error mid-stream
    Failed(String),
}

impl StreamEvent {
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Chunk(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_text_returns_content() {
        let event = StreamEvent::Chunk("hello".to_string());
        assert_eq!(event.text(), Some("hello"));
        assert!(!event.is_terminal());
    }

    #[test]
    fn done_and_failed_are_terminal() {
        assert!(StreamEvent::Done.is_terminal());
        assert!(StreamEvent::Failed("oops".to_string()).is_terminal());
        assert_eq!(StreamEvent::Failed("oops".to_string()).text(), None);
    }
}
