use serde::Serialize;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub graded: usize,
    pub remaining: usize,
    pub current_index: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// One-based position for display, clamped to `total` once complete.
    #[must_use]
    pub fn position(&self) -> usize {
        (self.current_index + 1).min(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_one_based_and_clamped() {
        let mut progress = SessionProgress {
            total: 3,
            graded: 0,
            remaining: 3,
            current_index: 0,
            is_complete: false,
        };
        assert_eq!(progress.position(), 1);
        progress.current_index = 3;
        assert_eq!(progress.position(), 3);
    }
}
