use std::collections::VecDeque;

/// Sliding window over the most recently decoded codes.
///
/// Holds at most `capacity` entries. Pushing into a full window evicts
/// the oldest code first.
#[derive(Debug, Clone)]
pub struct ConfirmationWindow {
    /// Maximum number of codes kept
    capacity: usize,

    /// Codes in arrival order, oldest first
    codes: VecDeque<String>,
}

impl ConfirmationWindow {
    /// Create an empty window. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            codes: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.codes.len() >= self.capacity
    }

    /// Append a code, evicting the oldest entry if the window is full
    pub fn push(&mut self, code: impl Into<String>) {
        if self.is_full() {
            self.codes.pop_front();
        }
        self.codes.push_back(code.into());
    }

    /// Number of entries equal to `code`
    pub fn count(&self, code: &str) -> usize {
        self.codes.iter().filter(|c| c.as_str() == code).count()
    }

    pub fn clear(&mut self) {
        self.codes.clear();
    }

    /// Codes oldest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.codes.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest() {
        let mut window = ConfirmationWindow::new(3);
        for code in ["a", "b", "c", "d"] {
            window.push(code);
        }

        assert_eq!(window.len(), 3);
        assert_eq!(window.to_vec(), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_count_only_sees_current_entries() {
        let mut window = ConfirmationWindow::new(3);
        window.push("a");
        window.push("a");
        window.push("b");
        assert_eq!(window.count("a"), 2);

        window.push("b");
        window.push("b");
        assert_eq!(window.count("a"), 0);
        assert_eq!(window.count("b"), 3);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut window = ConfirmationWindow::new(0);
        assert_eq!(window.capacity(), 1);

        window.push("x");
        window.push("y");
        assert_eq!(window.to_vec(), vec!["y"]);
    }
}
