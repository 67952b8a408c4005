use uuid::Uuid;

/// Scripts completed during one orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: Uuid,
    completed: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            completed: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mark_completed(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.is_completed(&name) {
            self.completed.push(name);
        }
    }

    pub fn is_completed(&self, name: &str) -> bool {
        self.completed.iter().any(|c| c == name)
    }

    /// Completed scripts in completion order.
    pub fn completed(&self) -> &[String] {
        &self.completed
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_is_recorded_once_in_order() {
        let mut session = Session::new();
        session.mark_completed("git");
        session.mark_completed("github");
        session.mark_completed("git");
        assert_eq!(session.completed(), ["git", "github"]);
        assert!(session.is_completed("github"));
        assert!(!session.is_completed("docker"));
    }

    #[test]
    fn sessions_have_distinct_ids() {
        assert_ne!(Session::new().id(), Session::new().id());
    }
}
