//! Which agent speaks next

use super::ChatHistory;
use crate::agent::Agent;

pub trait SelectionStrategy: Send + Sync {
    /// Called at the start of every turn
    fn reset(&mut self);

    /// Index into `agents` of the next speaker. `agents` is never empty.
    fn next(&mut self, agents: &[Agent], history: &ChatHistory) -> usize;
}

/// Round-robin in roster order, restarting from the first agent each turn.
#[derive(Debug, Default, Clone)]
pub struct SequentialSelection {
    cursor: usize,
}

impl SequentialSelection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStrategy for SequentialSelection {
    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn next(&mut self, agents: &[Agent], _history: &ChatHistory) -> usize {
        let idx = self.cursor % agents.len();
        self.cursor = idx + 1;
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentRole;
    use crate::testing::ScriptedService;

    #[test]
    fn test_sequential_wraps_and_resets() {
        let service = ScriptedService::new(Vec::<String>::new());
        let agents: Vec<Agent> = AgentRole::ALL
            .iter()
            .map(|r| Agent::from_role(*r, service.clone()))
            .collect();
        let history = ChatHistory::new();

        let mut selection = SequentialSelection::new();
        let picks: Vec<usize> = (0..4).map(|_| selection.next(&agents, &history)).collect();
        assert_eq!(picks, vec![0, 1, 2, 0]);

        selection.reset();
        assert_eq!(selection.next(&agents, &history), 0);
    }
}
