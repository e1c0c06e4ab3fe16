use crate::Agent;
use rand::Rng;

/// The set of agents still usable in a run. Exhausted agents are removed
/// permanently for the rest of that run; a fresh pool is built on restart.
pub struct AgentPool {
    agents: Vec<Box<dyn Agent>>,
}

impl AgentPool {
    /// Build a pool from every known agent that reports itself available.
    pub fn discover(candidates: Vec<Box<dyn Agent>>) -> Self {
        let agents = candidates
            .into_iter()
            .filter(|agent| agent.is_available())
            .collect();
        Self { agents }
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn available_names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    /// Uniformly-random pick among the remaining agents.
    pub fn select(&self) -> Option<&dyn Agent> {
        self.select_with(&mut rand::rng())
    }

    /// Same as [`Self::select`] but against a caller-supplied RNG, so tests
    /// can assert a specific pick deterministically.
    pub fn select_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&dyn Agent> {
        if self.agents.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.agents.len());
        self.agents.get(index).map(|boxed| boxed.as_ref())
    }

    /// Drop an agent from the pool once it is found exhausted. No-op if the
    /// name isn't present.
    pub fn remove(&mut self, name: &str) {
        self.agents.retain(|agent| agent.name() != name);
    }
}
