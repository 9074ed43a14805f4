use invaders_core::sim::search::SearchLimits;
use invaders_core::sim::WorldSnapshot;
use invaders_core::tape::Action;

mod drifter;
mod gunner;
mod lookahead;

pub use drifter::DrifterStrategy;
pub use gunner::GunnerStrategy;
pub use lookahead::LookaheadStrategy;

/// One action-selection policy. The run controller is strategy-agnostic: each
/// tick it hands the current snapshot to the strategy and applies whatever
/// action comes back.
pub trait Strategy {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn reset(&mut self, seed: u32);
    fn next_action(&mut self, world: &WorldSnapshot) -> Action;
}

pub fn strategy_ids() -> Vec<&'static str> {
    vec!["lookahead", "gunner", "drifter"]
}

pub fn create_strategy(id: &str) -> Option<Box<dyn Strategy>> {
    create_strategy_with_limits(id, SearchLimits::default())
}

/// Roster lookup with an explicit search budget. Strategies that do not
/// search ignore the limits.
pub fn create_strategy_with_limits(id: &str, limits: SearchLimits) -> Option<Box<dyn Strategy>> {
    match id {
        "lookahead" => Some(Box::new(LookaheadStrategy::with_limits(limits))),
        "gunner" => Some(Box::new(GunnerStrategy::new())),
        "drifter" => Some(Box::new(DrifterStrategy::new())),
        _ => None,
    }
}

pub fn describe_strategies() -> Vec<(&'static str, &'static str)> {
    strategy_ids()
        .into_iter()
        .filter_map(|id| create_strategy(id).map(|s| (s.id(), s.description())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_ids_are_unique_and_creatable() {
        let ids = strategy_ids();
        for (i, id) in ids.iter().enumerate() {
            assert!(!ids[i + 1..].contains(id), "duplicate id {id}");
            let strategy = create_strategy(id).unwrap_or_else(|| panic!("missing {id}"));
            assert_eq!(strategy.id(), *id);
            assert!(!strategy.description().is_empty());
        }
    }

    #[test]
    fn unknown_id_is_rejected() {
        assert!(create_strategy("warthog").is_none());
    }

    #[test]
    fn descriptions_cover_the_roster() {
        let described = describe_strategies();
        assert_eq!(described.len(), strategy_ids().len());
    }
}
