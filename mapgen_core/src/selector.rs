use map_runtime::{TerrainEntry, TerrainId, TerrainProperty, TerrainRuleset};

use crate::random::RandomSource;

/// `(target, prefer, avoid)` triple; `None` leaves the slot unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionRequest {
    pub target: Option<TerrainProperty>,
    pub prefer: Option<TerrainProperty>,
    pub avoid: Option<TerrainProperty>,
}

impl SelectionRequest {
    pub const fn new(
        target: Option<TerrainProperty>,
        prefer: Option<TerrainProperty>,
        avoid: Option<TerrainProperty>,
    ) -> Self {
        Self {
            target,
            prefer,
            avoid,
        }
    }

    /// Clears one slot; returns whether it was set.
    fn relax(&mut self, constraint: Constraint) -> bool {
        let slot = match constraint {
            Constraint::Prefer => &mut self.prefer,
            Constraint::Avoid => &mut self.avoid,
            Constraint::Target => &mut self.target,
        };
        slot.take().is_some()
    }

    fn weight_of(&self, entry: &TerrainEntry) -> u32 {
        if let Some(avoid) = self.avoid {
            if entry.weight(avoid) > 0 {
                return 0;
            }
        }
        if let Some(prefer) = self.prefer {
            if entry.weight(prefer) == 0 {
                return 0;
            }
        }
        match self.target {
            Some(target) => u32::from(entry.weight(target)),
            None => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Prefer,
    Avoid,
    Target,
}

/// Order in which constraints are dropped when nothing matches.
pub const RELAXATION_ORDER: [Constraint; 3] =
    [Constraint::Prefer, Constraint::Avoid, Constraint::Target];

/// Weighted terrain pick over the generated land entries of a ruleset.
#[derive(Debug, Clone, Copy)]
pub struct TerrainSelector<'a> {
    ruleset: &'a TerrainRuleset,
}

impl<'a> TerrainSelector<'a> {
    pub fn new(ruleset: &'a TerrainRuleset) -> Self {
        Self { ruleset }
    }

    pub fn ruleset(&self) -> &'a TerrainRuleset {
        self.ruleset
    }

    /// Draws exactly once per call, after relaxing as far as needed.
    pub fn pick(&self, request: SelectionRequest, rng: &mut dyn RandomSource) -> TerrainId {
        let mut request = request;
        let mut relaxations = RELAXATION_ORDER.iter();
        loop {
            let sum: u32 = self
                .ruleset
                .generated_land()
                .map(|entry| request.weight_of(entry))
                .sum();
            if sum > 0 {
                let mut pick = ((rng.next_unit() * f64::from(sum)).floor() as u32).min(sum - 1);
                for entry in self.ruleset.generated_land() {
                    let weight = request.weight_of(entry);
                    if weight == 0 {
                        continue;
                    }
                    if pick < weight {
                        return entry.id;
                    }
                    pick -= weight;
                }
                break;
            }
            let Some(constraint) = relaxations.next() else {
                break;
            };
            if request.relax(*constraint) {
                tracing::trace!(
                    target: "mapgen::selector",
                    constraint = ?constraint,
                    "mapgen.selector.relaxed"
                );
            }
        }
        self.fallback()
    }

    /// Generated water entry whose `ocean_depth` is closest to `depth`.
    ///
    /// Ties resolve to the earlier entry. Never draws.
    pub fn pick_water(&self, depth: i32) -> TerrainId {
        self.ruleset
            .generated_water()
            .min_by_key(|entry| (i32::from(entry.weight(TerrainProperty::OceanDepth)) - depth).abs())
            .map(|entry| entry.id)
            .unwrap_or_else(|| self.ruleset.shallowest_water())
    }

    fn fallback(&self) -> TerrainId {
        tracing::warn!(
            target: "mapgen::selector",
            ruleset = self.ruleset.name(),
            "mapgen.selector.fallback"
        );
        self.ruleset
            .generated_land()
            .next()
            .map(|entry| entry.id)
            .unwrap_or(TerrainId(0))
    }
}
