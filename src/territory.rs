//! Claim bookkeeping. Every tile carries two independent books, one for
//! faction claimants and one for nation claimants; ownership is derived from
//! the accumulated scores and never stored.

use serde::{Deserialize, Serialize};

use crate::world::{FactionId, NationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    Faction,
    Nation,
}

impl ClaimKind {
    pub const ALL: [ClaimKind; 2] = [ClaimKind::Faction, ClaimKind::Nation];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Claimant {
    Faction(FactionId),
    Nation(NationId),
}

impl Claimant {
    pub fn kind(self) -> ClaimKind {
        match self {
            Claimant::Faction(_) => ClaimKind::Faction,
            Claimant::Nation(_) => ClaimKind::Nation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OwnershipChange {
    pub kind: ClaimKind,
    pub previous: Option<Claimant>,
    pub current: Option<Claimant>,
}

/// Scores kept in first-claim order. The order matters: `owner` only replaces
/// the running leader on a strictly greater score, so on a tie the claimant
/// that claimed first keeps the tile.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimBook<K> {
    entries: Vec<(K, i64)>,
}

impl<K> Default for ClaimBook<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq> ClaimBook<K> {
    pub fn add(&mut self, claimant: K, delta: i64) {
        match self.entries.iter_mut().find(|(k, _)| *k == claimant) {
            Some((_, score)) => *score += delta,
            None => self.entries.push((claimant, delta)),
        }
    }

    pub fn score(&self, claimant: K) -> i64 {
        self.entries
            .iter()
            .find(|(k, _)| *k == claimant)
            .map(|(_, score)| *score)
            .unwrap_or(0)
    }

    pub fn owner(&self) -> Option<K> {
        let mut top: Option<(K, i64)> = None;
        for &(claimant, score) in &self.entries {
            if score <= 0 {
                continue;
            }
            match top {
                Some((_, best)) if best >= score => {}
                _ => top = Some((claimant, score)),
            }
        }
        top.map(|(claimant, _)| claimant)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, i64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Round-start drift: the owner gains `strengthen`, every other claimant
    /// still holding a positive score loses `weaken`. No owner, no change.
    pub fn reinforce(&mut self, strengthen: i64, weaken: i64) {
        let Some(owner) = self.owner() else {
            return;
        };
        for (claimant, score) in &mut self.entries {
            if *claimant == owner {
                *score += strengthen;
            } else if *score > 0 {
                *score -= weaken;
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClaimLedger {
    factions: ClaimBook<FactionId>,
    nations: ClaimBook<NationId>,
}

impl ClaimLedger {
    pub fn add_claim(&mut self, claimant: Claimant, delta: i64) -> Option<OwnershipChange> {
        let kind = claimant.kind();
        let previous = self.owner(kind);
        match claimant {
            Claimant::Faction(id) => self.factions.add(id, delta),
            Claimant::Nation(id) => self.nations.add(id, delta),
        }
        self.change_since(kind, previous)
    }

    pub fn owner(&self, kind: ClaimKind) -> Option<Claimant> {
        match kind {
            ClaimKind::Faction => self.factions.owner().map(Claimant::Faction),
            ClaimKind::Nation => self.nations.owner().map(Claimant::Nation),
        }
    }

    pub fn faction_owner(&self) -> Option<FactionId> {
        self.factions.owner()
    }

    pub fn nation_owner(&self) -> Option<NationId> {
        self.nations.owner()
    }

    pub fn score(&self, claimant: Claimant) -> i64 {
        match claimant {
            Claimant::Faction(id) => self.factions.score(id),
            Claimant::Nation(id) => self.nations.score(id),
        }
    }

    pub fn factions(&self) -> &ClaimBook<FactionId> {
        &self.factions
    }

    pub fn nations(&self) -> &ClaimBook<NationId> {
        &self.nations
    }

    pub fn reinforce(
        &mut self,
        kind: ClaimKind,
        strengthen: i64,
        weaken: i64,
    ) -> Option<OwnershipChange> {
        let previous = self.owner(kind);
        match kind {
            ClaimKind::Faction => self.factions.reinforce(strengthen, weaken),
            ClaimKind::Nation => self.nations.reinforce(strengthen, weaken),
        }
        self.change_since(kind, previous)
    }

    fn change_since(&self, kind: ClaimKind, previous: Option<Claimant>) -> Option<OwnershipChange> {
        let current = self.owner(kind);
        (current != previous).then_some(OwnershipChange {
            kind,
            previous,
            current,
        })
    }
}
