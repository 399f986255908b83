//! Player state and resource management.
//!
//! This module contains:
//! - `HexPosition` and `Road`, the placement coordinates players build on
//! - `ResourceHand` for managing resource counts
//! - Development card types
//! - Building costs
//! - The `Player` struct, whose victory points stay in sync with its holdings

use crate::board::Resource;
use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Player identifier, as supplied by whoever seats the players
pub type PlayerId = u32;

/// Location of a settlement or city, or a road endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexPosition {
    pub q: i32,
    pub r: i32,
}

impl HexPosition {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The grid cell this position names
    pub const fn coord(&self) -> HexCoord {
        HexCoord::new(self.q, self.r)
    }

    /// Distance to another position (in hex steps)
    pub fn distance_to(&self, other: &HexPosition) -> u32 {
        self.coord().distance_to(&other.coord())
    }
}

impl From<HexCoord> for HexPosition {
    fn from(coord: HexCoord) -> Self {
        Self::new(coord.q, coord.r)
    }
}

/// An undirected road between two positions.
///
/// `Road::new(a, b)` and `Road::new(b, a)` compare and hash equal.
#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
pub struct Road {
    pub start: HexPosition,
    pub end: HexPosition,
}

impl Road {
    pub const fn new(start: HexPosition, end: HexPosition) -> Self {
        Self { start, end }
    }

    /// Endpoints in a fixed order regardless of direction
    fn key(&self) -> (HexPosition, HexPosition) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    /// Whether either end of this road is at `position`
    pub fn touches(&self, position: &HexPosition) -> bool {
        self.start == *position || self.end == *position
    }

    /// Whether the two roads share an endpoint
    pub fn connects_to(&self, other: &Road) -> bool {
        self.touches(&other.start) || self.touches(&other.end)
    }
}

impl PartialEq for Road {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Hash for Road {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DevelopmentCard {
    /// Move robber and steal, counts toward Largest Army
    Knight,
    /// Immediately worth 1 VP
    VictoryPoint,
    /// Build 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    YearOfPlenty,
    /// All players must give you all of one resource type
    Monopoly,
}

impl DevelopmentCard {
    /// Victory points the card is worth while held
    pub fn victory_points(&self) -> u32 {
        match self {
            DevelopmentCard::VictoryPoint => 1,
            _ => 0,
        }
    }
}

/// A hand of resources. Every resource is always present, possibly at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub brick: u32,
    pub ore: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, sheep: u32, wheat: u32, brick: u32, ore: u32) -> Self {
        Self {
            wood,
            sheep,
            wheat,
            brick,
            ore,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.sheep + self.wheat + self.brick + self.ore
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Brick => self.brick,
            Resource::Ore => self.ore,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Sheep => &mut self.sheep,
            Resource::Wheat => &mut self.wheat,
            Resource::Brick => &mut self.brick,
            Resource::Ore => &mut self.ore,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        *self.slot(resource) = count;
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL
            .iter()
            .all(|&resource| self.get(resource) >= cost.get(resource))
    }

    /// Try to subtract, returning false (and leaving the hand untouched) if insufficient
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for resource in Resource::ALL {
            *self.slot(resource) -= cost.get(resource);
        }
        true
    }

    /// Iterate `(resource, count)` for all five resources
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL.into_iter().map(move |r| (r, self.get(r)))
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 brick, 1 wood
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 0, 0, 1, 0)
    }

    /// Cost to build a settlement: 1 brick, 1 wood, 1 wheat, 1 sheep
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 3 ore, 2 wheat
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 2, 0, 3)
    }

    /// Cost to buy a development card: 1 ore, 1 wheat, 1 sheep
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 1, 1, 0, 1)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Free-form colour label ("red", "blue", ...)
    pub color: String,
    pub resources: ResourceHand,
    settlements: Vec<HexPosition>,
    cities: Vec<HexPosition>,
    roads: Vec<Road>,
    victory_points: u32,
    development_cards: Vec<DevelopmentCard>,
}

impl Player {
    /// Create a new player with an empty hand and nothing built
    pub fn new(id: PlayerId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            resources: ResourceHand::new(),
            settlements: Vec::new(),
            cities: Vec::new(),
            roads: Vec::new(),
            victory_points: 0,
            development_cards: Vec::new(),
        }
    }

    pub fn settlements(&self) -> &[HexPosition] {
        &self.settlements
    }

    pub fn cities(&self) -> &[HexPosition] {
        &self.cities
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn development_cards(&self) -> &[DevelopmentCard] {
        &self.development_cards
    }

    /// Victory points from buildings and held victory-point cards
    pub fn victory_points(&self) -> u32 {
        self.victory_points
    }

    /// Whether this player has a settlement or city at `position`
    pub fn has_building_at(&self, position: &HexPosition) -> bool {
        self.settlements.contains(position) || self.cities.contains(position)
    }

    pub fn has_settlement_at(&self, position: &HexPosition) -> bool {
        self.settlements.contains(position)
    }

    /// Whether one of this player's roads ends at `position`
    pub fn has_road_touching(&self, position: &HexPosition) -> bool {
        self.roads.iter().any(|road| road.touches(position))
    }

    pub fn has_road(&self, road: &Road) -> bool {
        self.roads.contains(road)
    }

    // ==================== Mutation Methods ====================

    /// Record a settlement (assumes validation already done)
    pub fn add_settlement(&mut self, position: HexPosition) {
        self.settlements.push(position);
        self.refresh_victory_points();
    }

    /// Replace the settlement at `position` with a city.
    ///
    /// Returns false, changing nothing, if there is no settlement there.
    pub fn upgrade_to_city(&mut self, position: HexPosition) -> bool {
        let Some(index) = self.settlements.iter().position(|p| *p == position) else {
            return false;
        };
        self.settlements.remove(index);
        self.cities.push(position);
        self.refresh_victory_points();
        true
    }

    /// Record a road (assumes validation already done)
    pub fn add_road(&mut self, road: Road) {
        self.roads.push(road);
    }

    pub fn add_development_card(&mut self, card: DevelopmentCard) {
        self.development_cards.push(card);
        self.refresh_victory_points();
    }

    fn refresh_victory_points(&mut self) {
        let buildings = self.settlements.len() as u32 + 2 * self.cities.len() as u32;
        let cards: u32 = self
            .development_cards
            .iter()
            .map(DevelopmentCard::victory_points)
            .sum();
        self.victory_points = buildings + cards;
    }
}
