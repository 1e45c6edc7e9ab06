use serde::{Deserialize, Serialize};

/// Class id of faces untouched by any feature.
pub const STOCK_LABEL: u32 = 24;
/// Class id of a through hole that hosts an exported fastener.
pub const FASTENED_HOLE_LABEL: u32 = 25;

/// Canonical class names, indexed by class id.
pub const FEATURE_NAMES: [&str; 25] = [
    "chamfer",
    "through_hole",
    "triangular_passage",
    "rectangular_passage",
    "6sides_passage",
    "triangular_through_slot",
    "rectangular_through_slot",
    "circular_through_slot",
    "rectangular_through_step",
    "2sides_through_step",
    "slanted_through_step",
    "Oring",
    "blind_hole",
    "triangular_pocket",
    "rectangular_pocket",
    "6sides_pocket",
    "circular_end_pocket",
    "rectangular_blind_slot",
    "v_circular_end_blind_slot",
    "h_circular_end_blind_slot",
    "triangular_blind_step",
    "circular_blind_step",
    "rectangular_blind_step",
    "round",
    "stock",
];

/// Machining feature classes. The discriminant is the class id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum FeatureKind {
    Chamfer = 0,
    ThroughHole = 1,
    TriangularPassage = 2,
    RectangularPassage = 3,
    SixSidesPassage = 4,
    TriangularThroughSlot = 5,
    RectangularThroughSlot = 6,
    CircularThroughSlot = 7,
    RectangularThroughStep = 8,
    TwoSidesThroughStep = 9,
    SlantedThroughStep = 10,
    ORing = 11,
    BlindHole = 12,
    TriangularPocket = 13,
    RectangularPocket = 14,
    SixSidesPocket = 15,
    CircularEndPocket = 16,
    RectangularBlindSlot = 17,
    VCircularEndBlindSlot = 18,
    HCircularEndBlindSlot = 19,
    TriangularBlindStep = 20,
    CircularBlindStep = 21,
    RectangularBlindStep = 22,
    Round = 23,
}

/// How deep a feature's removal tool reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthKind {
    /// Passes through the whole stock extent; no floor.
    Through,
    /// Stops at a random depth; leaves a floor.
    Blind,
    /// Edge treatment (chamfer, round).
    Transition,
}

/// Coarse grouping used by the category ordering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FeatureCategory {
    Step,
    Slot,
    Through,
    Blind,
    ORing,
    Transition,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 24] = [
        FeatureKind::Chamfer,
        FeatureKind::ThroughHole,
        FeatureKind::TriangularPassage,
        FeatureKind::RectangularPassage,
        FeatureKind::SixSidesPassage,
        FeatureKind::TriangularThroughSlot,
        FeatureKind::RectangularThroughSlot,
        FeatureKind::CircularThroughSlot,
        FeatureKind::RectangularThroughStep,
        FeatureKind::TwoSidesThroughStep,
        FeatureKind::SlantedThroughStep,
        FeatureKind::ORing,
        FeatureKind::BlindHole,
        FeatureKind::TriangularPocket,
        FeatureKind::RectangularPocket,
        FeatureKind::SixSidesPocket,
        FeatureKind::CircularEndPocket,
        FeatureKind::RectangularBlindSlot,
        FeatureKind::VCircularEndBlindSlot,
        FeatureKind::HCircularEndBlindSlot,
        FeatureKind::TriangularBlindStep,
        FeatureKind::CircularBlindStep,
        FeatureKind::RectangularBlindStep,
        FeatureKind::Round,
    ];

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<FeatureKind> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self as usize]
    }

    pub fn from_name(name: &str) -> Option<FeatureKind> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub fn depth(self) -> DepthKind {
        use FeatureKind::*;
        match self {
            Chamfer | Round => DepthKind::Transition,
            ThroughHole | TriangularPassage | RectangularPassage | SixSidesPassage
            | TriangularThroughSlot | RectangularThroughSlot | CircularThroughSlot
            | RectangularThroughStep | TwoSidesThroughStep | SlantedThroughStep => {
                DepthKind::Through
            }
            _ => DepthKind::Blind,
        }
    }

    pub fn category(self) -> FeatureCategory {
        use FeatureKind::*;
        match self {
            Chamfer | Round => FeatureCategory::Transition,
            RectangularThroughStep | TwoSidesThroughStep | SlantedThroughStep
            | TriangularBlindStep | CircularBlindStep | RectangularBlindStep => {
                FeatureCategory::Step
            }
            TriangularThroughSlot | RectangularThroughSlot | CircularThroughSlot
            | RectangularBlindSlot | VCircularEndBlindSlot | HCircularEndBlindSlot => {
                FeatureCategory::Slot
            }
            ThroughHole | TriangularPassage | RectangularPassage | SixSidesPassage => {
                FeatureCategory::Through
            }
            BlindHole | TriangularPocket | RectangularPocket | SixSidesPocket
            | CircularEndPocket => FeatureCategory::Blind,
            ORing => FeatureCategory::ORing,
        }
    }

    pub fn is_transition(self) -> bool {
        self.depth() == DepthKind::Transition
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
