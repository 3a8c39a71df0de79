//! Puzzle entities and their on-disk records.

use std::num::NonZero;

use serde::{Deserialize, Serialize};

use crate::location::{Coord, Location};
use crate::step::Step;

/// How an [`EdgeMark`] constrains its edge.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintStyle {
    /// The path must use this edge.
    Line,
    /// The path must not use this edge.
    Cross,
}

impl HintStyle {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "line" => Some(Self::Line),
            "cross" => Some(Self::Cross),
            _ => None,
        }
    }

    /// The `style` written in puzzle files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Cross => "cross",
        }
    }
}

/// A line or a cross on the edge leaving `at` toward `dir`.
///
/// `dir` is always a forward step; see [`EdgeMark::new`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeMark {
    /// The lower endpoint of the edge.
    pub at: Location,
    /// Forward step from `at` to the other endpoint.
    pub dir: Step,
    /// Line or cross.
    pub style: HintStyle,
}

impl EdgeMark {
    /// Construct a mark, renaming an edge given by a backward step (`left`, `up`) after its other endpoint.
    pub fn new(at: Location, dir: Step, style: HintStyle) -> Self {
        if dir.is_forward() {
            Self { at, dir, style }
        } else {
            Self { at: dir.attempt_from(at), dir: dir.invert(), style }
        }
    }

    /// A line on the edge leaving `at` toward `dir`.
    pub fn line(at: Location, dir: Step) -> Self {
        Self::new(at, dir, HintStyle::Line)
    }

    /// A cross on the edge leaving `at` toward `dir`.
    pub fn cross(at: Location, dir: Step) -> Self {
        Self::new(at, dir, HintStyle::Cross)
    }

    /// The location on the other side of the marked edge.
    pub fn far_end(&self) -> Location {
        self.dir.attempt_from(self.at)
    }
}

/// Where an entity sits relative to the grid.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Placement {
    /// Inside a cell.
    Cell,
    /// On the top left corner of the cell with the same coordinates.
    Vertex,
    /// On an edge leaving a cell.
    Edge,
}

/// Static behavior of an [`EntityKind`], as consulted by editors and the model builder.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Capabilities {
    /// Cell, vertex or edge.
    pub placement: Placement,
    /// Carries a number editable in place.
    pub has_number: bool,
    /// Carries a direction chosen while placing.
    pub has_direction: bool,
    /// Placed continuously while dragging, like a pen.
    pub is_continuous_tool: bool,
    /// Draw order; higher is drawn later.
    pub z_index: i32,
}

/// Entities sharing a layer at the same location replace one another.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Layer {
    /// Unrecognized entities.
    Default,
    /// Plain floor.
    Floor,
    /// Floor that must be visited.
    FloorSimpleLoop,
    /// Endpoints and arrows.
    CellCenter,
    /// Slitherlink clues.
    Vertex,
    /// Line hints, one layer per forward step.
    Edge(Step),
}

/// The closed set of entity kinds understood by this crate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntityKind {
    /// See [`Entity::FloorCell`].
    FloorCell,
    /// See [`Entity::EndPoint`].
    EndPoint,
    /// See [`Entity::SimpleLoop`].
    SimpleLoop,
    /// See [`Entity::SlitherlinkClue`].
    SlitherlinkClue,
    /// See [`Entity::YajilinArrow`].
    YajilinArrow,
    /// See [`Entity::LineHint`].
    LineHint,
    /// Any `type` this crate does not know; kept so it still counts toward the puzzle's extent.
    Unrecognized,
}

impl EntityKind {
    /// Resolve the `type` field of a puzzle record.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "FloorCell" => Self::FloorCell,
            "EndPoint" => Self::EndPoint,
            "Simpleloop" | "SimpleLoop" => Self::SimpleLoop,
            "Slitherlink" | "SlitherlinkClue" => Self::SlitherlinkClue,
            "YajilinArrow" => Self::YajilinArrow,
            "line-hint" | "Solve_mode" => Self::LineHint,
            _ => Self::Unrecognized,
        }
    }

    /// The `type` written for this kind, or [`None`] for [`Self::Unrecognized`], whose original name is kept instead.
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::FloorCell => Some("FloorCell"),
            Self::EndPoint => Some("EndPoint"),
            Self::SimpleLoop => Some("Simpleloop"),
            Self::SlitherlinkClue => Some("Slitherlink"),
            Self::YajilinArrow => Some("YajilinArrow"),
            Self::LineHint => Some("line-hint"),
            Self::Unrecognized => None,
        }
    }

    /// How entities of this kind are placed and drawn.
    pub const fn capabilities(&self) -> Capabilities {
        const fn cell(z_index: i32, has_number: bool, has_direction: bool) -> Capabilities {
            Capabilities {
                placement: Placement::Cell,
                has_number,
                has_direction,
                is_continuous_tool: false,
                z_index,
            }
        }

        match self {
            Self::FloorCell | Self::Unrecognized => cell(0, false, false),
            Self::SimpleLoop => cell(5, false, false),
            Self::EndPoint => cell(10, true, false),
            Self::YajilinArrow => cell(10, true, true),
            Self::SlitherlinkClue => Capabilities {
                placement: Placement::Vertex,
                has_number: true,
                has_direction: false,
                is_continuous_tool: false,
                z_index: 20,
            },
            Self::LineHint => Capabilities {
                placement: Placement::Edge,
                has_number: false,
                has_direction: false,
                is_continuous_tool: true,
                z_index: 100,
            },
        }
    }
}

/// A single placed puzzle entity.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Entity {
    /// Traversable terrain with no further constraint.
    FloorCell {
        /// The cell.
        at: Location,
    },
    /// A path terminus. Exactly two endpoints sharing `pair` must be joined by one path.
    EndPoint {
        /// The cell.
        at: Location,
        /// Which pair this endpoint belongs to.
        pair: NonZero<u32>,
    },
    /// Traversable terrain which some path must pass through.
    SimpleLoop {
        /// The cell.
        at: Location,
    },
    /// Exactly `target` of the four edges meeting at vertex `at` carry a line.
    SlitherlinkClue {
        /// The top left corner of cell `at`.
        at: Location,
        /// Lines required around the vertex.
        target: u32,
    },
    /// Editor-only clue; it constrains nothing.
    YajilinArrow {
        /// The cell.
        at: Location,
        /// The number shown.
        num: u32,
        /// Where the arrow points.
        dir: Step,
    },
    /// A line or cross on one edge.
    LineHint {
        /// The edge and style, normalized to a forward step.
        mark: EdgeMark,
        /// Where the hint was put down: `mark.at`, or `mark.far_end()` for a hint given with `left` or `up`.
        placed: Location,
    },
    /// A record of a `type` this crate does not know.
    Unrecognized {
        /// The record's location.
        at: Location,
        /// The record's `type`, written back unchanged.
        type_name: String,
    },
}

impl Entity {
    /// A hint placed at the lower endpoint of its edge.
    pub fn hint(mark: EdgeMark) -> Self {
        Self::LineHint { mark, placed: mark.at }
    }

    /// Where this entity was placed.
    pub fn at(&self) -> Location {
        match self {
            Self::FloorCell { at }
            | Self::EndPoint { at, .. }
            | Self::SimpleLoop { at }
            | Self::SlitherlinkClue { at, .. }
            | Self::YajilinArrow { at, .. }
            | Self::Unrecognized { at, .. } => *at,
            Self::LineHint { placed, .. } => *placed,
        }
    }

    /// The location and layer this entity occupies; hints occupy their edge, whichever end they were placed at.
    pub(crate) fn slot(&self) -> (Location, Layer) {
        match self {
            Self::LineHint { mark, .. } => (mark.at, self.layer()),
            _ => (self.at(), self.layer()),
        }
    }

    /// The kind of this entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::FloorCell { .. } => EntityKind::FloorCell,
            Self::EndPoint { .. } => EntityKind::EndPoint,
            Self::SimpleLoop { .. } => EntityKind::SimpleLoop,
            Self::SlitherlinkClue { .. } => EntityKind::SlitherlinkClue,
            Self::YajilinArrow { .. } => EntityKind::YajilinArrow,
            Self::LineHint { .. } => EntityKind::LineHint,
            Self::Unrecognized { .. } => EntityKind::Unrecognized,
        }
    }

    /// See [`EntityKind::capabilities`].
    pub fn capabilities(&self) -> Capabilities {
        self.kind().capabilities()
    }

    /// Entities sharing a location and a layer replace one another; see [`crate::Puzzle::place`].
    pub fn layer(&self) -> Layer {
        match self {
            Self::FloorCell { .. } => Layer::Floor,
            Self::SimpleLoop { .. } => Layer::FloorSimpleLoop,
            Self::EndPoint { .. } | Self::YajilinArrow { .. } => Layer::CellCenter,
            Self::SlitherlinkClue { .. } => Layer::Vertex,
            Self::LineHint { mark, .. } => Layer::Edge(mark.dir),
            Self::Unrecognized { .. } => Layer::Default,
        }
    }

    /// Whether a path may run through this entity's cell.
    pub fn is_traversable(&self) -> bool {
        matches!(self, Self::FloorCell { .. } | Self::EndPoint { .. } | Self::SimpleLoop { .. })
    }
}

/// Reasons a puzzle record cannot be turned into an [`Entity`].
#[derive(Clone, Debug, Eq, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EntityError {
    /// A number out of range for its kind, such as a negative clue or a zero pair.
    #[display("{kind} at ({x}, {y}) has invalid number {num}")]
    InvalidNumber {
        /// The record's `type`.
        kind: &'static str,
        /// Record `x`.
        x: Coord,
        /// Record `y`.
        y: Coord,
        /// The offending number.
        num: i64,
    },
    /// A `dir` other than `up`, `down`, `left` or `right`.
    #[display("unknown direction {dir:?} at ({x}, {y})")]
    InvalidDirection {
        /// Record `x`.
        x: Coord,
        /// Record `y`.
        y: Coord,
        /// The offending direction.
        dir: String,
    },
    /// A `style` other than `line` or `cross`.
    #[display("unknown hint style {style:?} at ({x}, {y})")]
    InvalidStyle {
        /// Record `x`.
        x: Coord,
        /// Record `y`.
        y: Coord,
        /// The offending style.
        style: String,
    },
}

/// The on-disk form of an entity: `{"type": ..., "x": ..., "y": ..., "data": {...}}`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// The entity kind, as named by the editor.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Column; grows to the right.
    pub x: Coord,
    /// Row; grows downward.
    pub y: Coord,
    /// Kind-specific settings; missing keys take the editor's defaults.
    #[serde(default)]
    pub data: RecordData,
}

/// Recognized keys of [`EntityRecord::data`]; any other key is ignored.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecordData {
    /// Pair id, clue target or arrow count. Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<i64>,
    /// `up`, `down`, `left` or `right`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// `line` or `cross`. Defaults to `line`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl EntityRecord {
    fn location(&self) -> Location {
        Location(self.x, self.y)
    }

    // a missing number defaults to 1, as freshly placed in the editor
    fn number(&self, kind: &'static str) -> Result<u32, EntityError> {
        let num = self.data.num.unwrap_or(1);
        u32::try_from(num).map_err(|_| EntityError::InvalidNumber { kind, x: self.x, y: self.y, num })
    }

    fn pair(&self) -> Result<NonZero<u32>, EntityError> {
        let num = self.data.num.unwrap_or(1);
        u32::try_from(num)
            .ok()
            .and_then(NonZero::new)
            .ok_or(EntityError::InvalidNumber { kind: "EndPoint", x: self.x, y: self.y, num })
    }

    fn direction(&self, default: Step) -> Result<Step, EntityError> {
        match self.data.dir.as_deref() {
            None => Ok(default),
            Some("up") => Ok(Step::Up),
            Some("down") => Ok(Step::Down),
            Some("left") => Ok(Step::Left),
            Some("right") => Ok(Step::Right),
            Some(other) => Err(EntityError::InvalidDirection { x: self.x, y: self.y, dir: other.to_owned() }),
        }
    }

    fn style(&self) -> Result<HintStyle, EntityError> {
        match self.data.style.as_deref() {
            None => Ok(HintStyle::Line),
            Some(name) => HintStyle::parse(name)
                .ok_or_else(|| EntityError::InvalidStyle { x: self.x, y: self.y, style: name.to_owned() }),
        }
    }
}

impl TryFrom<EntityRecord> for Entity {
    type Error = EntityError;

    fn try_from(record: EntityRecord) -> Result<Self, Self::Error> {
        let at = record.location();

        Ok(match EntityKind::from_type_name(&record.type_name) {
            EntityKind::FloorCell => Self::FloorCell { at },
            EntityKind::EndPoint => Self::EndPoint { at, pair: record.pair()? },
            EntityKind::SimpleLoop => Self::SimpleLoop { at },
            EntityKind::SlitherlinkClue => Self::SlitherlinkClue { at, target: record.number("Slitherlink")? },
            EntityKind::YajilinArrow => Self::YajilinArrow {
                at,
                num: record.number("YajilinArrow")?,
                dir: record.direction(Step::Up)?,
            },
            EntityKind::LineHint => Self::LineHint {
                mark: EdgeMark::new(at, record.direction(Step::Right)?, record.style()?),
                placed: at,
            },
            EntityKind::Unrecognized => Self::Unrecognized { at, type_name: record.type_name },
        })
    }
}

impl From<&Entity> for EntityRecord {
    fn from(entity: &Entity) -> Self {
        let Location(x, y) = entity.at();
        let type_name = match entity {
            Entity::Unrecognized { type_name, .. } => type_name.clone(),
            _ => entity.kind().type_name().unwrap_or_default().to_owned(),
        };

        let data = match entity {
            Entity::EndPoint { pair, .. } => RecordData { num: Some(i64::from(pair.get())), ..Default::default() },
            Entity::SlitherlinkClue { target, .. } => RecordData { num: Some(i64::from(*target)), ..Default::default() },
            Entity::YajilinArrow { num, dir, .. } => RecordData {
                num: Some(i64::from(*num)),
                dir: Some(dir.name().to_owned()),
                style: None,
            },
            Entity::LineHint { mark, placed } => RecordData {
                num: None,
                // written from where it was placed, so it reads back unchanged
                dir: Some(if *placed == mark.at { mark.dir } else { mark.dir.invert() }.name().to_owned()),
                style: Some(mark.style.name().to_owned()),
            },
            Entity::FloorCell { .. } | Entity::SimpleLoop { .. } | Entity::Unrecognized { .. } => RecordData::default(),
        };

        Self { type_name, x, y, data }
    }
}

impl From<EdgeMark> for EntityRecord {
    fn from(mark: EdgeMark) -> Self {
        Self::from(&Entity::hint(mark))
    }
}
