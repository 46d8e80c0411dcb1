//! The fixed component set and the per-entity component table.
//!
//! Component kinds form a closed enumeration ([`ComponentKind`]). Each entity
//! owns a [`ComponentTable`]: one slot per kind, indexed by the kind's
//! discriminant, so lookups are an array index instead of a type-map lookup.
//! The [`ComponentType`] trait ties each concrete struct to its slot and is
//! what queries use to request typed access.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::EcsError;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Discriminant for every component an entity may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    Transform,
    PhysicsBody,
    Sprite,
    PlayerController,
    AiFollow,
}

impl ComponentKind {
    /// Number of kinds; the size of a [`ComponentTable`].
    pub const COUNT: usize = 5;

    pub const ALL: [ComponentKind; Self::COUNT] = [
        ComponentKind::Transform,
        ComponentKind::PhysicsBody,
        ComponentKind::Sprite,
        ComponentKind::PlayerController,
        ComponentKind::AiFollow,
    ];

    /// Slot index inside a [`ComponentTable`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "transform",
            ComponentKind::PhysicsBody => "physics_body",
            ComponentKind::Sprite => "sprite",
            ComponentKind::PlayerController => "player_controller",
            ComponentKind::AiFollow => "ai_follow",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an entity *is*. Collision reactions are keyed by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Snake,
    Food,
    Wall,
}

/// A named reaction a [`PhysicsBody`] performs when it touches an entity of a
/// given [`EntityKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    EatFood,
    HitWall,
    HitSelf,
}

// ---------------------------------------------------------------------------
// Component data
// ---------------------------------------------------------------------------

/// Integer world-space box. `(x, y)` is the top-left corner.
///
/// Extents are positive for every value built through [`Transform::new`] or
/// deserialized. The fields stay public so movement can rewrite `x`/`y`;
/// code writing `width`/`height` directly must keep them positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TransformData")]
pub struct Transform {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Deserialize)]
struct TransformData {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl TryFrom<TransformData> for Transform {
    type Error = EcsError;

    fn try_from(data: TransformData) -> Result<Self, Self::Error> {
        Self::new(data.x, data.y, data.width, data.height)
    }
}

impl Transform {
    /// Build a transform, rejecting non-positive extents.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Result<Self, EcsError> {
        if width <= 0 || height <= 0 {
            return Err(EcsError::InvalidExtent { width, height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// A `size`×`size` square at `(x, y)`.
    pub fn square(x: i32, y: i32, size: i32) -> Result<Self, EcsError> {
        Self::new(x, y, size, size)
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Grid-stepping body plus the collision reaction table.
///
/// `x_dir`/`y_dir` are the intended cell delta for the next movement pass and
/// are always in `{-1, 0, 1}`. `vel_x`/`vel_y` are carried for compatibility
/// with velocity-based bodies; the movement pass ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub vel_x: i32,
    pub vel_y: i32,
    pub x_dir: i32,
    pub y_dir: i32,
    pub handlers: BTreeMap<EntityKind, Vec<Reaction>>,
}

impl PhysicsBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: start moving in `(x_dir, y_dir)`.
    pub fn with_direction(mut self, x_dir: i32, y_dir: i32) -> Self {
        self.set_direction(x_dir, y_dir);
        self
    }

    /// Builder: react with `reaction` on contact with `kind`.
    pub fn on(mut self, kind: EntityKind, reaction: Reaction) -> Self {
        self.register(kind, reaction);
        self
    }

    pub fn register(&mut self, kind: EntityKind, reaction: Reaction) {
        self.handlers.entry(kind).or_default().push(reaction);
    }

    /// Reactions registered for `kind`; empty when none are.
    pub fn reactions_for(&self, kind: EntityKind) -> &[Reaction] {
        self.handlers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn direction(&self) -> (i32, i32) {
        (self.x_dir, self.y_dir)
    }

    /// Set the intended step, clamping each axis into `{-1, 0, 1}`.
    pub fn set_direction(&mut self, x_dir: i32, y_dir: i32) {
        self.x_dir = x_dir.clamp(-1, 1);
        self.y_dir = y_dir.clamp(-1, 1);
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalized RGBA with full opacity.
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }
}

/// Draw-only appearance data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Sprite {
    Box {
        width: i32,
        height: i32,
        color: Color,
        /// Draw only the border instead of filling.
        outline: bool,
    },
    Circle {
        radius: i32,
        color: Color,
    },
}

/// Marks the entity that keyboard input steers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerController;

/// Chase another entity one cell per tick.
///
/// The target is a non-owning handle; once the target is despawned the handle
/// no longer resolves and the follower simply stops being steered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiFollow {
    pub target: EntityId,
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A component value of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Component {
    Transform(Transform),
    PhysicsBody(PhysicsBody),
    Sprite(Sprite),
    PlayerController(PlayerController),
    AiFollow(AiFollow),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Transform(_) => ComponentKind::Transform,
            Component::PhysicsBody(_) => ComponentKind::PhysicsBody,
            Component::Sprite(_) => ComponentKind::Sprite,
            Component::PlayerController(_) => ComponentKind::PlayerController,
            Component::AiFollow(_) => ComponentKind::AiFollow,
        }
    }
}

/// Typed access to one slot of a [`ComponentTable`].
pub trait ComponentType: Into<Component> + Sized + 'static {
    const KIND: ComponentKind;

    fn from_ref(component: &Component) -> Option<&Self>;
    fn from_mut(component: &mut Component) -> Option<&mut Self>;
    fn from_owned(component: Component) -> Option<Self>;
}

macro_rules! component_type {
    ($ty:ident) => {
        impl From<$ty> for Component {
            fn from(value: $ty) -> Self {
                Component::$ty(value)
            }
        }

        impl ComponentType for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn from_ref(component: &Component) -> Option<&Self> {
                match component {
                    Component::$ty(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$ty(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_owned(component: Component) -> Option<Self> {
                match component {
                    Component::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

component_type!(Transform);
component_type!(PhysicsBody);
component_type!(Sprite);
component_type!(PlayerController);
component_type!(AiFollow);

// ---------------------------------------------------------------------------
// ComponentTable
// ---------------------------------------------------------------------------

/// One optional slot per [`ComponentKind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentTable {
    slots: [Option<Component>; ComponentKind::COUNT],
}

impl ComponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `component` in its slot, returning whatever was there before.
    pub fn insert(&mut self, component: impl Into<Component>) -> Option<Component> {
        let component = component.into();
        let slot = component.kind().index();
        self.slots[slot].replace(component)
    }

    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.slots[T::KIND.index()].as_ref().and_then(T::from_ref)
    }

    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.slots[T::KIND.index()].as_mut().and_then(T::from_mut)
    }

    /// Take the component of type `T` out; `None` if the slot is empty.
    pub fn remove<T: ComponentType>(&mut self) -> Option<T> {
        self.slots[T::KIND.index()].take().and_then(T::from_owned)
    }

    #[inline]
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Kinds currently present, in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        ComponentKind::ALL.into_iter().filter(|k| self.has(*k))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
