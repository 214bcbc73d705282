//! Transform component
//!
//! Holds a node's position, rotation and scale together with three anchor
//! points ("origins") about which translation, rotation and scaling pivot.
//! Origins are either set explicitly or derived from the node's bounds
//! through [`Anchor`] flags; a node can also track the bounds of its nearest
//! bounded ancestor through relative alignment.
//!
//! The local matrix and its inverse are cached and recomputed lazily on the
//! first read after a mutation:
//!
//! ```text
//! T = Translate(position - origin_t)
//!   * [Translate(origin_r) * Rotate(rotation) * Translate(-origin_r)]
//!   * [Translate(origin_s) * Scale(scale)     * Translate(-origin_s)]
//! ```

use crate::ecs::Component;
use crate::foundation::math::{
    about_pivot, invert_or_identity, rotation_2d, scaling_2d, translation_2d, Mat4, Vec2, Vec3,
};
use crate::scene::AABB;
use bitflags::bitflags;
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

bitflags! {
    /// Selects one or more of the three origins
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OriginType: u8 {
        /// Pivot subtracted from the position
        const TRANSLATION = 1;
        /// Pivot of the rotation
        const ROTATION = 1 << 1;
        /// Pivot of the scaling
        const SCALE = 1 << 2;
        /// All three
        const ALL = Self::TRANSLATION.bits() | Self::ROTATION.bits() | Self::SCALE.bits();
    }
}

bitflags! {
    /// Symbolic reference points of a bounding box
    ///
    /// Horizontal and vertical flags compose independently; an axis with no
    /// flag keeps its current value. The empty set is [`Anchor::CUSTOM`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Anchor: u8 {
        /// Left edge (`min.x`)
        const LEFT = 1;
        /// Right edge (`max.x`)
        const RIGHT = 1 << 1;
        /// Horizontal midpoint
        const CENTER_X = 1 << 2;
        /// Top edge (`min.y`)
        const TOP = 1 << 3;
        /// Bottom edge (`max.y`)
        const BOTTOM = 1 << 4;
        /// Vertical midpoint
        const CENTER_Y = 1 << 5;
        /// Midpoint on both axes
        const CENTER = Self::CENTER_X.bits() | Self::CENTER_Y.bits();
    }
}

impl Anchor {
    /// No symbolic flags: the stored point is authoritative
    pub const CUSTOM: Self = Self::empty();

    /// Whether the stored point is authoritative
    pub fn is_custom(self) -> bool {
        self.is_empty()
    }

    /// Point of `bounds` picked by these flags; unflagged axes keep `current`.
    ///
    /// When an axis carries several flags, center wins over left/top, which
    /// wins over right/bottom.
    pub fn resolve(self, bounds: &AABB, current: Vec2) -> Vec2 {
        self.place(bounds, current, 0.0)
    }

    /// Like [`resolve`](Self::resolve), but insets edge positions by
    /// `padding`. Centered axes ignore the padding.
    pub fn place(self, bounds: &AABB, current: Vec2, padding: f32) -> Vec2 {
        let center = bounds.center();

        let x = if self.contains(Self::CENTER_X) {
            center.x
        } else if self.contains(Self::LEFT) {
            bounds.min.x + padding
        } else if self.contains(Self::RIGHT) {
            bounds.max.x - padding
        } else {
            current.x
        };

        let y = if self.contains(Self::CENTER_Y) {
            center.y
        } else if self.contains(Self::TOP) {
            bounds.min.y + padding
        } else if self.contains(Self::BOTTOM) {
            bounds.max.y - padding
        } else {
            current.y
        };

        Vec2::new(x, y)
    }
}

/// One pivot point and the flags it is derived from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    /// Current pivot, in the node's local space
    pub point: Vec2,
    /// Derivation flags; custom means `point` was set explicitly
    pub anchor: Anchor,
}

impl Default for Origin {
    fn default() -> Self {
        Self {
            point: Vec2::zeros(),
            anchor: Anchor::CUSTOM,
        }
    }
}

/// How a node's position tracks its nearest bounded ancestor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Reference point of the ancestor's bounds
    pub anchor: Anchor,
    /// Inset from the referenced edges
    pub padding: f32,
    /// Whether position is re-derived on every update
    pub enabled: bool,
}

impl Default for Alignment {
    fn default() -> Self {
        Self {
            anchor: Anchor::CUSTOM,
            padding: 0.0,
            enabled: false,
        }
    }
}

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

const ORIGIN_SLOTS: [(OriginType, usize); 3] = [
    (OriginType::TRANSLATION, 0),
    (OriginType::ROTATION, 1),
    (OriginType::SCALE, 2),
];

/// Local 2D transform of a node with anchored origins and cached matrices
#[derive(Debug, Clone)]
pub struct TransformComponent {
    position: Vec3,
    z_seeded: bool,
    z_fixed: bool,
    rotation: f32,
    scale: Vec2,
    origins: [Origin; 3],
    alignment: Alignment,

    transform: Cell<Mat4>,
    transform_dirty: Cell<bool>,
    inverse: Cell<Mat4>,
    inverse_dirty: Cell<bool>,

    revision: u64,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            z_seeded: false,
            z_fixed: false,
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            origins: [Origin::default(); 3],
            alignment: Alignment::default(),
            transform: Cell::new(Mat4::identity()),
            transform_dirty: Cell::new(false),
            inverse: Cell::new(Mat4::identity()),
            inverse_dirty: Cell::new(false),
            revision: next_revision(),
        }
    }
}

impl TransformComponent {
    /// Identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.set_position(position, None, None);
        self
    }

    /// Builder pattern: Set rotation
    pub fn with_rotation(mut self, angle: f32) -> Self {
        self.set_rotation(angle);
        self
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, sx: f32, sy: f32) -> Self {
        self.set_scale(sx, Some(sy));
        self
    }

    fn mark_dirty(&mut self) {
        self.transform_dirty.set(true);
        self.inverse_dirty.set(true);
        self.revision = next_revision();
    }

    /// Stamp that changes on every mutation. Stamps are unique across all
    /// transform components of the process.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace x/y. `z` is only overwritten when supplied; `z_fixed`, when
    /// supplied, pins the z-index against automatic z-ordering.
    pub fn set_position(&mut self, position: Vec2, z: Option<f32>, z_fixed: Option<bool>) {
        self.position.x = position.x;
        self.position.y = position.y;
        if let Some(z) = z {
            self.position.z = z;
            self.z_seeded = true;
        }
        if let Some(fixed) = z_fixed {
            self.z_fixed = fixed;
        }
        self.mark_dirty();
    }

    /// Position; `z` is 0 until explicitly seeded
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Explicitly supplied z, if any
    pub fn z_seed(&self) -> Option<f32> {
        self.z_seeded.then_some(self.position.z)
    }

    /// Whether automatic z-ordering must leave this node alone
    pub fn is_z_fixed(&self) -> bool {
        self.z_fixed
    }

    /// Translate by `offset`
    pub fn move_by(&mut self, offset: Vec2) {
        self.position.x += offset.x;
        self.position.y += offset.y;
        self.mark_dirty();
    }

    /// Set rotation in radians; no normalization is applied
    pub fn set_rotation(&mut self, angle: f32) {
        self.rotation = angle;
        self.mark_dirty();
    }

    /// Add `delta` radians
    pub fn rotate(&mut self, delta: f32) {
        self.rotation += delta;
        self.mark_dirty();
    }

    /// Rotation in radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set scale; an absent `sy` reuses `sx`. Zero is accepted.
    pub fn set_scale(&mut self, sx: f32, sy: Option<f32>) {
        self.scale = Vec2::new(sx, sy.unwrap_or(sx));
        self.mark_dirty();
    }

    /// Multiply scale componentwise; an absent `fy` reuses `fx`
    pub fn scale_by(&mut self, fx: f32, fy: Option<f32>) {
        self.scale.x *= fx;
        self.scale.y *= fy.unwrap_or(fx);
        self.mark_dirty();
    }

    /// Scale factors
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Pin the selected origins to `point` and mark them custom
    pub fn set_origin(&mut self, which: OriginType, point: Vec2) {
        for (flag, slot) in ORIGIN_SLOTS {
            if which.contains(flag) {
                self.origins[slot] = Origin {
                    point,
                    anchor: Anchor::CUSTOM,
                };
            }
        }
        self.mark_dirty();
    }

    /// Derive the selected origins from bounds on the next
    /// [`update_properties`](Self::update_properties)
    pub fn set_origin_flags(&mut self, which: OriginType, anchor: Anchor) {
        for (flag, slot) in ORIGIN_SLOTS {
            if which.contains(flag) {
                self.origins[slot].anchor = anchor;
            }
        }
    }

    /// Origin record for a single origin type. For a combined mask the
    /// first selected origin (translation, rotation, scale) is returned.
    pub fn origin(&self, which: OriginType) -> Origin {
        ORIGIN_SLOTS
            .iter()
            .find(|(flag, _)| which.contains(*flag))
            .map_or_else(Origin::default, |(_, slot)| self.origins[*slot])
    }

    /// Track the nearest bounded ancestor, inset by `padding`
    pub fn set_relative_alignment(&mut self, anchor: Anchor, padding: f32) {
        self.alignment = Alignment {
            anchor,
            padding,
            enabled: true,
        };
    }

    /// Stop tracking; the current position is kept
    pub fn disable_relative_alignment(&mut self) {
        self.alignment.enabled = false;
    }

    /// Alignment record
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Whether any origin is derived from the node's own bounds
    pub fn needs_own_bounds(&self) -> bool {
        self.origins.iter().any(|o| !o.anchor.is_custom())
    }

    /// Whether position is derived from an ancestor's bounds
    pub fn needs_alignment_bounds(&self) -> bool {
        self.alignment.enabled
    }

    /// Re-derive flagged origins from `own_bounds` and, when alignment is
    /// enabled, the position from `alignment_bounds` (expressed in the
    /// parent's space). Missing bounds leave the related values untouched.
    ///
    /// Returns whether anything changed.
    pub fn update_properties(
        &mut self,
        own_bounds: Option<&AABB>,
        alignment_bounds: Option<&AABB>,
    ) -> bool {
        let mut changed = false;

        if let Some(bounds) = own_bounds {
            for origin in &mut self.origins {
                if origin.anchor.is_custom() {
                    continue;
                }
                let point = origin.anchor.resolve(bounds, origin.point);
                if point != origin.point {
                    origin.point = point;
                    changed = true;
                }
            }
        }

        if self.alignment.enabled {
            if let Some(bounds) = alignment_bounds {
                let current = Vec2::new(self.position.x, self.position.y);
                let aligned = self
                    .alignment
                    .anchor
                    .place(bounds, current, self.alignment.padding);
                if aligned != current {
                    self.position.x = aligned.x;
                    self.position.y = aligned.y;
                    changed = true;
                }
            }
        }

        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// Local transform, recomputed if stale
    pub fn get_transform(&self) -> Mat4 {
        if self.transform_dirty.get() {
            let [translation, rotation, scale] = self.origins;
            let offset = Vec2::new(self.position.x, self.position.y) - translation.point;

            let m = translation_2d(offset)
                * about_pivot(rotation_2d(self.rotation), rotation.point)
                * about_pivot(scaling_2d(self.scale), scale.point);

            self.transform.set(m);
            self.transform_dirty.set(false);
            self.inverse_dirty.set(true);
        }
        self.transform.get()
    }

    /// Inverse of the local transform, recomputed if stale. A singular
    /// transform (zero scale) yields identity.
    pub fn get_inverse_transform(&self) -> Mat4 {
        let forward = self.get_transform();
        if self.inverse_dirty.get() {
            self.inverse.set(invert_or_identity(&forward));
            self.inverse_dirty.set(false);
        }
        self.inverse.get()
    }

    /// Force the next inverse read to recompute
    pub fn invalidate_inverse(&self) {
        self.inverse_dirty.set(true);
    }
}
