/// Axis-aligned rectangles, the unit of all collision in the game.
/// Pixel units, floating point. No rotation.

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// AABB overlap test with strict inequalities: rectangles that merely
    /// touch along an edge do NOT overlap. Every interaction in the game
    /// (landing, coins, enemies) is gated on this exact boundary behavior,
    /// so it must not be loosened to `<=`.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Edge-inclusive contact test: also true when the rectangles only
    /// touch along an edge. Solid resolution leaves the player flush
    /// against a surface with zero gap, which the strict test reads as
    /// non-overlap; contact with a solid the player must be able to
    /// trigger (the goal) uses this variant.
    #[inline]
    pub fn touches(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }
}
