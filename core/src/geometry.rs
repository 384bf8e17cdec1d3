//! Pixel-space primitives used by the collision model.

use serde::{Deserialize, Serialize};

/// Location expressed in absolute world pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal coordinate, growing toward higher columns.
    pub x: i32,
    /// Vertical coordinate, growing toward higher rows.
    pub y: i32,
}

impl PixelPoint {
    /// Creates a new pixel point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the point shifted by the provided amounts.
    #[must_use]
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Axis-aligned rectangle expressed in absolute world pixels.
///
/// The rectangle covers the half-open ranges `[x, x + width)` and
/// `[y, y + height)`, so two rectangles that merely share an edge do not
/// intersect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Horizontal extent.
    pub width: i32,
    /// Vertical extent.
    pub height: i32,
}

impl PixelRect {
    /// Creates a rectangle from its upper-left corner and extents.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Upper-left corner of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    /// Exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Reports whether the rectangle covers no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns the rectangle shifted by the provided amounts.
    #[must_use]
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }

    /// Reports whether the two rectangles share a region of positive area.
    #[must_use]
    pub const fn intersects(&self, other: &PixelRect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    fn contains_strictly(&self, x: f64, y: f64) -> bool {
        f64::from(self.x) < x
            && x < f64::from(self.right())
            && f64::from(self.y) < y
            && y < f64::from(self.bottom())
    }
}

/// Closed polygon described by its vertices in drawing order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<PixelPoint>,
}

impl Polygon {
    /// Creates a polygon from the provided vertices.
    #[must_use]
    pub fn new(vertices: Vec<PixelPoint>) -> Self {
        Self { vertices }
    }

    /// Vertices composing the polygon outline.
    #[must_use]
    pub fn vertices(&self) -> &[PixelPoint] {
        &self.vertices
    }

    /// Returns a copy of the polygon moved by the provided amounts.
    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|vertex| vertex.translated(dx, dy))
                .collect(),
        }
    }

    /// Smallest rectangle that encloses every vertex.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<PixelRect> {
        let first = self.vertices.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for vertex in &self.vertices {
            min_x = min_x.min(vertex.x);
            min_y = min_y.min(vertex.y);
            max_x = max_x.max(vertex.x);
            max_y = max_y.max(vertex.y);
        }
        Some(PixelRect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Reports whether the polygon interior overlaps the rectangle interior.
    ///
    /// Degenerate polygons with fewer than three vertices never intersect.
    /// Contact along an edge or at a single point does not count.
    #[must_use]
    pub fn intersects_rect(&self, rect: &PixelRect) -> bool {
        if self.vertices.len() < 3 || rect.is_empty() {
            return false;
        }

        let Some(bounds) = self.bounding_rect() else {
            return false;
        };
        let touches_bounds = bounds.x <= rect.right()
            && rect.x <= bounds.right()
            && bounds.y <= rect.bottom()
            && rect.y <= bounds.bottom();
        if !touches_bounds {
            return false;
        }

        if self
            .vertices
            .iter()
            .any(|vertex| rect.contains_strictly(f64::from(vertex.x), f64::from(vertex.y)))
        {
            return true;
        }

        let center_x = f64::from(rect.x) + f64::from(rect.width) / 2.0;
        let center_y = f64::from(rect.y) + f64::from(rect.height) / 2.0;
        if self.contains(center_x, center_y) {
            return true;
        }

        self.edges()
            .any(|(start, end)| segment_crosses_interior(start, end, rect))
    }

    fn edges(&self) -> impl Iterator<Item = (PixelPoint, PixelPoint)> + '_ {
        let count = self.vertices.len();
        (0..count).map(move |index| (self.vertices[index], self.vertices[(index + 1) % count]))
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        let mut inside = false;
        for (start, end) in self.edges() {
            let (x1, y1) = (f64::from(start.x), f64::from(start.y));
            let (x2, y2) = (f64::from(end.x), f64::from(end.y));
            if (y1 > y) != (y2 > y) {
                let crossing = x1 + (y - y1) * (x2 - x1) / (y2 - y1);
                if x < crossing {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn segment_crosses_interior(start: PixelPoint, end: PixelPoint, rect: &PixelRect) -> bool {
    let (ax, ay) = (f64::from(start.x), f64::from(start.y));
    let dx = f64::from(end.x) - ax;
    let dy = f64::from(end.y) - ay;
    let left = f64::from(rect.x);
    let right = f64::from(rect.right());
    let top = f64::from(rect.y);
    let bottom = f64::from(rect.bottom());

    let mut enter = 0.0_f64;
    let mut exit = 1.0_f64;
    for (p, q) in [
        (-dx, ax - left),
        (dx, right - ax),
        (-dy, ay - top),
        (dy, bottom - ay),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return false;
            }
            continue;
        }

        let ratio = q / p;
        if p < 0.0 {
            if ratio > exit {
                return false;
            }
            enter = enter.max(ratio);
        } else {
            if ratio < enter {
                return false;
            }
            exit = exit.min(ratio);
        }
    }

    if enter >= exit {
        return false;
    }

    let middle = (enter + exit) / 2.0;
    rect.contains_strictly(ax + dx * middle, ay + dy * middle)
}
