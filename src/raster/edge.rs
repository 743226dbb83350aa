//! Edge and scanline construction for the fill engine.
//!
//! A triangle's three sides become [`Edge`]s ordered top-to-bottom, then
//! [`order_edges`] classifies them into the long edge spanning the full
//! vertical extent and the two short edges covering the upper and lower
//! halves. Horizontal edges are excluded from that classification and
//! handled as standalone [`Scanline`]s by the fill engine.

use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;

use super::VertexAttributes;

/// A triangle side ordered top vertex first (smaller y).
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    pub top: Vec4,
    pub bottom: Vec4,
    /// `bottom - top`.
    pub delta: Vec3,
    /// Change of x per unit y; the raw x delta for sub-pixel-height edges.
    pub inc_x: f32,
    /// Change of z per unit y; the raw z delta for sub-pixel-height edges.
    pub inc_z: f32,
    pub top_attr: VertexAttributes,
    pub bottom_attr: VertexAttributes,
}

impl Edge {
    /// Build the edge between two pixel-space vertices.
    pub fn between(v0: Vec4, a0: VertexAttributes, v1: Vec4, a1: VertexAttributes) -> Self {
        let (top, top_attr, bottom, bottom_attr) = if v0.y < v1.y {
            (v0, a0, v1, a1)
        } else {
            (v1, a1, v0, a0)
        };

        let d = bottom - top;
        // Dividing by a sub-pixel height blows the slope up; keep the raw
        // deltas there and let the scanline path handle the row.
        let (inc_x, inc_z) = if d.y.abs() >= 1.0 {
            (d.x / d.y, d.z / d.y)
        } else {
            (d.x, d.z)
        };

        Self {
            top,
            bottom,
            delta: d.xyz(),
            inc_x,
            inc_z,
            top_attr,
            bottom_attr,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.delta.y == 0.0
    }
}

/// A horizontal span ordered left vertex first (smaller x).
#[derive(Clone, Copy, Debug)]
pub struct Scanline {
    pub left: Vec4,
    pub right: Vec4,
    /// `right - left`.
    pub delta: Vec3,
    /// Change of z per unit x.
    pub inc_z: f32,
    pub left_attr: VertexAttributes,
    pub right_attr: VertexAttributes,
}

impl Scanline {
    /// Build the scanline between two pixel-space vertices.
    pub fn between(v0: Vec4, a0: VertexAttributes, v1: Vec4, a1: VertexAttributes) -> Self {
        let (left, left_attr, right, right_attr) = if v0.x < v1.x {
            (v0, a0, v1, a1)
        } else {
            (v1, a1, v0, a0)
        };

        let d = right - left;
        let inc_z = if d.x.abs() > 0.0 { d.z / d.x } else { 0.0 };

        Self {
            left,
            right,
            delta: d.xyz(),
            inc_z,
            left_attr,
            right_attr,
        }
    }
}

/// The three edges of a triangle classified for the row walk.
#[derive(Clone, Copy, Debug)]
pub struct OrderedEdges {
    /// Spans the triangle's full vertical extent.
    pub long: Edge,
    /// Covers the upper portion.
    pub short_top: Edge,
    /// Covers the lower portion.
    pub short_bottom: Edge,
}

/// Classify a triangle's edges into long / short-top / short-bottom.
///
/// A horizontal edge never becomes the long edge: it is slotted top or
/// bottom by its y, and the two remaining edges fill the long slot first.
/// For a fully degenerate (zero-height) triangle the classification is
/// arbitrary; the fill engine walks zero rows either way.
pub fn order_edges(edges: [Edge; 3]) -> OrderedEdges {
    let mut top_y = f32::MAX;
    let mut bottom_y = f32::MIN;
    let mut has_horizontal = false;
    for e in &edges {
        top_y = top_y.min(e.top.y);
        bottom_y = bottom_y.max(e.bottom.y);
        has_horizontal |= e.is_horizontal();
    }

    // Slot 0 = long, 1 = short-top, 2 = short-bottom. Each edge carries a
    // slot preference and takes the first free one.
    let mut slots: [Option<Edge>; 3] = [None, None, None];
    for e in edges {
        let preference = if has_horizontal {
            if e.is_horizontal() {
                if e.top.y == top_y {
                    [1, 2, 0]
                } else {
                    [2, 1, 0]
                }
            } else {
                [0, 1, 2]
            }
        } else if e.top.y == top_y && e.bottom.y == bottom_y {
            [0, 1, 2]
        } else if e.top.y == top_y {
            [1, 2, 0]
        } else {
            [2, 1, 0]
        };

        for slot in preference {
            if slots[slot].is_none() {
                slots[slot] = Some(e);
                break;
            }
        }
    }

    OrderedEdges {
        long: slots[0].unwrap_or(edges[0]),
        short_top: slots[1].unwrap_or(edges[1]),
        short_bottom: slots[2].unwrap_or(edges[2]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec4::Vec4;
    use approx::assert_relative_eq;

    fn attr() -> VertexAttributes {
        VertexAttributes {
            position_ccs: Vec4::ZERO,
            normal: Vec4::ZERO,
            color: Vec4::ZERO,
            ww: 1.0,
            flat_color: Vec4::ZERO,
            flat_normal: Vec4::ZERO,
        }
    }

    fn edges_of(points: [Vec4; 3]) -> [Edge; 3] {
        [
            Edge::between(points[0], attr(), points[1], attr()),
            Edge::between(points[1], attr(), points[2], attr()),
            Edge::between(points[2], attr(), points[0], attr()),
        ]
    }

    #[test]
    fn top_vertex_has_smaller_y() {
        let e = Edge::between(
            Vec4::point(5.0, 20.0, 0.0),
            attr(),
            Vec4::point(0.0, 10.0, 0.0),
            attr(),
        );
        assert_eq!(e.top.y, 10.0);
        assert_eq!(e.bottom.y, 20.0);
        assert_relative_eq!(e.inc_x, 0.5);
    }

    #[test]
    fn sub_pixel_height_keeps_raw_deltas() {
        let e = Edge::between(
            Vec4::point(0.0, 10.0, 0.0),
            attr(),
            Vec4::point(8.0, 10.4, 1.0),
            attr(),
        );
        assert_relative_eq!(e.inc_x, 8.0);
        assert_relative_eq!(e.inc_z, 1.0);
    }

    #[test]
    fn long_edge_spans_full_extent() {
        // General triangle: (0,0), (10,5), (2,12).
        let ordered = order_edges(edges_of([
            Vec4::point(0.0, 0.0, 0.0),
            Vec4::point(10.0, 5.0, 0.0),
            Vec4::point(2.0, 12.0, 0.0),
        ]));
        assert_eq!(ordered.long.top.y, 0.0);
        assert_eq!(ordered.long.bottom.y, 12.0);
        assert_eq!(ordered.short_top.bottom.y, 5.0);
        assert_eq!(ordered.short_bottom.top.y, 5.0);
    }

    #[test]
    fn horizontal_top_edge_becomes_short_top() {
        // Flat-top triangle.
        let ordered = order_edges(edges_of([
            Vec4::point(0.0, 0.0, 0.0),
            Vec4::point(10.0, 0.0, 0.0),
            Vec4::point(5.0, 8.0, 0.0),
        ]));
        assert!(ordered.short_top.is_horizontal());
        assert!(!ordered.long.is_horizontal());
        assert_eq!(ordered.long.delta.y, 8.0);
    }

    #[test]
    fn horizontal_bottom_edge_becomes_short_bottom() {
        // Flat-bottom triangle.
        let ordered = order_edges(edges_of([
            Vec4::point(5.0, 0.0, 0.0),
            Vec4::point(0.0, 8.0, 0.0),
            Vec4::point(10.0, 8.0, 0.0),
        ]));
        assert!(ordered.short_bottom.is_horizontal());
        assert!(!ordered.long.is_horizontal());
    }

    #[test]
    fn scanline_orders_by_x() {
        let sl = Scanline::between(
            Vec4::point(30.0, 5.0, 1.0),
            attr(),
            Vec4::point(10.0, 5.0, 0.0),
            attr(),
        );
        assert_eq!(sl.left.x, 10.0);
        assert_eq!(sl.right.x, 30.0);
        assert_relative_eq!(sl.inc_z, 0.05);
    }
}
