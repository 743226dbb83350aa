//! Scanline fill: walks a triangle row by row between its ordered edges.
//!
//! Each row interpolates a boundary point down the long edge and one down
//! the active short edge, then fills the span between them. The walk stays
//! in pixel space; perspective correctness comes from the ww-premultiplied
//! attributes, divided back out at shading time.

use crate::math::vec2::Vec2;
use crate::math::vec4::Vec4;
use crate::state::{FillMode, RenderState};
use crate::texture::Texture;

use super::edge::{order_edges, Edge, Scanline};
use super::framebuffer::FrameBuffer;
use super::shading::shade_fragment;
use super::{Triangle, VertexAttributes};

/// Rasterize one transformed triangle into the framebuffer.
pub fn rasterize_triangle(
    triangle: &Triangle,
    state: &RenderState,
    texture: Option<&Texture>,
    framebuffer: &mut FrameBuffer,
) {
    let ordered = order_edges([
        Edge::between(
            triangle.screen[0],
            triangle.attrs[0],
            triangle.screen[1],
            triangle.attrs[1],
        ),
        Edge::between(
            triangle.screen[1],
            triangle.attrs[1],
            triangle.screen[2],
            triangle.attrs[2],
        ),
        Edge::between(
            triangle.screen[2],
            triangle.attrs[2],
            triangle.screen[0],
            triangle.attrs[0],
        ),
    ]);
    let long = &ordered.long;

    let rows = long.delta.y.ceil() as i32;
    let mut on_short_bottom = false;

    for row in 0..rows {
        let inc = row as f32;

        // Boundary point on the long edge.
        let point_a = Vec4::point(
            long.top.x + inc * long.inc_x,
            long.top.y + inc,
            long.top.z + inc * long.inc_z,
        );
        let attrs_a =
            VertexAttributes::interpolate(&long.bottom_attr, &long.top_attr, 0.0, long.delta.y, inc);
        plot(point_a, &attrs_a, state, texture, framebuffer);

        let active = if on_short_bottom {
            &ordered.short_bottom
        } else {
            &ordered.short_top
        };
        // Rebase the row counter when walking the lower short edge.
        let inc_b = if on_short_bottom {
            inc - ordered.short_top.delta.y
        } else {
            inc
        };

        // Sub-pixel-height edges carry raw deltas, so the stepped x can
        // overshoot; clamp it to the edge's horizontal extent.
        let (min_x, max_x) = if active.top.x <= active.bottom.x {
            (active.top.x, active.bottom.x)
        } else {
            (active.bottom.x, active.top.x)
        };
        let point_b = Vec4::point(
            (active.top.x + inc_b * active.inc_x).clamp(min_x, max_x),
            active.top.y + inc_b,
            active.top.z + inc_b * active.inc_z,
        );

        if active.delta.y.abs() < 0.5 {
            // A horizontal edge is its own span.
            let span = Scanline::between(
                active.top,
                active.top_attr,
                active.bottom,
                active.bottom_attr,
            );
            raster_scanline(&span, state, texture, framebuffer);
        }

        let attrs_b = VertexAttributes::interpolate(
            &active.bottom_attr,
            &active.top_attr,
            0.0,
            active.delta.y,
            inc_b,
        );
        plot(point_b, &attrs_b, state, texture, framebuffer);

        if state.fill == FillMode::Solid {
            // Both boundary points land on the same pixel row; average the
            // y so the span sits mid-row regardless of stepping error.
            let mid_y = (point_a.y + point_b.y) / 2.0;
            let span = Scanline::between(
                Vec4::point(point_a.x, mid_y, point_a.z),
                attrs_a,
                Vec4::point(point_b.x, mid_y, point_b.z),
                attrs_b,
            );
            raster_scanline(&span, state, texture, framebuffer);
        }

        if !on_short_bottom && point_b.y > ordered.short_top.bottom.y {
            on_short_bottom = true;
        }
    }
}

/// Fill one horizontal span left to right in unit pixel steps.
fn raster_scanline(
    span: &Scanline,
    state: &RenderState,
    texture: Option<&Texture>,
    framebuffer: &mut FrameBuffer,
) {
    let steps = span.delta.x.ceil() as i32;
    let y = ((span.left.y + span.right.y) / 2.0).floor() as i32;

    for step in 0..steps {
        let inc = step as f32;
        let x = (span.left.x + inc).floor() as i32;
        let z = span.left.z + inc * span.inc_z;
        let attrs =
            VertexAttributes::interpolate(&span.right_attr, &span.left_attr, 0.0, span.delta.x, inc);
        let delta_tex = texel_footprint(span, &attrs, inc, state, texture);
        let color = shade_fragment(&attrs, state, texture, delta_tex);
        framebuffer.change_buffer(x, y, z, color);
    }
}

/// Base-level texels covered by a one-pixel step along the span.
fn texel_footprint(
    span: &Scanline,
    attrs: &VertexAttributes,
    inc: f32,
    state: &RenderState,
    texture: Option<&Texture>,
) -> f32 {
    let tex = match texture {
        Some(tex) if state.texturing => tex,
        _ => return 0.0,
    };

    let next = VertexAttributes::interpolate(
        &span.right_attr,
        &span.left_attr,
        0.0,
        span.delta.x,
        inc + 1.0,
    );
    let here = uv_of(attrs);
    let ahead = uv_of(&next);
    let du = ((ahead.x - here.x) * tex.width() as f32).abs();
    let dv = ((ahead.y - here.y) * tex.height() as f32).abs();
    du.max(dv)
}

fn uv_of(attrs: &VertexAttributes) -> Vec2 {
    let corrected = attrs.color / attrs.ww;
    Vec2::new(corrected.x, corrected.y)
}

/// Shade and write one boundary point at its pixel.
fn plot(
    point: Vec4,
    attrs: &VertexAttributes,
    state: &RenderState,
    texture: Option<&Texture>,
    framebuffer: &mut FrameBuffer,
) {
    let color = shade_fragment(attrs, state, texture, 0.0);
    framebuffer.change_buffer(point.x.floor() as i32, point.y.floor() as i32, point.z, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Rgba;
    use crate::state::ShadingMode;
    use approx::assert_relative_eq;

    fn unlit_state() -> RenderState {
        RenderState {
            shading: ShadingMode::None,
            ..RenderState::default()
        }
    }

    fn red_triangle(z: f32) -> Triangle {
        Triangle::from_screen(
            [
                Vec4::point(10.0, 10.0, z),
                Vec4::point(50.0, 10.0, z),
                Vec4::point(10.0, 50.0, z),
            ],
            Vec4::new(1.0, 0.0, 0.0, 1.0),
        )
    }

    #[test]
    fn solid_fill_covers_interior() {
        let mut fb = FrameBuffer::new(64, 64);
        let state = unlit_state();
        rasterize_triangle(&red_triangle(0.5), &state, None, &mut fb);

        let inside = fb.color_at(20, 20).unwrap();
        assert_relative_eq!(inside.r, 1.0);
        assert_relative_eq!(inside.g, 0.0);
        assert_eq!(fb.depth_at(20, 20), Some(0.5));

        // Outside the triangle stays cleared.
        assert_eq!(fb.color_at(5, 5), Some(Rgba::BLACK));
        assert_eq!(fb.color_at(55, 55), Some(Rgba::BLACK));
        assert_eq!(fb.depth_at(5, 5), Some(f32::INFINITY));
    }

    #[test]
    fn flat_shading_writes_gamma_encoded_color() {
        let mut fb = FrameBuffer::new(64, 64);
        let state = RenderState {
            shading: ShadingMode::Flat,
            ..RenderState::default()
        };
        let mut tri = red_triangle(0.5);
        for attrs in &mut tri.attrs {
            attrs.flat_color = Vec4::new(0.5, 0.5, 0.5, 1.0);
        }
        rasterize_triangle(&tri, &state, None, &mut fb);

        let inside = fb.color_at(20, 20).unwrap();
        assert_relative_eq!(inside.r, 0.5f32.powf(1.0 / 2.2), epsilon = 1e-6);
        assert_eq!(inside.r, inside.g);
        assert_eq!(fb.depth_at(20, 20), Some(0.5));
    }

    #[test]
    fn boundary_mode_leaves_interior_empty() {
        let mut fb = FrameBuffer::new(64, 64);
        let state = RenderState {
            fill: FillMode::Boundary,
            ..unlit_state()
        };
        rasterize_triangle(&red_triangle(0.5), &state, None, &mut fb);

        // The vertical edge is plotted, the deep interior is not.
        assert_relative_eq!(fb.color_at(10, 30).unwrap().r, 1.0);
        assert_eq!(fb.color_at(20, 25), Some(Rgba::BLACK));
    }

    #[test]
    fn overlap_resolves_by_depth_not_draw_order() {
        let near = red_triangle(0.2);
        let mut far = red_triangle(0.8);
        for attrs in &mut far.attrs {
            attrs.color = Vec4::new(0.0, 0.0, 1.0, 1.0);
            attrs.flat_color = attrs.color;
        }
        let state = unlit_state();

        let mut fb_ab = FrameBuffer::new(64, 64);
        rasterize_triangle(&near, &state, None, &mut fb_ab);
        rasterize_triangle(&far, &state, None, &mut fb_ab);

        let mut fb_ba = FrameBuffer::new(64, 64);
        rasterize_triangle(&far, &state, None, &mut fb_ba);
        rasterize_triangle(&near, &state, None, &mut fb_ba);

        for probe in [(20, 20), (11, 45), (45, 11)] {
            assert_eq!(fb_ab.color_at(probe.0, probe.1), fb_ba.color_at(probe.0, probe.1));
            assert_relative_eq!(fb_ab.color_at(probe.0, probe.1).unwrap().r, 1.0);
        }
    }

    #[test]
    fn redraw_is_idempotent() {
        let state = unlit_state();
        let tri = red_triangle(0.5);

        let mut fb = FrameBuffer::new(64, 64);
        rasterize_triangle(&tri, &state, None, &mut fb);
        let first = fb.color_data().to_vec();
        rasterize_triangle(&tri, &state, None, &mut fb);
        assert_eq!(fb.color_data(), first.as_slice());
    }

    #[test]
    fn span_interpolation_is_perspective_correct() {
        // Left endpoint black at w = 1, right endpoint white at w = 3.
        // Halfway across the screen span the corrected color is 0.25, not
        // the screen-linear 0.5.
        let black = VertexAttributes {
            position_ccs: Vec4::ZERO,
            normal: Vec4::ZERO,
            color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            ww: 1.0,
            flat_color: Vec4::ZERO,
            flat_normal: Vec4::ZERO,
        };
        let ww = 1.0 / 3.0;
        let white = VertexAttributes {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0) * ww,
            ww,
            ..black
        };
        let span = Scanline::between(
            Vec4::point(0.0, 5.0, 0.5),
            black,
            Vec4::point(100.0, 5.0, 0.5),
            white,
        );

        let mut fb = FrameBuffer::new(128, 16);
        let state = unlit_state();
        raster_scanline(&span, &state, None, &mut fb);

        let mid = fb.color_at(50, 5).unwrap();
        assert_relative_eq!(mid.r, 0.25, epsilon = 0.02);
    }
}
