//! Per-triangle geometry stage: transform, reject, cull, attribute setup.
//!
//! Whole triangles are kept or dropped; there is no frustum clipping. A
//! triangle survives only when every vertex lies strictly in front of the
//! eye (`w > 0`) and every normalized-device coordinate is within the unit
//! cube, so partially visible triangles vanish rather than being split.

use crate::math::mat4::Mat4;
use crate::math::vec4::Vec4;
use crate::mesh::Mesh;
use crate::state::{RenderState, ShadingMode, Winding};

use super::shading::lit_color;
use super::{Triangle, VertexAttributes};

const DEBUG_COLORS: [Vec4; 3] = [
    Vec4::new(1.0, 0.0, 0.0, 1.0),
    Vec4::new(0.0, 1.0, 0.0, 1.0),
    Vec4::new(0.0, 0.0, 1.0, 1.0),
];

/// Run the geometry stage over a whole mesh.
///
/// Returns the surviving front-facing triangles in pixel space with their
/// interpolation attributes populated, ready for the fill engine.
pub fn transform_mesh(
    mesh: &Mesh,
    model: Mat4,
    view: Mat4,
    projection: Mat4,
    viewport: Mat4,
    state: &RenderState,
) -> Vec<Triangle> {
    let to_camera = view * model;
    let mvp = projection * to_camera;

    let mut triangles = Vec::new();
    let textured = state.texturing && mesh.has_texcoords();

    'next_triangle: for tri in 0..mesh.triangle_count() {
        let base = 3 * tri;
        let object: [Vec4; 3] = [
            mesh.vertices()[base],
            mesh.vertices()[base + 1],
            mesh.vertices()[base + 2],
        ];

        let clip = object.map(|v| mvp * v);
        // Behind or on the eye plane: reject the whole triangle.
        for v in &clip {
            if v.w <= 0.0 {
                continue 'next_triangle;
            }
        }

        let ndc = [clip[0] / clip[0].w, clip[1] / clip[1].w, clip[2] / clip[2].w];
        for v in &ndc {
            if v.x.abs() > 1.0 || v.y.abs() > 1.0 || v.z.abs() > 1.0 {
                continue 'next_triangle;
            }
        }

        let screen = ndc.map(|v| viewport * v);
        if state.culling && !is_front_facing(&screen, state.front_face) {
            continue;
        }

        let camera = object.map(|v| to_camera * v);
        // Renormalize after the transform in case the model matrix scales.
        let normals = [
            to_camera * mesh.normals()[base],
            to_camera * mesh.normals()[base + 1],
            to_camera * mesh.normals()[base + 2],
        ]
        .map(|n| Vec4::from_vec3(n.xyz().normalize(), 0.0));
        let face_normal = Vec4::from_vec3(
            (clip[1] - clip[0]).xyz().cross((clip[2] - clip[0]).xyz()),
            0.0,
        );
        let camera_face_normal = Vec4::from_vec3(
            (camera[1] - camera[0])
                .xyz()
                .cross((camera[2] - camera[0]).xyz())
                .normalize(),
            0.0,
        );

        let mut base_colors = [Vec4::ZERO; 3];
        let mut colors = [Vec4::ZERO; 3];
        for i in 0..3 {
            base_colors[i] = if state.debug_vertex_colors {
                DEBUG_COLORS[i]
            } else {
                state.object_color
            };
            colors[i] = if textured {
                // The color channels carry the UV pair through interpolation.
                let uv = mesh.texcoords()[base + i];
                Vec4::new(uv.x, uv.y, 0.0, 1.0)
            } else if state.shading == ShadingMode::Gouraud {
                lit_color(base_colors[i], normals[i].xyz(), camera[i].xyz(), state)
            } else {
                base_colors[i]
            };
        }

        // Vertex 0 provokes the flat attributes.
        let flat_color = if state.shading == ShadingMode::Flat && !textured {
            lit_color(base_colors[0], normals[0].xyz(), camera[0].xyz(), state)
        } else {
            base_colors[0]
        };

        let mut attrs = [VertexAttributes {
            position_ccs: Vec4::ZERO,
            normal: Vec4::ZERO,
            color: Vec4::ZERO,
            ww: 0.0,
            flat_color,
            flat_normal: camera_face_normal,
        }; 3];
        for i in 0..3 {
            let ww = 1.0 / clip[i].w;
            attrs[i].position_ccs = camera[i] * ww;
            attrs[i].normal = normals[i] * ww;
            attrs[i].color = colors[i] * ww;
            attrs[i].ww = ww;
        }

        triangles.push(Triangle {
            clip,
            ndc,
            screen,
            normals,
            face_normal,
            attrs,
        });
    }

    triangles
}

/// Orientation test from the shoelace signed area in pixel space.
fn is_front_facing(screen: &[Vec4; 3], front_face: Winding) -> bool {
    let area = screen[0].x * screen[1].y - screen[1].x * screen[0].y
        + screen[1].x * screen[2].y
        - screen[2].x * screen[1].y
        + screen[2].x * screen[0].y
        - screen[0].x * screen[2].y;
    match front_face {
        Winding::Clockwise => area > 0.0,
        Winding::CounterClockwise => area < 0.0,
    }
}
