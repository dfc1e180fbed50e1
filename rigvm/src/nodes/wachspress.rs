use crate::math::EPSILON;
use crate::runtime::diagnostics::check_values;
use crate::{
    Diagnostics, HierarchyHeader, RigNodeType, WachspressEntry, WachspressMode, WachspressParams,
};
use glam::Vec2;

fn corners(entry: &WachspressEntry) -> [Vec2; 4] {
    entry.points.map(|p| Vec2::new(p[0], p[1]))
}

fn normalized(weights: [f32; 4]) -> [f32; 4] {
    let sum: f32 = weights.iter().sum();
    if sum > EPSILON {
        weights.map(|w| w / sum)
    } else {
        [1.0, 0.0, 0.0, 0.0]
    }
}

/// Bilinear weights over the axis-aligned box spanned by `p[0]`, `p[1]` (x) and `p[3]` (y).
///
/// This is what compiled rigs were authored against. For a non-rectangular quad it differs from
/// true Wachspress coordinates ([`wachspress_coordinates`]).
pub fn bilinear_coordinates(points: &[Vec2; 4], query: Vec2) -> [f32; 4] {
    let [p0, p1, _, p3] = *points;
    let dx = p1.x - p0.x;
    let dy = p3.y - p0.y;
    let right = if dx.abs() > EPSILON { (query.x - p0.x) / dx } else { 0.0 };
    let top = if dy.abs() > EPSILON { (query.y - p0.y) / dy } else { 0.0 };
    normalized([
        ((1.0 - top) * (1.0 - right)).abs(),
        ((1.0 - top) * right).abs(),
        (top * right).abs(),
        (top * (1.0 - right)).abs(),
    ])
}

fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    0.5 * (b - a).perp_dot(c - a)
}

/// Generalized barycentric (Wachspress) coordinates of `query` in a convex, counter-clockwise
/// quad.
pub fn wachspress_coordinates(points: &[Vec2; 4], query: Vec2) -> [f32; 4] {
    let n = points.len();
    let areas: [f32; 4] = std::array::from_fn(|i| triangle_area(query, points[i], points[(i + 1) % n]));
    for (i, &a) in areas.iter().enumerate() {
        if a.abs() <= EPSILON {
            // On edge i: linear between its endpoints.
            let (a, b) = (points[i], points[(i + 1) % n]);
            let len_sq = (b - a).length_squared();
            let t = if len_sq > EPSILON {
                ((query - a).dot(b - a) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut w = [0.0; 4];
            w[i] = 1.0 - t;
            w[(i + 1) % n] += t;
            return w;
        }
    }
    let weights: [f32; 4] = std::array::from_fn(|i| {
        let prev = points[(i + n - 1) % n];
        let corner = triangle_area(prev, points[i], points[(i + 1) % n]);
        corner / (areas[(i + n - 1) % n] * areas[i])
    });
    normalized(weights)
}

pub fn wachspress_entry(entry: &WachspressEntry, query: Vec2) -> [f32; 4] {
    let points = corners(entry);
    match entry.mode {
        WachspressMode::Bilinear => bilinear_coordinates(&points, query),
        WachspressMode::Generalized => wachspress_coordinates(&points, query),
    }
}

pub fn execute_wachspress(
    header: &mut HierarchyHeader<'_>,
    params: &WachspressParams,
    diag: &mut dyn Diagnostics,
) {
    for entry in &params.entries {
        let query = Vec2::new(
            header.read_f32_or(entry.inputs[0], entry.input_defaults[0]),
            header.read_f32_or(entry.inputs[1], entry.input_defaults[1]),
        );
        let weights = wachspress_entry(entry, query);
        check_values(diag, RigNodeType::Wachspress, "weights", &weights);
        for (loc, w) in entry.outputs.iter().zip(weights) {
            header.write_f32_if_valid(*loc, w);
        }
        diag.node_outputs(RigNodeType::Wachspress, "weights", &weights);
    }
}
