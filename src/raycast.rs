/// Grid traversal (3D DDA) and block picking.
///
/// The segment is walked one grid-boundary crossing at a time. Midpoints of
/// consecutive crossing points land strictly inside the traversed cells,
/// which makes the cell sequence robust for rays running exactly along a
/// grid plane.
use crate::camera::Camera;
use crate::world::BlockSource;
use glam::{IVec3, Vec3};

/// Result of a pick: the first occupied cell along the ray and the empty
/// cell just before it (where a new block would be placed).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub selected: IVec3,
    pub previous: Option<IVec3>,
}

/// Points where the segment `start -> end` crosses integer grid planes,
/// preceded by `start` itself. Crossings at the same parameter are emitted
/// in X, Y, Z order.
pub fn dda_points(start: Vec3, end: Vec3) -> Vec<Vec3> {
    Crossings::new(start, end).collect()
}

/// Lazy form of [`dda_points`].
struct Crossings {
    start: Vec3,
    delta: Vec3,
    step: [f32; 3],
    boundary: [f32; 3],
    t_max: [f32; 3],
    /// `start` has not been emitted yet
    at_start: bool,
    /// Upper bound on the crossings still to come
    remaining: usize,
}

impl Crossings {
    fn new(start: Vec3, end: Vec3) -> Self {
        let delta = end - start;
        let mut walk = Self {
            start,
            delta,
            step: [0.0; 3],
            boundary: [0.0; 3],
            t_max: [f32::INFINITY; 3],
            at_start: true,
            remaining: 0,
        };
        if !start.is_finite() || !delta.is_finite() {
            return walk;
        }

        for axis in 0..3 {
            if delta[axis] > 0.0 {
                walk.step[axis] = 1.0;
                walk.boundary[axis] = start[axis].floor() + 1.0;
            } else if delta[axis] < 0.0 {
                walk.step[axis] = -1.0;
                walk.boundary[axis] = start[axis].ceil() - 1.0;
            } else {
                continue;
            }
            walk.t_max[axis] = (walk.boundary[axis] - start[axis]) / delta[axis];
        }

        // Each crossing moves one axis a whole cell, so this bounds the walk
        // even if rounding misbehaves.
        walk.remaining = delta
            .to_array()
            .iter()
            .fold(0usize, |sum, v| sum.saturating_add((v.abs().ceil() as usize).saturating_add(1)));
        walk
    }
}

impl Iterator for Crossings {
    type Item = Vec3;

    fn next(&mut self) -> Option<Vec3> {
        if std::mem::take(&mut self.at_start) {
            return Some(self.start);
        }
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let mut axis = 0;
        if self.t_max[1] < self.t_max[axis] {
            axis = 1;
        }
        if self.t_max[2] < self.t_max[axis] {
            axis = 2;
        }

        let t = self.t_max[axis];
        if !(t <= 1.0) {
            self.remaining = 0;
            return None;
        }

        let mut point = (self.start + self.delta * t).to_array();
        // Snap the crossing axis exactly onto its plane.
        point[axis] = self.boundary[axis];

        self.boundary[axis] += self.step[axis];
        self.t_max[axis] = (self.boundary[axis] - self.start[axis]) / self.delta[axis];
        Some(Vec3::from_array(point))
    }
}

/// Ordered cells touched by the segment from `start` to
/// `start + direction * max_length`.
///
/// The cell containing the end point is only reported if the segment
/// crossed into it before `max_length`. A zero-length segment yields the
/// start cell alone.
pub fn cast_ray(start: Vec3, direction: Vec3, max_length: f32) -> Vec<IVec3> {
    ray_cells(start, direction, max_length).collect()
}

/// Lazy form of [`cast_ray`]: cells are produced as the walk reaches them.
fn ray_cells(start: Vec3, direction: Vec3, max_length: f32) -> impl Iterator<Item = IVec3> {
    let start_cell = start.floor().as_ivec3();
    let delta = direction * max_length;
    let walking = start.is_finite() && delta.is_finite() && delta != Vec3::ZERO && max_length > 0.0;

    let mut points = walking.then(|| Crossings::new(start, start + delta));
    let mut previous: Option<Vec3> = None;
    let mut last: Option<IVec3> = None;
    let mut start_pending = start.is_finite();

    std::iter::from_fn(move || {
        if let Some(points) = points.as_mut() {
            for point in points.by_ref() {
                let Some(a) = previous.replace(point) else {
                    continue;
                };
                if a == point {
                    continue;
                }
                let cell = ((a + point) * 0.5).floor().as_ivec3();
                if last != Some(cell) {
                    last = Some(cell);
                    start_pending = false;
                    return Some(cell);
                }
            }
        }
        // A walk that never left its first cell still reports it.
        std::mem::take(&mut start_pending).then_some(start_cell)
    })
}

/// Ray parameter past which a ray from `origin` can no longer touch the
/// cells `[0, extent)`. Infinite when `direction` has no usable length.
fn grid_reach(origin: Vec3, direction: Vec3, extent: IVec3) -> f32 {
    let speed = direction.length();
    if !(speed > 0.0) || !speed.is_finite() {
        return f32::INFINITY;
    }
    let half = extent.as_vec3() * 0.5;
    // Every point of the grid lies within this distance of the origin.
    ((origin - half).length() + half.length() + 1.0) / speed
}

/// Whether `cell` lies outside `[0, extent)` on an axis the ray is not
/// heading back along, so no later cell can be inside.
fn left_grid(cell: IVec3, direction: Vec3, extent: IVec3) -> bool {
    (0..3).any(|axis| {
        (cell[axis] < 0 && !(direction[axis] > 0.0))
            || (cell[axis] >= extent[axis] && !(direction[axis] < 0.0))
    })
}

/// First occupied cell along the ray, with the cell visited just before it.
/// `None` if nothing is hit within `max_length`.
///
/// The walk ends as soon as the ray has left the grid for good, and
/// `max_length` is capped to the distance across the grid, so an infinite
/// pick distance works.
pub fn pick<W: BlockSource + ?Sized>(
    world: &W,
    origin: Vec3,
    direction: Vec3,
    max_length: f32,
) -> Option<Selection> {
    let extent = world.extent();
    let reach = grid_reach(origin, direction, extent);
    let length = if max_length > reach { reach } else { max_length };

    let mut previous = None;
    for cell in ray_cells(origin, direction, length) {
        if left_grid(cell, direction, extent) {
            break;
        }
        if world.is_occupied(cell) {
            return Some(Selection {
                selected: cell,
                previous,
            });
        }
        previous = Some(cell);
    }
    None
}

/// Pick along the camera's view direction (the crosshair).
pub fn pick_from_camera<W: BlockSource + ?Sized>(
    world: &W,
    camera: &Camera,
    max_length: f32,
) -> Option<Selection> {
    pick(world, camera.position, camera.forward(), max_length)
}

/// Pick through an arbitrary pixel of a `width` x `height` image.
pub fn pick_through_pixel<W: BlockSource + ?Sized>(
    world: &W,
    camera: &Camera,
    pixel: (f32, f32),
    size: (usize, usize),
    max_length: f32,
) -> Option<Selection> {
    let direction = camera.screen_ray(pixel.0, pixel.1, size.0, size.1);
    pick(world, camera.position, direction, max_length)
}
