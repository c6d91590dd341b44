/// Eight-corner boxes with per-face texture coordinates.
///
/// Corner order is fixed so that faces and wireframe edges can be described
/// by index tables:
///
/// ```text
/// 0: (min.x, min.y, min.z)   4: (min.x, min.y, max.z)
/// 1: (max.x, min.y, min.z)   5: (max.x, min.y, max.z)
/// 2: (max.x, max.y, min.z)   6: (max.x, max.y, max.z)
/// 3: (min.x, max.y, min.z)   7: (min.x, max.y, max.z)
/// ```
use super::{triangle_normal, Direction, RotateExt};
use crate::rendering::texture::AtlasRegion;
use glam::{Vec2, Vec3};

/// Vertex pairs forming the 12 edges of a cuboid.
pub const CUBOID_EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0),
    (4, 5), (5, 6), (6, 7), (7, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

/// Cuboid faces in their fixed rendering order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    Front = 0,
    Back = 1,
    Top = 2,
    Bottom = 3,
    Left = 4,
    Right = 5,
}

// Corner indices per face, wound so (0, 1, 2) and (0, 2, 3) have outward normals.
const FACE_CORNERS: [[usize; 4]; 6] = [
    [0, 3, 2, 1], // front  (-Z)
    [4, 5, 6, 7], // back   (+Z)
    [3, 7, 6, 2], // top    (+Y)
    [0, 1, 5, 4], // bottom (-Y)
    [0, 4, 7, 3], // left   (-X)
    [1, 2, 6, 5], // right  (+X)
];

// Texture placement of each face corner inside its region, (0, 0) = top-left.
// Side faces keep "up" at the top of the texture when viewed from outside.
const FACE_CORNER_UVS: [[[f32; 2]; 4]; 6] = [
    [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
    [[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
    [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
    [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
    [[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
    [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
];

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Back,
        Face::Top,
        Face::Bottom,
        Face::Left,
        Face::Right,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn corners(self) -> [usize; 4] {
        FACE_CORNERS[self as usize]
    }

    /// Neighbour direction this face looks towards.
    #[inline]
    pub const fn direction(self) -> Direction {
        match self {
            Face::Front => Direction::Front,
            Face::Back => Direction::Back,
            Face::Top => Direction::Up,
            Face::Bottom => Direction::Down,
            Face::Left => Direction::Left,
            Face::Right => Direction::Right,
        }
    }
}

/// Compact set of faces, one bit per [`Face`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct FaceSet(u8);

impl FaceSet {
    pub const EMPTY: FaceSet = FaceSet(0);
    pub const ALL: FaceSet = FaceSet(0b11_1111);

    #[inline]
    pub fn insert(&mut self, face: Face) {
        self.0 |= 1 << face.index();
    }

    #[inline]
    pub fn remove(&mut self, face: Face) {
        self.0 &= !(1 << face.index());
    }

    #[inline]
    pub const fn contains(self, face: Face) -> bool {
        self.0 & (1 << face as u8) != 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |face| self.contains(*face))
    }
}

impl FromIterator<Face> for FaceSet {
    fn from_iter<I: IntoIterator<Item = Face>>(iter: I) -> Self {
        let mut set = FaceSet::EMPTY;
        for face in iter {
            set.insert(face);
        }
        set
    }
}

/// Four atlas-normalized texture coordinates per face, matching the corner
/// order of [`Face::corners`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceUvs(pub [[Vec2; 4]; 6]);

impl FaceUvs {
    /// Same texture region on every face.
    pub fn single(region: AtlasRegion) -> Self {
        Self::per_face([region; 6])
    }

    /// One region per face, in [`Face::ALL`] order.
    pub fn per_face(regions: [AtlasRegion; 6]) -> Self {
        let mut uvs = [[Vec2::ZERO; 4]; 6];
        for face in Face::ALL {
            let region = regions[face.index()];
            for (corner, [s, t]) in FACE_CORNER_UVS[face.index()].iter().enumerate() {
                uvs[face.index()][corner] = Vec2::new(
                    region.u + s * region.width,
                    region.v + t * region.height,
                );
            }
        }
        Self(uvs)
    }

    /// Every face shows the `(px_x, px_y, px_w, px_h)` pixel rectangle of a
    /// `tile_px`-sized tile. Used for thin parts such as torch and lever sticks.
    pub fn sub_rect(
        region: AtlasRegion,
        px_x: f32,
        px_y: f32,
        px_w: f32,
        px_h: f32,
        tile_px: f32,
    ) -> Self {
        let scale = 1.0 / tile_px.max(1.0);
        Self::single(AtlasRegion {
            u: region.u + px_x * scale * region.width,
            v: region.v + px_y * scale * region.height,
            width: px_w * scale * region.width,
            height: px_h * scale * region.height,
        })
    }

    #[inline]
    pub fn face(&self, face: Face) -> &[Vec2; 4] {
        &self.0[face.index()]
    }
}

impl Default for FaceUvs {
    fn default() -> Self {
        Self::single(AtlasRegion::FULL)
    }
}

/// Box described by its 8 corners, a base colour (used for wireframes)
/// and per-face texture coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cuboid {
    pub vertices: [Vec3; 8],
    pub color: [u8; 3],
    pub uvs: FaceUvs,
}

impl Cuboid {
    pub fn axis_aligned(min: Vec3, max: Vec3, color: [u8; 3], uvs: FaceUvs) -> Self {
        Self {
            vertices: [
                Vec3::new(min.x, min.y, min.z),
                Vec3::new(max.x, min.y, min.z),
                Vec3::new(max.x, max.y, min.z),
                Vec3::new(min.x, max.y, min.z),
                Vec3::new(min.x, min.y, max.z),
                Vec3::new(max.x, min.y, max.z),
                Vec3::new(max.x, max.y, max.z),
                Vec3::new(min.x, max.y, max.z),
            ],
            color,
            uvs,
        }
    }

    /// Unit cube spanning `[0, 1]` on every axis.
    pub fn unit(color: [u8; 3], uvs: FaceUvs) -> Self {
        Self::axis_aligned(Vec3::ZERO, Vec3::ONE, color, uvs)
    }

    pub fn translated(mut self, offset: Vec3) -> Self {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
        self
    }

    /// Rotate every corner about `pivot` by Euler angles (radians, see
    /// [`RotateExt::rotate_euler`]).
    pub fn rotated_about(mut self, pivot: Vec3, angles: Vec3) -> Self {
        for vertex in &mut self.vertices {
            *vertex = (*vertex - pivot).rotate_euler(angles) + pivot;
        }
        self
    }

    /// Push every corner `margin` further away from the centre on each axis.
    pub fn expanded(mut self, margin: f32) -> Self {
        let center = self.center();
        for vertex in &mut self.vertices {
            let offset = *vertex - center;
            *vertex += Vec3::new(
                margin * offset.x.signum(),
                margin * offset.y.signum(),
                margin * offset.z.signum(),
            );
        }
        self
    }

    pub fn center(&self) -> Vec3 {
        self.vertices.iter().copied().sum::<Vec3>() / 8.0
    }

    #[inline]
    pub fn face_vertices(&self, face: Face) -> [Vec3; 4] {
        face.corners().map(|i| self.vertices[i])
    }

    /// Outward unit normal of `face`.
    pub fn face_normal(&self, face: Face) -> Vec3 {
        let [a, b, c, _] = self.face_vertices(face);
        triangle_normal(a, b, c)
    }
}
