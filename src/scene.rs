//! Renderable scene: the particle field, its shared mesh and the camera.

use bytemuck::{Pod, Zeroable};
use rand::Rng;

use crate::camera::OrthographicCamera;
use crate::field::{ParticleField, ShapeParameters};

/// Per-particle data uploaded to the instance buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

/// Indexed triangle mesh.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
}

/// Unit-radius icosahedron with no subdivision.
pub fn icosahedron() -> Mesh {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let raw = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let vertices = raw
        .iter()
        .map(|v| glam::Vec3::from_array(*v).normalize().to_array())
        .collect();

    #[rustfmt::skip]
    let indices = vec![
        0, 11, 5,   0, 5, 1,    0, 1, 7,    0, 7, 10,   0, 10, 11,
        1, 5, 9,    5, 11, 4,   11, 10, 2,  10, 7, 6,   7, 1, 8,
        3, 9, 4,    3, 4, 2,    3, 2, 6,    3, 6, 8,    3, 8, 9,
        4, 9, 5,    2, 4, 11,   6, 2, 10,   8, 6, 7,    9, 8, 1,
    ];

    Mesh { vertices, indices }
}

/// Everything the renderer draws.
///
/// Holds the particle field and camera. Every change to particle positions
/// bumps [`SceneGraph::revision`] so the GPU side knows when to re-upload.
pub struct SceneGraph {
    field: ParticleField,
    camera: OrthographicCamera,
    mesh: Mesh,
    revision: u64,
}

impl SceneGraph {
    pub fn new(field: ParticleField, camera: OrthographicCamera) -> Self {
        Self {
            field,
            camera,
            mesh: icosahedron(),
            revision: 0,
        }
    }

    #[inline]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    #[inline]
    pub fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut OrthographicCamera {
        &mut self.camera
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Incremented whenever particle positions or the particle set change.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Move every particle to its place for `shape`.
    pub fn reposition(&mut self, shape: ShapeParameters) {
        self.field.reposition(shape);
        self.revision += 1;
    }

    /// Replace the field with `count` particles (see [`ParticleField::rebuild`]).
    pub fn rebuild<R: Rng + ?Sized>(&mut self, count: usize, shape: ShapeParameters, rng: &mut R) {
        self.field.rebuild(count, shape, rng);
        self.revision += 1;
    }

    /// Instance data for every particle, in index order.
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.field
            .particles()
            .iter()
            .map(|p| ParticleInstance {
                position: p.position().to_array(),
                size: p.size(),
                color: p.color().to_array(),
                _pad: 0.0,
            })
            .collect()
    }
}
