//! Where photons start. Geometry lives outside this crate; the engine only
//! asks a [VertexProvider] for a point.

use crate::rand_gen::RandStream;
use crate::vec3::{Vector, Vectord};

/// Supplies the spatial origin of each emitted photon.
pub trait VertexProvider {
    /// Returns a point inside the region named `region`.
    fn generate_vertex(&mut self, region: &str) -> Vectord;
}

impl<V: VertexProvider + ?Sized> VertexProvider for &mut V {
    fn generate_vertex(&mut self, region: &str) -> Vectord {
        (**self).generate_vertex(region)
    }
}

impl<V: VertexProvider + ?Sized> VertexProvider for Box<V> {
    fn generate_vertex(&mut self, region: &str) -> Vectord {
        (**self).generate_vertex(region)
    }
}

/// Adapts any closure, e.g. one that asks a geometry model for a point.
pub struct FromFn<F>(pub F);

impl<F: FnMut(&str) -> Vectord> VertexProvider for FromFn<F> {
    fn generate_vertex(&mut self, region: &str) -> Vectord {
        (self.0)(region)
    }
}

/// A point-like emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSource {
    pub position: Vectord,
}

impl PointSource {
    pub fn new(position: Vectord) -> PointSource {
        PointSource { position }
    }
}

impl VertexProvider for PointSource {
    fn generate_vertex(&mut self, _region: &str) -> Vectord {
        self.position
    }
}

/// Points uniformly distributed inside an axis-aligned box.
#[derive(Debug)]
pub struct BoxVolume {
    center: Vectord,
    half_extents: Vectord,
    stream: RandStream,
}

impl BoxVolume {
    pub fn new(center: Vectord, half_extents: Vectord, stream: RandStream) -> BoxVolume {
        BoxVolume {
            center,
            half_extents: Vector::new(
                half_extents.x.abs(),
                half_extents.y.abs(),
                half_extents.z.abs(),
            ),
            stream,
        }
    }
}

impl VertexProvider for BoxVolume {
    fn generate_vertex(&mut self, _region: &str) -> Vectord {
        let mut offset = || 2.0 * self.stream.uniform() - 1.0;
        let (dx, dy, dz) = (offset(), offset(), offset());
        self.center
            + Vector::new(
                dx * self.half_extents.x,
                dy * self.half_extents.y,
                dz * self.half_extents.z,
            )
    }
}
