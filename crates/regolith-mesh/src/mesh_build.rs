use regolith_geom::Vec3;

/// Flat vertex/color/index arrays ready for upload.
#[derive(Default, Clone, Debug)]
pub struct MeshBuild {
    /// xyz per vertex.
    pub pos: Vec<f32>,
    /// rgba per vertex. Floats so brightness can exceed 1.0.
    pub col: Vec<f32>,
    pub idx: Vec<u32>,
}

impl MeshBuild {
    /// Pre-reserve for an `n x n` vertex grid.
    #[inline]
    pub fn reserve_grid(&mut self, n: usize) {
        let cells = n.saturating_sub(1) * n.saturating_sub(1);
        self.pos.reserve(n * n * 3);
        self.col.reserve(n * n * 4);
        self.idx.reserve(cells * 6);
    }

    #[inline]
    pub fn push_vertex(&mut self, p: Vec3, rgba: [f32; 4]) -> u32 {
        let i = self.vertex_count() as u32;
        self.pos.extend_from_slice(&[p.x, p.y, p.z]);
        self.col.extend_from_slice(&rgba);
        i
    }

    #[inline]
    pub fn push_tri(&mut self, a: u32, b: u32, c: u32) {
        self.idx.extend_from_slice(&[a, b, c]);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos[i * 3], self.pos[i * 3 + 1], self.pos[i * 3 + 2])
    }

    #[inline]
    pub fn color(&self, i: usize) -> [f32; 4] {
        [
            self.col[i * 4],
            self.col[i * 4 + 1],
            self.col[i * 4 + 2],
            self.col[i * 4 + 3],
        ]
    }

    /// Returns triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.idx.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}
