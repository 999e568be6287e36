use crate::enums::Orientation;
use crate::volume::VolumeError;

/// A voxel coordinate. Component `k` addresses array axis `k`.
pub type Coord = [i64; 3];

/// Placement and extent of a volume inside the global image space.
///
/// Local coordinates are 1-based: local `[1, 1, 1]` is the first voxel of the
/// volume and sits at the global coordinate `origin`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeGeometry {
    origin: Coord,
    dim: (usize, usize, usize),
}

impl VolumeGeometry {
    /// # Errors
    ///
    /// Returns [`VolumeError::EmptyDimensions`] if any extent is zero.
    /// Returns [`VolumeError::OriginOutOfRange`] if the last voxel would lie
    /// beyond the `i64` coordinate range.
    pub fn new(origin: Coord, dim: (usize, usize, usize)) -> Result<Self, VolumeError> {
        if dim.0 == 0 || dim.1 == 0 || dim.2 == 0 {
            return Err(VolumeError::EmptyDimensions(dim));
        }
        let size = [dim.0, dim.1, dim.2];
        let fits = (0..3).all(|k| {
            i64::try_from(size[k])
                .ok()
                .and_then(|extent| origin[k].checked_add(extent - 1))
                .is_some()
        });
        if !fits {
            return Err(VolumeError::OriginOutOfRange { origin, dim });
        }
        Ok(Self { origin, dim })
    }

    /// Geometry anchored at the global origin `[1, 1, 1]`.
    pub fn with_dim(dim: (usize, usize, usize)) -> Result<Self, VolumeError> {
        Self::new([1, 1, 1], dim)
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    /// Get the dimensions (rows, columns, slices)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.dim
    }

    pub fn size(&self) -> [usize; 3] {
        [self.dim.0, self.dim.1, self.dim.2]
    }

    /// Number of slices along an orientation.
    pub fn extent(&self, orientation: Orientation) -> usize {
        self.size()[orientation.array_axis()]
    }

    /// Saturates at the ends of the `i64` range.
    pub fn to_global(&self, local: Coord) -> Coord {
        std::array::from_fn(|k| saturate(local[k] as i128 + self.origin[k] as i128 - 1))
    }

    /// Saturates at the ends of the `i64` range.
    pub fn to_local(&self, global: Coord) -> Coord {
        std::array::from_fn(|k| saturate(global[k] as i128 - self.origin[k] as i128 + 1))
    }

    pub fn contains_local(&self, local: Coord) -> bool {
        let size = self.size();
        (0..3).all(|k| local[k] >= 1 && local[k] <= size[k] as i64)
    }

    pub fn contains_global(&self, global: Coord) -> bool {
        self.contains_local(self.to_local(global))
    }

    /// Snap a global coordinate onto the nearest voxel of this volume, each
    /// axis clamped independently.
    pub fn clamp_to_volume(&self, global: Coord) -> Coord {
        self.to_global(self.clamp_local(self.to_local(global)))
    }

    /// Snap a local coordinate into `[1, size]` on every axis.
    pub fn clamp_local(&self, local: Coord) -> Coord {
        let size = self.size();
        std::array::from_fn(|k| local[k].clamp(1, size[k] as i64))
    }

    /// Zero-based array index of a global coordinate, if it lies inside.
    pub fn array_index(&self, global: Coord) -> Option<[usize; 3]> {
        let local = self.to_local(global);
        if !self.contains_local(local) {
            return None;
        }
        Some(std::array::from_fn(|k| (local[k] - 1) as usize))
    }

    /// Global bounding box `(first, last)` of the volume, both inclusive.
    pub fn global_bounds(&self) -> (Coord, Coord) {
        let size = self.size();
        (
            self.origin,
            self.to_global(std::array::from_fn(|k| size[k] as i64)),
        )
    }

    /// Intersection of two geometries in global space, as `(first, last)`.
    pub fn overlap(&self, other: &VolumeGeometry) -> Option<(Coord, Coord)> {
        let (a_lo, a_hi) = self.global_bounds();
        let (b_lo, b_hi) = other.global_bounds();
        let lo: Coord = std::array::from_fn(|k| a_lo[k].max(b_lo[k]));
        let hi: Coord = std::array::from_fn(|k| a_hi[k].min(b_hi[k]));
        (0..3).all(|k| lo[k] <= hi[k]).then_some((lo, hi))
    }

    /// Whether `other` lies completely inside this geometry.
    pub fn encloses(&self, other: &VolumeGeometry) -> bool {
        let (lo, hi) = other.global_bounds();
        self.contains_global(lo) && self.contains_global(hi)
    }
}

fn saturate(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> VolumeGeometry {
        VolumeGeometry::new([10, -4, 3], (5, 6, 7)).unwrap()
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert!(matches!(
            VolumeGeometry::with_dim((4, 0, 4)),
            Err(VolumeError::EmptyDimensions((4, 0, 4)))
        ));
    }

    #[test]
    fn local_one_maps_to_origin() {
        let g = geometry();
        assert_eq!(g.to_global([1, 1, 1]), [10, -4, 3]);
        assert_eq!(g.to_local([10, -4, 3]), [1, 1, 1]);
        assert_eq!(g.to_local(g.to_global([-7, 40, 2])), [-7, 40, 2]);
    }

    #[test]
    fn clamps_each_axis_independently() {
        let g = geometry();
        let clamped = g.clamp_to_volume(g.to_global([0, 3, 99]));
        assert_eq!(g.to_local(clamped), [1, 3, 7]);
    }

    #[test]
    fn extreme_coordinates_clamp_without_overflow() {
        let g = geometry();
        let low = g.clamp_to_volume([i64::MIN, i64::MIN, i64::MIN]);
        let high = g.clamp_to_volume([i64::MAX, i64::MAX, i64::MAX]);
        assert_eq!(g.to_local(low), [1, 1, 1]);
        assert_eq!(g.to_local(high), [5, 6, 7]);

        let shifted = VolumeGeometry::new([5, 1, 1], (4, 4, 4)).unwrap();
        assert_eq!(shifted.clamp_to_volume([i64::MIN, 1, 1]), [5, 1, 1]);
        assert_eq!(shifted.clamp_local([i64::MAX, i64::MIN, 2]), [4, 1, 2]);

        let far = VolumeGeometry::new([i64::MIN, i64::MAX - 3, 0], (4, 4, 4)).unwrap();
        assert_eq!(far.to_global([1, 4, 1]), [i64::MIN, i64::MAX, 0]);
        assert_eq!(far.to_local([i64::MIN, i64::MAX, 0]), [1, 4, 1]);
        assert_eq!(
            far.clamp_to_volume([i64::MAX, i64::MIN, i64::MAX]),
            [i64::MIN + 3, i64::MAX - 3, 3]
        );
    }

    #[test]
    fn rejects_volumes_running_past_the_coordinate_range() {
        assert!(VolumeGeometry::new([i64::MAX, 1, 1], (1, 1, 1)).is_ok());
        assert!(matches!(
            VolumeGeometry::new([i64::MAX, 1, 1], (2, 1, 1)),
            Err(VolumeError::OriginOutOfRange { .. })
        ));
    }

    #[test]
    fn array_index_is_zero_based() {
        let g = geometry();
        assert_eq!(g.array_index(g.to_global([1, 1, 1])), Some([0, 0, 0]));
        assert_eq!(g.array_index(g.to_global([5, 6, 7])), Some([4, 5, 6]));
        assert_eq!(g.array_index(g.to_global([6, 1, 1])), None);
    }

    #[test]
    fn overlap_and_enclosure() {
        let outer = VolumeGeometry::with_dim((10, 10, 10)).unwrap();
        let inner = VolumeGeometry::new([3, 3, 3], (2, 2, 2)).unwrap();
        let shifted = VolumeGeometry::new([9, 9, 9], (4, 4, 4)).unwrap();
        let apart = VolumeGeometry::new([20, 1, 1], (2, 2, 2)).unwrap();

        assert!(outer.encloses(&inner));
        assert!(!outer.encloses(&shifted));
        assert_eq!(outer.overlap(&shifted), Some(([9, 9, 9], [10, 10, 10])));
        assert_eq!(outer.overlap(&apart), None);
    }
}
