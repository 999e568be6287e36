use crate::enums::Orientation;
use crate::enums::VolumeKind;
use crate::geometry::Coord;
use crate::geometry::VolumeGeometry;

use image::ImageBuffer;
use image::Luma;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::ArrayViewMut3;
use ndarray::Axis;
use ndarray::s;
use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VolumeError {
    #[error("Volume dimensions must be nonzero, got {0:?}")]
    EmptyDimensions((usize, usize, usize)),

    #[error("Data dimensions {actual:?} do not match geometry {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    #[error("Volume at {origin:?} with size {dim:?} runs past the coordinate range")]
    OriginOutOfRange {
        origin: Coord,
        dim: (usize, usize, usize),
    },

    #[error("Coordinate {0:?} lies outside the volume")]
    OutOfBounds(Coord),

    #[error("Region starting at {origin:?} with size {dim:?} does not fit inside the volume")]
    RegionOutOfBounds {
        origin: Coord,
        dim: (usize, usize, usize),
    },
}

/// A voxel volume placed in global image space.
///
/// This is the host image a marker volume is bound to, and also the storage
/// type of the marker volume itself (with `T = u8` and [`VolumeKind::Label`]).
#[derive(Clone, Debug)]
pub struct Volume<T> {
    data: Array3<T>,
    geometry: VolumeGeometry,
    kind: VolumeKind,
}

impl<T> Volume<T> {
    /// # Errors
    ///
    /// Returns [`VolumeError::ShapeMismatch`] if `data` is not shaped like
    /// `geometry`.
    pub fn new(data: Array3<T>, geometry: VolumeGeometry) -> Result<Self, VolumeError> {
        if data.dim() != geometry.dim() {
            return Err(VolumeError::ShapeMismatch {
                expected: geometry.dim(),
                actual: data.dim(),
            });
        }
        Ok(Self {
            data,
            geometry,
            kind: VolumeKind::default(),
        })
    }

    /// Wrap an array whose first voxel sits at the global origin `[1, 1, 1]`.
    pub fn from_data(data: Array3<T>) -> Result<Self, VolumeError> {
        let geometry = VolumeGeometry::with_dim(data.dim())?;
        Self::new(data, geometry)
    }

    /// Get the dimensions of the volume (rows, columns, slices)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<T> {
        &self.data
    }

    /// Get a mutable view of the underlying data
    pub fn data_mut(&mut self) -> ArrayViewMut3<'_, T> {
        self.data.view_mut()
    }

    pub fn kind(&self) -> VolumeKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: VolumeKind) {
        self.kind = kind;
    }

    pub fn extent(&self, orientation: Orientation) -> usize {
        self.geometry.extent(orientation)
    }

    pub fn contains_global(&self, global: Coord) -> bool {
        self.geometry.contains_global(global)
    }

    /// A zero-filled volume of another voxel type with this volume's geometry.
    pub fn blank_copy<U: Clone + Default>(&self) -> Volume<U> {
        Volume::blank(self.geometry)
    }

    /// Get the slice at the 1-based `index` in array order.
    pub fn get_slice_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Option<ArrayView2<'_, T>> {
        if !self.is_valid_index(index, orientation) {
            return None;
        }
        Some(
            self.data
                .index_axis(Axis(orientation.array_axis()), index - 1),
        )
    }

    /// Get the slice at the 1-based `index` with rows running along screen y
    /// and columns along screen x.
    pub fn get_screen_slice(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Option<ArrayView2<'_, T>> {
        let slice = self.get_slice_from_axis(index, orientation)?;
        if orientation.layout().transposed {
            Some(slice.reversed_axes())
        } else {
            Some(slice)
        }
    }

    fn is_valid_index(&self, index: usize, orientation: Orientation) -> bool {
        index >= 1 && index <= self.extent(orientation)
    }

    /// Zero-based array index of the first voxel of `region`, which must lie
    /// inside.
    fn region_bounds(&self, region: &VolumeGeometry) -> Result<[usize; 3], VolumeError> {
        if !self.geometry.encloses(region) {
            return Err(VolumeError::RegionOutOfBounds {
                origin: region.origin(),
                dim: region.dim(),
            });
        }
        self.geometry
            .array_index(region.origin())
            .ok_or(VolumeError::OutOfBounds(region.origin()))
    }
}

impl<T: Clone + Default> Volume<T> {
    pub fn blank(geometry: VolumeGeometry) -> Self {
        Self {
            data: Array3::from_elem(geometry.dim(), T::default()),
            geometry,
            kind: VolumeKind::default(),
        }
    }

    /// Set every voxel back to the default value without reallocating.
    pub fn clear(&mut self) {
        self.data.fill(T::default());
    }
}

impl<T: Copy> Volume<T> {
    pub fn voxel(&self, global: Coord) -> Option<T> {
        let index = self.geometry.array_index(global)?;
        Some(self.data[index])
    }

    /// # Errors
    ///
    /// Returns [`VolumeError::OutOfBounds`] if `global` is not inside the volume.
    pub fn set_voxel(&mut self, global: Coord, value: T) -> Result<(), VolumeError> {
        let index = self
            .geometry
            .array_index(global)
            .ok_or(VolumeError::OutOfBounds(global))?;
        self.data[index] = value;
        Ok(())
    }

    /// Overwrite the region covered by `source` with its voxels.
    pub fn assign_region(&mut self, source: &Volume<T>) -> Result<(), VolumeError> {
        let [i, j, k] = self.region_bounds(source.geometry())?;
        let (di, dj, dk) = source.dim();
        self.data
            .slice_mut(s![i..i + di, j..j + dj, k..k + dk])
            .assign(&source.data);
        Ok(())
    }

    /// Copy the voxels of `source` that share a global position with this
    /// volume. Voxels outside the overlap are left untouched.
    pub fn copy_overlap(&mut self, source: &Volume<T>) {
        let Some((lo, hi)) = self.geometry.overlap(source.geometry()) else {
            return;
        };
        let (Some(to), Some(from)) = (
            self.geometry.array_index(lo),
            source.geometry.array_index(lo),
        ) else {
            return;
        };
        let n: [usize; 3] = std::array::from_fn(|k| (hi[k] - lo[k] + 1) as usize);
        self.data
            .slice_mut(s![
                to[0]..to[0] + n[0],
                to[1]..to[1] + n[1],
                to[2]..to[2] + n[2]
            ])
            .assign(&source.data.slice(s![
                from[0]..from[0] + n[0],
                from[1]..from[1] + n[1],
                from[2]..from[2] + n[2]
            ]));
    }
}

impl Volume<u16> {
    #[inline]
    fn normalize_to_u8(value: u16) -> u8 {
        ((value as f32 / 65535.0) * 255.0).clamp(0.0, 255.0) as u8
    }

    // Extract slice to image conversion
    fn slice_to_image(slice: &ArrayView2<'_, u16>) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let (height, width) = slice.dim();
        let pixel_data: Vec<u8> = slice
            .into_par_iter()
            .map(|&v| Self::normalize_to_u8(v))
            .collect();
        ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
    }

    /// Render the slice at the 1-based `index` as an 8-bit greyscale image in
    /// screen orientation.
    pub fn get_image_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let slice = self.get_screen_slice(index, orientation)?;
        Self::slice_to_image(&slice)
    }
}
