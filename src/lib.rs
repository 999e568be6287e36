//! # Marker-volume library
//!
//! This crate provides a sparse, colour-coded marker overlay for 3D images
//! together with the queries a viewer needs to move between marked slices.

//!
//! A [`MarkerVolume`] is a label volume laid over a host image and sharing its
//! geometry. A voxel value of zero means "no marker", any other value is a
//! marker category. The marker volume is created lazily from the host's
//! [`VolumeGeometry`] and supports:
//!  - Single-voxel edits in local coordinates, clamped to the nearest voxel
//!  - Bulk replacement of a sub-region
//!  - Listing the markers of a slice in screen orientation
//!  - Navigation along any of the three axes (previous, next, nearest, first
//!    and last marked slice)
//!
//! Coordinates are 1-based. Array axis 0 is the image row, axis 1 the
//! column and axis 2 the slice, so:
//!  - Coronal slices fix the row
//!  - Sagittal slices fix the column
//!  - Axial slices fix the slice
//!
//! Every mutation that changes the volume notifies subscribed listeners
//! synchronously before it returns.
//!
//! # Examples
//!
//! ## Marking a host image and navigating between markers
//!
//! ```
//! # use marker_volume::{MarkerVolume, Orientation, Volume};
//! # use ndarray::Array3;
//! let image = Volume::from_data(Array3::<u16>::zeros((64, 64, 40)))
//!     .expect("should have accepted a nonempty volume");
//!
//! let mut markers = MarkerVolume::new();
//! markers.ensure_materialized(image.geometry());
//! markers.set_marker([10, 12, 5], 1).expect("volume exists");
//! markers.set_marker([30, 40, 22], 2).expect("volume exists");
//!
//! let next = markers
//!     .next_marker(5, 40, Orientation::Axial)
//!     .expect("volume exists");
//! assert_eq!(next, 22);
//!
//! let slice = markers
//!     .markers_in_slice(next, Orientation::Axial)
//!     .expect("slice is inside the volume");
//! assert_eq!(slice.markers.len(), 1);
//! ```

pub mod enums;
pub mod geometry;
pub mod marker_volume;
pub mod navigation;
pub mod notify;
pub mod volume;

pub use enums::{Orientation, VolumeKind};
pub use geometry::{Coord, VolumeGeometry};
pub use marker_volume::{Marker, MarkerVolume, MarkerVolumeError, SliceMarkers};
pub use navigation::PresenceProfile;
pub use notify::ListenerId;
pub use volume::{Volume, VolumeError};
