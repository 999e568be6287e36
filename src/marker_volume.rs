use crate::enums::Orientation;
use crate::enums::VolumeKind;
use crate::geometry::Coord;
use crate::geometry::VolumeGeometry;
use crate::navigation::PresenceProfile;
use crate::notify::ChangeNotifier;
use crate::notify::ListenerId;
use crate::volume::Volume;
use crate::volume::VolumeError;

use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkerVolumeError {
    #[error("Marker volume has not been created yet")]
    NotMaterialized,

    #[error("Slice {index} is outside 1..={extent} along {orientation:?}")]
    SliceOutOfRange {
        index: usize,
        orientation: Orientation,
        extent: usize,
    },

    #[error("Replacement voxels must be label data")]
    NotLabelData,

    #[error(transparent)]
    Volume(#[from] VolumeError),
}

/// A marker found in a 2D slice. `x` is the 1-based screen column and `y`
/// the 1-based screen row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker {
    pub x: usize,
    pub y: usize,
    pub colour: u8,
}

/// Markers of one slice together with the slice size in screen orientation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SliceMarkers {
    pub markers: Vec<Marker>,
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Default)]
enum MarkerState {
    #[default]
    Unmaterialized,
    Materialized(Volume<u8>),
}

/// Sparse colour-coded marker points laid over a host image.
///
/// The volume is created lazily with [`MarkerVolume::ensure_materialized`];
/// until then every operation that needs voxels returns
/// [`MarkerVolumeError::NotMaterialized`]. Every mutation that changes the
/// volume notifies subscribers synchronously before returning.
#[derive(Debug, Default)]
pub struct MarkerVolume {
    state: MarkerState,
    changed: ChangeNotifier,
}

impl MarkerVolume {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the voxel storage has been allocated.
    pub fn exists(&self) -> bool {
        matches!(self.state, MarkerState::Materialized(_))
    }

    pub fn volume(&self) -> Option<&Volume<u8>> {
        match &self.state {
            MarkerState::Materialized(volume) => Some(volume),
            MarkerState::Unmaterialized => None,
        }
    }

    pub fn geometry(&self) -> Option<&VolumeGeometry> {
        self.volume().map(Volume::geometry)
    }

    fn materialized(&self) -> Result<&Volume<u8>, MarkerVolumeError> {
        self.volume().ok_or(MarkerVolumeError::NotMaterialized)
    }

    fn materialized_mut(&mut self) -> Result<&mut Volume<u8>, MarkerVolumeError> {
        match &mut self.state {
            MarkerState::Materialized(volume) => Ok(volume),
            MarkerState::Unmaterialized => Err(MarkerVolumeError::NotMaterialized),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> ListenerId {
        self.changed.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.changed.unsubscribe(id)
    }

    fn notify_changed(&mut self) {
        self.changed.notify();
    }

    /// Allocate an empty label volume shaped like `template`, unless one
    /// already exists.
    pub fn ensure_materialized(&mut self, template: &VolumeGeometry) {
        if self.exists() {
            return;
        }
        let mut volume = Volume::<u8>::blank(*template);
        volume.set_kind(VolumeKind::Label);
        log::debug!(
            "created marker volume {:?} at origin {:?}",
            template.dim(),
            template.origin()
        );
        self.state = MarkerState::Materialized(volume);
        self.notify_changed();
    }

    /// Clear every marker, keeping the allocation.
    pub fn reset(&mut self) -> Result<(), MarkerVolumeError> {
        self.materialized_mut()?.clear();
        log::debug!("cleared marker volume");
        self.notify_changed();
        Ok(())
    }

    /// Follow a change of the host image geometry.
    ///
    /// Markers keep their global position. Those that fall outside the new
    /// bounds are dropped. Nothing happens when the geometry is unchanged or
    /// the volume does not exist yet.
    pub fn rebind_geometry(&mut self, template: &VolumeGeometry) {
        let MarkerState::Materialized(old) = &self.state else {
            return;
        };
        if old.geometry() == template {
            return;
        }

        let mut rebound = Volume::<u8>::blank(*template);
        rebound.set_kind(VolumeKind::Label);
        rebound.copy_overlap(old);

        let before = count_markers(old);
        let after = count_markers(&rebound);
        if after < before {
            log::warn!(
                "{} marker(s) fell outside the new geometry {:?} and were dropped",
                before - after,
                template.dim()
            );
        }
        log::debug!(
            "rebound marker volume from {:?} to {:?}",
            old.geometry().dim(),
            template.dim()
        );
        self.state = MarkerState::Materialized(rebound);
        self.notify_changed();
    }

    /// Snap a global coordinate onto the nearest voxel of the marker volume.
    pub fn clamp_to_volume(&self, global: Coord) -> Result<Coord, MarkerVolumeError> {
        Ok(self.materialized()?.geometry().clamp_to_volume(global))
    }

    /// Colour at a local coordinate, clamped into the volume.
    pub fn marker(&self, local: Coord) -> Result<u8, MarkerVolumeError> {
        let volume = self.materialized()?;
        let geometry = volume.geometry();
        let global = geometry.to_global(geometry.clamp_local(local));
        Ok(volume.voxel(global).unwrap_or_default())
    }

    /// Write `colour` at a local coordinate, clamped into the volume.
    ///
    /// Returns whether the voxel changed; listeners are only notified when it
    /// did.
    pub fn set_marker(&mut self, local: Coord, colour: u8) -> Result<bool, MarkerVolumeError> {
        let volume = self.materialized_mut()?;
        let geometry = *volume.geometry();
        let global = geometry.to_global(geometry.clamp_local(local));
        if volume.voxel(global) == Some(colour) {
            return Ok(false);
        }
        volume.set_voxel(global, colour)?;
        log::trace!("marker {colour} set at {global:?}");
        self.notify_changed();
        Ok(true)
    }

    /// Overwrite the region covered by `sub_volume` with its voxels.
    ///
    /// Listeners are notified even if no voxel actually changed.
    pub fn replace_sub_volume(&mut self, sub_volume: &Volume<u8>) -> Result<(), MarkerVolumeError> {
        if sub_volume.kind() != VolumeKind::Label {
            return Err(MarkerVolumeError::NotLabelData);
        }
        self.materialized_mut()?.assign_region(sub_volume)?;
        log::debug!(
            "replaced marker region {:?} at {:?}",
            sub_volume.dim(),
            sub_volume.geometry().origin()
        );
        self.notify_changed();
        Ok(())
    }

    /// Number of voxels carrying a marker.
    pub fn marker_count(&self) -> usize {
        self.volume().map_or(0, count_markers)
    }

    /// All markers in the 1-based slice `index`, in row-major screen order.
    pub fn markers_in_slice(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Result<SliceMarkers, MarkerVolumeError> {
        let volume = self.materialized()?;
        let slice = volume.get_screen_slice(index, orientation).ok_or(
            MarkerVolumeError::SliceOutOfRange {
                index,
                orientation,
                extent: volume.extent(orientation),
            },
        )?;

        let (height, width) = slice.dim();
        let markers = slice
            .indexed_iter()
            .filter(|&(_, &colour)| colour != 0)
            .map(|((row, column), &colour)| Marker {
                x: column + 1,
                y: row + 1,
                colour,
            })
            .collect();
        Ok(SliceMarkers {
            markers,
            width,
            height,
        })
    }

    pub fn presence_profile(
        &self,
        orientation: Orientation,
    ) -> Result<PresenceProfile, MarkerVolumeError> {
        Ok(PresenceProfile::from_labels(
            self.materialized()?.data(),
            orientation,
        ))
    }

    /// See [`PresenceProfile::previous`].
    pub fn previous_marker(
        &self,
        current: usize,
        max_skip: usize,
        orientation: Orientation,
    ) -> Result<usize, MarkerVolumeError> {
        Ok(self.presence_profile(orientation)?.previous(current, max_skip))
    }

    /// See [`PresenceProfile::next`].
    pub fn next_marker(
        &self,
        current: usize,
        max_skip: usize,
        orientation: Orientation,
    ) -> Result<usize, MarkerVolumeError> {
        Ok(self.presence_profile(orientation)?.next(current, max_skip))
    }

    pub fn nearest_marker(
        &self,
        current: usize,
        orientation: Orientation,
    ) -> Result<usize, MarkerVolumeError> {
        Ok(self.presence_profile(orientation)?.nearest(current))
    }

    pub fn first_marker(&self, orientation: Orientation) -> Result<usize, MarkerVolumeError> {
        Ok(self.presence_profile(orientation)?.first())
    }

    pub fn last_marker(&self, orientation: Orientation) -> Result<usize, MarkerVolumeError> {
        Ok(self.presence_profile(orientation)?.last())
    }
}

fn count_markers(volume: &Volume<u8>) -> usize {
    volume
        .data()
        .par_iter()
        .filter(|&&v| v != 0)
        .count()
}
