use std::cell::Cell;
use std::rc::Rc;

use marker_volume::{Marker, MarkerVolume, Orientation, Volume, VolumeGeometry, VolumeKind};
use ndarray::Array3;

fn host_image(dim: (usize, usize, usize)) -> Volume<u16> {
    Volume::new(
        Array3::from_elem(dim, 1000),
        VolumeGeometry::new([-20, 5, 100], dim).unwrap(),
    )
    .unwrap()
}

fn markers_for(image: &Volume<u16>) -> (MarkerVolume, Rc<Cell<usize>>) {
    let mut markers = MarkerVolume::new();
    markers.ensure_materialized(image.geometry());
    let changes = Rc::new(Cell::new(0));
    let handle = Rc::clone(&changes);
    markers.subscribe(move || handle.set(handle.get() + 1));
    (markers, changes)
}

#[test]
fn repeated_identical_edit_notifies_once() {
    let image = host_image((8, 9, 10));
    let (mut markers, changes) = markers_for(&image);

    markers.set_marker([3, 4, 5], 2).unwrap();
    markers.set_marker([3, 4, 5], 2).unwrap();

    assert_eq!(changes.get(), 1);
}

#[test]
fn stepping_on_an_empty_volume_falls_back_to_the_window_end() {
    let image = host_image((12, 12, 12));
    let (markers, _) = markers_for(&image);

    for orientation in Orientation::ALL {
        assert_eq!(markers.previous_marker(10, 3, orientation).unwrap(), 7);
        assert_eq!(markers.next_marker(10, 3, orientation).unwrap(), 12);
    }
}

#[test]
fn nearest_marker_prefers_the_later_slice_on_ties() {
    let image = host_image((10, 10, 10));
    let (mut markers, _) = markers_for(&image);
    markers.set_marker([2, 2, 5], 1).unwrap();
    markers.set_marker([8, 8, 7], 1).unwrap();

    assert_eq!(markers.nearest_marker(6, Orientation::Axial).unwrap(), 7);
}

#[test]
fn first_and_last_marker() {
    let image = host_image((6, 7, 8));
    let (mut markers, _) = markers_for(&image);

    for orientation in Orientation::ALL {
        assert_eq!(markers.first_marker(orientation).unwrap(), 1);
        assert_eq!(
            markers.last_marker(orientation).unwrap(),
            image.extent(orientation)
        );
    }

    markers.set_marker([4, 5, 6], 3).unwrap();
    for (orientation, k) in [
        (Orientation::Coronal, 4),
        (Orientation::Sagittal, 5),
        (Orientation::Axial, 6),
    ] {
        assert_eq!(markers.first_marker(orientation).unwrap(), k);
        assert_eq!(markers.last_marker(orientation).unwrap(), k);
    }
}

#[test]
fn a_written_marker_shows_up_in_every_slice_through_it() {
    let image = host_image((5, 6, 7));
    let (mut markers, _) = markers_for(&image);
    let [row, column, slice] = [2, 5, 3];
    markers.set_marker([row, column, slice], 4).unwrap();

    let expected = [
        (Orientation::Coronal, row, Marker { x: 5, y: 3, colour: 4 }),
        (Orientation::Sagittal, column, Marker { x: 2, y: 3, colour: 4 }),
        (Orientation::Axial, slice, Marker { x: 5, y: 2, colour: 4 }),
    ];
    for (orientation, index, marker) in expected {
        let found = markers
            .markers_in_slice(index as usize, orientation)
            .unwrap();
        assert_eq!(found.markers, vec![marker], "{orientation:?}");
    }
}

#[test]
fn slice_size_matches_the_host_image() {
    let image = host_image((5, 6, 7));
    let (markers, _) = markers_for(&image);

    for orientation in Orientation::ALL {
        let host = image.get_image_from_axis(1, orientation).unwrap();
        let found = markers.markers_in_slice(1, orientation).unwrap();
        assert_eq!(
            (found.width, found.height),
            (host.width() as usize, host.height() as usize)
        );
    }
}

#[test]
fn reset_clears_but_keeps_the_volume() {
    let image = host_image((4, 4, 4));
    let (mut markers, changes) = markers_for(&image);
    markers.set_marker([1, 2, 3], 1).unwrap();
    markers.set_marker([4, 4, 4], 2).unwrap();
    changes.set(0);

    markers.reset().unwrap();

    assert_eq!(changes.get(), 1);
    assert!(markers.exists());
    for orientation in Orientation::ALL {
        assert_eq!(markers.first_marker(orientation).unwrap(), 1);
    }
}

#[test]
fn clicks_outside_the_image_mark_the_nearest_voxel() {
    let image = host_image((4, 4, 4));
    let (mut markers, _) = markers_for(&image);

    markers.set_marker([-3, 2, 9], 6).unwrap();

    let global = image.geometry().to_global([1, 2, 4]);
    assert_eq!(markers.volume().unwrap().voxel(global), Some(6));
    assert_eq!(
        markers.clamp_to_volume(image.geometry().to_global([-3, 2, 9])),
        Ok(global)
    );
}

#[test]
fn sub_volume_edits_land_at_their_global_position() {
    let image = host_image((6, 6, 6));
    let (mut markers, changes) = markers_for(&image);

    let region = VolumeGeometry::new(image.geometry().to_global([2, 3, 4]), (2, 1, 1)).unwrap();
    let mut patch: Volume<u8> = Volume::blank(region);
    patch.set_kind(VolumeKind::Label);
    patch.data_mut().fill(9);
    markers.replace_sub_volume(&patch).unwrap();

    assert_eq!(changes.get(), 1);
    assert_eq!(markers.marker([2, 3, 4]).unwrap(), 9);
    assert_eq!(markers.marker([3, 3, 4]).unwrap(), 9);
    assert_eq!(markers.marker_count(), 2);
    assert_eq!(markers.first_marker(Orientation::Coronal).unwrap(), 2);
    assert_eq!(markers.last_marker(Orientation::Coronal).unwrap(), 3);
}

#[test]
fn growing_the_host_keeps_existing_markers() {
    let image = host_image((4, 4, 4));
    let (mut markers, changes) = markers_for(&image);
    markers.set_marker([4, 4, 4], 1).unwrap();
    let global = image.geometry().to_global([4, 4, 4]);

    let grown = VolumeGeometry::new(image.geometry().origin(), (8, 8, 8)).unwrap();
    markers.rebind_geometry(&grown);

    assert_eq!(changes.get(), 2);
    assert_eq!(markers.volume().unwrap().dim(), (8, 8, 8));
    assert_eq!(markers.volume().unwrap().voxel(global), Some(1));
    assert_eq!(markers.last_marker(Orientation::Axial).unwrap(), 4);
}
