use std::cell::Cell;
use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use marker_volume::{MarkerVolume, Orientation, Volume, VolumeGeometry};
use ndarray::Array3;

/// Places a few markers on a synthetic image and walks through them.
#[derive(Parser, Debug)]
#[command(name = "marker-volume", version)]
struct Cli {
    /// Image size as rows,columns,slices
    #[arg(long, value_delimiter = ',', default_values_t = [64, 64, 40])]
    dim: Vec<usize>,

    /// Global coordinate of the first voxel
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, default_values_t = [1, 1, 1])]
    origin: Vec<i64>,

    /// Where to save the image slice holding the first axial marker
    #[arg(long, short, default_value = "result.png")]
    output: PathBuf,
}

fn synthetic_image(geometry: VolumeGeometry) -> Result<Volume<u16>, Box<dyn Error>> {
    let (rows, columns, slices) = geometry.dim();
    let centre = (rows as f32 / 2.0, columns as f32 / 2.0, slices as f32 / 2.0);
    let radius = centre.0.min(centre.1).min(centre.2).max(1.0);
    let data = Array3::from_shape_fn(geometry.dim(), |(i, j, k)| {
        let d = ((i as f32 - centre.0).powi(2)
            + (j as f32 - centre.1).powi(2)
            + (k as f32 - centre.2).powi(2))
        .sqrt();
        ((1.0 - (d / radius).min(1.0)) * 65535.0) as u16
    });
    Ok(Volume::new(data, geometry)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let dim: [usize; 3] = cli
        .dim
        .as_slice()
        .try_into()
        .map_err(|_| "--dim takes exactly three values")?;
    let origin: [i64; 3] = cli
        .origin
        .as_slice()
        .try_into()
        .map_err(|_| "--origin takes exactly three values")?;
    let geometry = VolumeGeometry::new(origin, (dim[0], dim[1], dim[2]))?;
    let image = synthetic_image(geometry)?;

    let redraws = Rc::new(Cell::new(0));
    let mut markers = MarkerVolume::new();
    {
        let redraws = Rc::clone(&redraws);
        markers.subscribe(move || redraws.set(redraws.get() + 1));
    }
    markers.ensure_materialized(image.geometry());

    let (rows, columns, slices) = (dim[0] as i64, dim[1] as i64, dim[2] as i64);
    markers.set_marker([rows / 4, columns / 4, slices / 4], 1)?;
    markers.set_marker([rows / 2, columns / 2, slices / 2], 2)?;
    markers.set_marker([rows / 2, columns / 2, slices / 2], 2)?;
    // Outside the image on purpose: snaps onto the last voxel
    markers.set_marker([rows + 10, columns + 10, slices + 10], 3)?;

    println!(
        "{} markers placed, {} change notifications",
        markers.marker_count(),
        redraws.get()
    );

    for orientation in Orientation::ALL {
        let first = markers.first_marker(orientation)?;
        let last = markers.last_marker(orientation)?;
        let middle = image.extent(orientation) / 2;
        println!(
            "{orientation:?}: first {first}, last {last}, nearest to {middle} is {}, \
             next after {first} is {}, previous before {last} is {}",
            markers.nearest_marker(middle, orientation)?,
            markers.next_marker(first, 10, orientation)?,
            markers.previous_marker(last, 10, orientation)?,
        );

        let slice = markers.markers_in_slice(first, orientation)?;
        for marker in &slice.markers {
            println!(
                "  slice {first} ({}x{}): colour {} at x={} y={}",
                slice.width, slice.height, marker.colour, marker.x, marker.y
            );
        }
    }

    let axial = markers.first_marker(Orientation::Axial)?;
    let slice_image = image
        .get_image_from_axis(axial, Orientation::Axial)
        .ok_or("should have returned image at first marked slice")?;
    slice_image.save(&cli.output)?;
    println!("saved axial slice {axial} to {}", cli.output.display());

    markers.reset()?;
    println!(
        "after reset: {} markers, {} change notifications",
        markers.marker_count(),
        redraws.get()
    );
    Ok(())
}
