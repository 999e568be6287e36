/// The three principal viewing axes.
///
/// Each orientation names the plane a slice lies in; slicing along it fixes
/// one array axis of the volume (see [`Orientation::layout`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Coronal,
    Sagittal,
    Axial,
}

/// How an orientation addresses the underlying `Array3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisLayout {
    /// Array axis that is fixed when slicing.
    pub array_axis: usize,
    /// Whether the extracted slice must be transposed to get rows = screen y
    /// and columns = screen x.
    pub transposed: bool,
}

const LAYOUTS: [AxisLayout; 3] = [
    // Coronal: slice is (column, slice) -> (slice, column)
    AxisLayout {
        array_axis: 0,
        transposed: true,
    },
    // Sagittal: slice is (row, slice) -> (slice, row)
    AxisLayout {
        array_axis: 1,
        transposed: true,
    },
    // Axial: slice is (row, column)
    AxisLayout {
        array_axis: 2,
        transposed: false,
    },
];

impl Orientation {
    pub const ALL: [Orientation; 3] = [
        Orientation::Coronal,
        Orientation::Sagittal,
        Orientation::Axial,
    ];

    pub const fn layout(self) -> AxisLayout {
        LAYOUTS[self as usize]
    }

    pub const fn array_axis(self) -> usize {
        self.layout().array_axis
    }
}

/// Tag distinguishing what the voxels of a volume mean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VolumeKind {
    #[default]
    Intensity,
    /// Voxels are colour-map indices, 0 meaning "nothing".
    Label,
}
