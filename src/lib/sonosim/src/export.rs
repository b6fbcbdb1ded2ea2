use bytemuck::Pod;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::grid::CellBlock;
use crate::step::GridLayout;
use crate::vec3::Vec3;

pub const PRESSURE_FILE: &str = "pressure_result.bin";
pub const POTENTIAL_FILE: &str = "potential_result.bin";
pub const FORCE_X_FILE: &str = "force_x_result.bin";
pub const FORCE_Y_FILE: &str = "force_y_result.bin";
pub const FORCE_Z_FILE: &str = "force_z_result.bin";
pub const METADATA_FILE: &str = "metadata.json";

/// Manifest describing the binary result files: cell counts and real-space
/// bounds of every grid. Written as `metadata.json` next to the blobs so
/// visualization tools can map bytes back to space.
#[derive(Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub version: u32,
    pub pressure_cnt: Vec3<usize>,
    pub pressure_beg: Vec3<f64>,
    pub pressure_end: Vec3<f64>,
    pub potential_cnt: Vec3<usize>,
    pub potential_beg: Vec3<f64>,
    pub potential_end: Vec3<f64>,
    pub force_cnt: Vec3<usize>,
    pub force_beg: Vec3<f64>,
    pub force_end: Vec3<f64>,
}

impl ExportMetadata {
    pub const VERSION: u32 = 1;

    pub fn from_layout(layout: &GridLayout) -> Self {
        Self {
            version: Self::VERSION,
            pressure_cnt: layout.pressure.dimension_size(),
            pressure_beg: layout.pressure.begin(),
            pressure_end: layout.pressure.end(),
            potential_cnt: layout.potential.dimension_size(),
            potential_beg: layout.potential.begin(),
            potential_end: layout.potential.end(),
            force_cnt: layout.force.dimension_size(),
            force_beg: layout.force.begin(),
            force_end: layout.force.end(),
        }
    }
}

/// Dump a block's cells to `directory/name` in native byte order,
/// overwriting any previous result.
pub(crate) fn write_block<T: Pod>(
    directory: &Path,
    name: &str,
    block: &CellBlock<T>,
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(directory.join(name))?);
    writer.write_all(block.as_bytes())?;
    writer.flush()
}

pub(crate) fn write_metadata(directory: &Path, metadata: &ExportMetadata) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(directory.join(METADATA_FILE))?);
    serde_json::to_writer_pretty(&mut writer, metadata)?;
    writer.flush()
}
