use std::{fs::File, path::Path};

use memmap::{Mmap, MmapOptions};
use nalgebra::Vector3;

use super::{parse::fld_parser, Volume};

/// Width of one sample in the data section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Byte,
    Short,
}

impl ElementKind {
    pub fn size_of(self) -> usize {
        match self {
            ElementKind::Byte => 1,
            ElementKind::Short => 2,
        }
    }
}

/// Everything the header told us about the file.
/// Dimensions may be zero when the header was malformed;
/// [`build_volume`] validates before touching the data section.
#[derive(Debug, Clone, Copy)]
pub struct VolumeMetadata {
    pub size: Vector3<usize>,
    pub element: ElementKind,
    pub data_offset: usize,
}

/// Raw file bytes, either owned or memory mapped.
pub enum DataSource {
    Vec(Vec<u8>),
    Mmap(Mmap),
}

impl DataSource {
    pub fn get_slice(&self) -> &[u8] {
        match self {
            DataSource::Vec(v) => v.as_slice(),
            DataSource::Mmap(m) => &m[..],
        }
    }

    pub fn from_file<P>(path: P) -> Result<DataSource, &'static str>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();

        if !path.is_file() {
            return Err("Path does not lead to a file");
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return Err("Cannot open file"),
        };

        // Safety: mapping is read-only and the file is not truncated by us
        let mmap = match unsafe { MmapOptions::new().map(&file) } {
            Ok(mmap) => mmap,
            Err(_) => return Err("Cannot create memory map"),
        };

        Ok(DataSource::Mmap(mmap))
    }
}

/// Parse and build a [`Volume`] from an AVS `.fld` file.
pub fn from_file<P>(path: P) -> Result<Volume, &'static str>
where
    P: AsRef<Path>,
{
    let ds = DataSource::from_file(path)?;
    let metadata = fld_parser(ds.get_slice())?;
    build_volume(metadata, &ds)
}

/// Widen the data section to `u16` samples and construct the volume.
pub fn build_volume(metadata: VolumeMetadata, data: &DataSource) -> Result<Volume, &'static str> {
    let elements = metadata.size.x * metadata.size.y * metadata.size.z;
    if elements == 0 {
        return Err("Header does not describe a 3D volume");
    }

    let byte_count = elements * metadata.element.size_of();
    let slice = data.get_slice();
    let section = slice
        .get(metadata.data_offset..)
        .ok_or("Data section missing")?;
    if section.len() < byte_count {
        return Err("Data section too short");
    }
    let section = &section[..byte_count];

    let samples: Vec<u16> = match metadata.element {
        ElementKind::Byte => section.iter().map(|&b| u16::from(b)).collect(),
        ElementKind::Short => section
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect(),
    };

    Volume::from_data(samples, metadata.size)
}
