//! AVS `.fld` header parsing.
//!
//! The header is `key=value` text terminated by a form feed; the data
//! section starts after a second form feed. Unsupported or unknown fields
//! are diagnostics, not failures -- parsing keeps whatever defaults it has
//! and the builder validates the result.

use nalgebra::vector;
use nom::{
    bytes::complete::{tag, take_till},
    IResult,
};

use super::vol_builder::{ElementKind, VolumeMetadata};

const FORM_FEED: u8 = 0x0c;

pub fn fld_parser(slice: &[u8]) -> Result<VolumeMetadata, &'static str> {
    let parse_res: IResult<_, _> = header_split(slice);
    let (_rest, header) = match parse_res {
        Ok(r) => r,
        Err(_) => return Err("Missing header/data separator"),
    };

    let text = match std::str::from_utf8(header) {
        Ok(t) => t,
        Err(_) => return Err("Header is not valid text"),
    };

    // data starts right after the two form feeds
    Ok(parse_header(text, header.len() + 2))
}

fn header_split(s: &[u8]) -> IResult<&[u8], &[u8]> {
    let (s, header) = take_till(|b| b == FORM_FEED)(s)?;
    let (s, _) = tag(&[FORM_FEED, FORM_FEED][..])(s)?;
    Ok((s, header))
}

fn parse_header(text: &str, data_offset: usize) -> VolumeMetadata {
    let mut size = vector![0usize, 0, 0];
    let mut element = ElementKind::Byte;

    for raw_line in text.lines() {
        // comments run to the end of the line, whitespace is insignificant
        let stripped = raw_line.split('#').next().unwrap_or("");
        let line: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();
        if line.is_empty() {
            continue;
        }

        let (key, value) = match line.split_once('=') {
            Some(kv) => kv,
            None => {
                log::warn!("Header line without '=': {line}");
                continue;
            }
        };

        match key {
            "ndim" => {
                if value != "3" {
                    log::warn!("Only 3D volumes are supported (ndim = {value})");
                }
            }
            "dim1" => size.x = parse_dim(key, value),
            "dim2" => size.y = parse_dim(key, value),
            "dim3" => size.z = parse_dim(key, value),
            "nspace" => (),
            "veclen" => {
                if value != "1" {
                    log::warn!("Only scalar data is supported (veclen = {value})");
                }
            }
            "data" => match value {
                "byte" => element = ElementKind::Byte,
                "short" => element = ElementKind::Short,
                _ => log::warn!("Data type {value} not recognized"),
            },
            "field" => {
                if value != "uniform" {
                    log::warn!("Only uniform fields are supported (field = {value})");
                }
            }
            _ => log::warn!("Invalid AVS keyword {key} in file"),
        }
    }

    VolumeMetadata {
        size,
        element,
        data_offset,
    }
}

fn parse_dim(key: &str, value: &str) -> usize {
    match value.parse() {
        Ok(v) => v,
        Err(_) => {
            log::warn!("Cannot parse {key} = {value}");
            0
        }
    }
}
