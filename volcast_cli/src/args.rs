//! Argument parsing and validation
//! Uses library `clap`

use std::ffi::OsStr;

use clap::{Arg, Command, ValueHint};

pub fn is_positive_number(num: &str) -> Result<(), String> {
    let n = num.parse::<u32>();
    match n {
        Ok(n) => {
            if n > 0 {
                Ok(())
            } else {
                Err("Number must be greater than 0".into())
            }
        }
        Err(_) => Err("Number required".into()),
    }
}

pub fn is_float_number(num: &str) -> Result<(), String> {
    match num.parse::<f32>() {
        Ok(_) => Ok(()),
        Err(_) => Err("Number required".into()),
    }
}

const MODE_NAMES: &[&str] = &["slice", "mip", "iso", "composite", "tf2d", "tf2d-v2"];
const INTERPOLATION_NAMES: &[&str] = &["nearest", "linear", "cubic"];

pub fn get_command<'a>() -> Command<'a> {
    Command::new("volcast")
        .version("0.1.0")
        .about("Headless volume ray-caster")
        .arg(
            Arg::new("input")
                .help("Volume file (.fld)")
                .required(true)
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("resolution")
                .help("Output image resolution")
                .long("resolution")
                .short('r')
                .number_of_values(2)
                .value_names(&["W", "H"])
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .require_equals(true)
                .default_values(&["512", "512"])
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("mode")
                .help("Pixel algorithm")
                .long("mode")
                .short('m')
                .default_value("mip")
                .value_name("NAME")
                .possible_values(MODE_NAMES),
        )
        .arg(
            Arg::new("interpolation")
                .help("Volume sampling strategy")
                .long("interpolation")
                .short('i')
                .default_value("linear")
                .value_name("NAME")
                .possible_values(INTERPOLATION_NAMES),
        )
        .arg(
            Arg::new("iso")
                .help("Isosurface threshold")
                .long("iso")
                .value_name("VALUE")
                .default_value("40")
                .validator(is_float_number),
        )
        .arg(
            Arg::new("shading")
                .help("Phong shading for iso and composite modes")
                .long("shading")
                .short('s'),
        )
        .arg(
            Arg::new("single-thread")
                .help("Disable tiled multi-threaded rendering")
                .long("single-thread"),
        )
        .arg(
            Arg::new("camera-pos")
                .help("Camera position, defaults to a corner view fitted to the volume")
                .long("camera-pos")
                .number_of_values(3)
                .value_names(&["X", "Y", "Z"])
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .require_equals(true)
                .validator(is_float_number),
        )
        .arg(
            Arg::new("camera-dir")
                .help("View direction")
                .long("camera-dir")
                .number_of_values(3)
                .value_names(&["X", "Y", "Z"])
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .require_equals(true)
                .validator(is_float_number),
        )
        .arg(
            Arg::new("output-file")
                .help("File name to output (binary PPM)")
                .long("output-file")
                .short('o')
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath)
                .default_value_os(OsStr::new("a.ppm")),
        )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_parse() {
        let matches = get_command().try_get_matches_from(["volcast", "skull.fld"]);
        let matches = matches.unwrap();
        assert_eq!(matches.value_of("mode"), Some("mip"));
        let res: Vec<_> = matches.values_of("resolution").unwrap().collect();
        assert_eq!(res, ["512", "512"]);
    }

    #[test]
    fn rejects_unknown_mode() {
        let matches = get_command().try_get_matches_from(["volcast", "skull.fld", "-m", "splat"]);
        assert!(matches.is_err());
    }

    #[test]
    fn validates_resolution() {
        let matches =
            get_command().try_get_matches_from(["volcast", "skull.fld", "-r=0,512"]);
        assert!(matches.is_err());
    }
}
