use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use super::NpyError;

const MAGIC: &[u8; 6] = b"\x93NUMPY";

// magic + version + u16 header length
const PREAMBLE_LEN: usize = 10;

const ALIGNMENT: usize = 64;

/// The parsed header dictionary of an NPY file.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyHeader {
    /// Array dtype descriptor, e.g. `<f8`.
    pub descr: String,
    /// Whether the data is stored column major.
    pub fortran_order: bool,
    /// Array shape.
    pub shape: Vec<usize>,
}

fn encode_header(num_points: usize) -> Vec<u8> {
    let dict = format!("{{'descr': '<f8', 'fortran_order': False, 'shape': ({num_points}, 3), }}");
    // the preamble, dictionary and trailing newline end on a 64 byte boundary
    let unpadded = PREAMBLE_LEN + dict.len() + 1;
    let padding = (ALIGNMENT - unpadded % ALIGNMENT) % ALIGNMENT;

    let mut header = Vec::with_capacity(unpadded + padding);
    header.extend_from_slice(MAGIC);
    header.extend_from_slice(&[1, 0]);
    header.extend_from_slice(&((dict.len() + padding + 1) as u16).to_le_bytes());
    header.extend_from_slice(dict.as_bytes());
    header.extend(std::iter::repeat(b' ').take(padding));
    header.push(b'\n');
    header
}

fn dict_value<'a>(dict: &'a str, key: &str) -> Result<&'a str, NpyError> {
    let pattern = format!("'{key}':");
    let start = dict
        .find(&pattern)
        .ok_or_else(|| NpyError::InvalidHeader(format!("missing key {key}")))?
        + pattern.len();
    Ok(dict[start..].trim_start())
}

pub(crate) fn parse_header_dict(dict: &str) -> Result<NpyHeader, NpyError> {
    let descr = {
        let value = dict_value(dict, "descr")?;
        let value = value
            .strip_prefix('\'')
            .ok_or_else(|| NpyError::InvalidHeader("descr is not a string".into()))?;
        let end = value
            .find('\'')
            .ok_or_else(|| NpyError::InvalidHeader("unterminated descr".into()))?;
        value[..end].to_string()
    };

    let fortran_order = {
        let value = dict_value(dict, "fortran_order")?;
        if value.starts_with("False") {
            false
        } else if value.starts_with("True") {
            true
        } else {
            return Err(NpyError::InvalidHeader("bad fortran_order".into()));
        }
    };

    let shape = {
        let value = dict_value(dict, "shape")?;
        let value = value
            .strip_prefix('(')
            .ok_or_else(|| NpyError::InvalidHeader("shape is not a tuple".into()))?;
        let end = value
            .find(')')
            .ok_or_else(|| NpyError::InvalidHeader("unterminated shape".into()))?;
        value[..end]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|_| NpyError::InvalidHeader(format!("bad dimension {s}")))
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(NpyHeader {
        descr,
        fortran_order,
        shape,
    })
}

/// Write an `N x 3` float64 array in NPY format (version 1.0, C order).
pub fn write_npy_points(path: impl AsRef<Path>, points: &[[f64; 3]]) -> Result<(), NpyError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&encode_header(points.len()))?;
    for value in points.iter().flatten() {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read an `N x 3` float64 array written in NPY format.
pub fn read_npy_points(path: impl AsRef<Path>) -> Result<Vec<[f64; 3]>, NpyError> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(NpyError::InvalidMagic);
    }

    let mut version = [0u8; 2];
    reader.read_exact(&mut version)?;
    let header_len = match version[0] {
        1 => {
            let mut len = [0u8; 2];
            reader.read_exact(&mut len)?;
            u16::from_le_bytes(len) as usize
        }
        2 | 3 => {
            let mut len = [0u8; 4];
            reader.read_exact(&mut len)?;
            u32::from_le_bytes(len) as usize
        }
        v => return Err(NpyError::Unsupported(format!("version {v}"))),
    };

    let mut dict = vec![0u8; header_len];
    reader.read_exact(&mut dict)?;
    let dict = String::from_utf8_lossy(&dict);
    let header = parse_header_dict(&dict)?;

    if header.descr != "<f8" {
        return Err(NpyError::Unsupported(format!("dtype {}", header.descr)));
    }
    if header.fortran_order {
        return Err(NpyError::Unsupported("fortran order".into()));
    }
    let num_points = match header.shape.as_slice() {
        [n, 3] => *n,
        shape => return Err(NpyError::Unsupported(format!("shape {shape:?}"))),
    };

    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    let expected = num_points * 3;
    let found = data.len() / 8;
    if data.len() % 8 != 0 || found != expected {
        return Err(NpyError::ShapeMismatch { expected, found });
    }

    let values = data
        .chunks_exact(8)
        .map(|c| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(c);
            f64::from_le_bytes(bytes)
        })
        .collect::<Vec<_>>();

    Ok(values
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_alignment() {
        for n in [0, 1, 17, 123456] {
            let header = encode_header(n);
            assert_eq!(header.len() % ALIGNMENT, 0);
            assert_eq!(&header[..6], MAGIC);
            assert_eq!(header.last(), Some(&b'\n'));
        }
    }

    #[test]
    fn test_parse_header_dict() -> Result<(), NpyError> {
        let header =
            parse_header_dict("{'descr': '<f8', 'fortran_order': False, 'shape': (42, 3), }")?;
        assert_eq!(header.descr, "<f8");
        assert!(!header.fortran_order);
        assert_eq!(header.shape, vec![42, 3]);

        let header = parse_header_dict("{'descr': '<f4', 'fortran_order': True, 'shape': (7,), }")?;
        assert_eq!(header.shape, vec![7]);
        assert!(header.fortran_order);
        Ok(())
    }

    #[test]
    fn test_write_then_read() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("1_canonical.npy");
        let points = vec![[1.0, -2.0, 3.5], [0.0, 1e-9, -7.25]];
        write_npy_points(&path, &points)?;

        assert_eq!(read_npy_points(&path)?, points);
        Ok(())
    }

    #[test]
    fn test_read_rejects_truncated_data() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.npy");
        let mut bytes = encode_header(2);
        bytes.extend_from_slice(&1.0f64.to_le_bytes());
        std::fs::write(&path, bytes)?;

        assert!(matches!(
            read_npy_points(&path),
            Err(NpyError::ShapeMismatch {
                expected: 6,
                found: 1
            })
        ));
        Ok(())
    }

    #[test]
    fn test_read_rejects_bad_magic() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("not.npy");
        std::fs::write(&path, b"PLY\nformat ascii")?;

        assert!(matches!(read_npy_points(&path), Err(NpyError::InvalidMagic)));
        Ok(())
    }
}
