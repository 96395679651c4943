use super::PlyError;

/// Scalar types allowed for PLY vertex properties.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PlyDataType {
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// signed byte
    Int8,
    /// unsigned byte
    UInt8,
    /// signed 16-bit integer
    Int16,
    /// unsigned 16-bit integer
    UInt16,
    /// signed 32-bit integer
    Int32,
    /// unsigned 32-bit integer
    UInt32,
}

impl PlyDataType {
    /// Size in bytes of one value.
    pub fn size(&self) -> usize {
        match self {
            PlyDataType::Float32 | PlyDataType::Int32 | PlyDataType::UInt32 => 4,
            PlyDataType::Float64 => 8,
            PlyDataType::Int16 | PlyDataType::UInt16 => 2,
            PlyDataType::Int8 | PlyDataType::UInt8 => 1,
        }
    }

    /// Parse the type keyword of a `property` header line.
    pub fn parse(type_str: &str) -> Result<Self, PlyError> {
        match type_str {
            "float" | "float32" => Ok(PlyDataType::Float32),
            "double" | "float64" => Ok(PlyDataType::Float64),
            "char" | "int8" => Ok(PlyDataType::Int8),
            "uchar" | "uint8" => Ok(PlyDataType::UInt8),
            "short" | "int16" => Ok(PlyDataType::Int16),
            "ushort" | "uint16" => Ok(PlyDataType::UInt16),
            "int" | "int32" => Ok(PlyDataType::Int32),
            "uint" | "uint32" => Ok(PlyDataType::UInt32),
            _ => Err(PlyError::UnsupportedProperty(type_str.to_string())),
        }
    }

    /// Decode one little endian value as `f64`.
    fn read_f64(&self, bytes: &[u8]) -> Option<f64> {
        let value = match self {
            PlyDataType::Float32 => f32::from_le_bytes(take(bytes)?) as f64,
            PlyDataType::Float64 => f64::from_le_bytes(take(bytes)?),
            PlyDataType::Int8 => i8::from_le_bytes(take(bytes)?) as f64,
            PlyDataType::UInt8 => u8::from_le_bytes(take(bytes)?) as f64,
            PlyDataType::Int16 => i16::from_le_bytes(take(bytes)?) as f64,
            PlyDataType::UInt16 => u16::from_le_bytes(take(bytes)?) as f64,
            PlyDataType::Int32 => i32::from_le_bytes(take(bytes)?) as f64,
            PlyDataType::UInt32 => u32::from_le_bytes(take(bytes)?) as f64,
        };
        Some(value)
    }
}

fn take<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

/// A named vertex property of the PLY header.
#[derive(Debug, PartialEq, Clone)]
pub struct PlyPropertyDefinition {
    /// Property name, e.g. `x` or `semantic`.
    pub name: String,
    /// Storage type.
    pub data_type: PlyDataType,
}

/// The ordered vertex properties of a binary PLY body.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct PlySchema {
    /// Properties in file order.
    pub properties: Vec<PlyPropertyDefinition>,
}

impl PlySchema {
    /// Size in bytes of one vertex record.
    pub fn record_size(&self) -> usize {
        self.properties.iter().map(|p| p.data_type.size()).sum()
    }

    /// Check whether a property with the given name exists.
    pub fn has(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    fn locate(&self, name: &str) -> Option<(usize, PlyDataType)> {
        let mut offset = 0;
        for prop in &self.properties {
            if prop.name == name {
                return Some((offset, prop.data_type));
            }
            offset += prop.data_type.size();
        }
        None
    }

    /// Read a property of one vertex record as `f64`.
    ///
    /// Missing properties read as `0.0`.
    pub fn read_f64(&self, record: &[u8], name: &str) -> f64 {
        self.locate(name)
            .and_then(|(offset, data_type)| data_type.read_f64(record.get(offset..)?))
            .unwrap_or(0.0)
    }

    /// Read the `x`, `y`, `z` properties of one vertex record.
    pub fn read_point(&self, record: &[u8]) -> [f64; 3] {
        [
            self.read_f64(record, "x"),
            self.read_f64(record, "y"),
            self.read_f64(record, "z"),
        ]
    }

    /// Read the `red`, `green`, `blue` properties of one vertex record.
    ///
    /// Float colors are expected in `[0, 1]` and rescaled to bytes.
    pub fn read_color(&self, record: &[u8]) -> [u8; 3] {
        ["red", "green", "blue"].map(|name| match self.locate(name) {
            Some((_, PlyDataType::Float32 | PlyDataType::Float64)) => {
                (self.read_f64(record, name) * 255.0).clamp(0.0, 255.0) as u8
            }
            _ => self.read_f64(record, name).clamp(0.0, 255.0) as u8,
        })
    }

    /// Read the `nx`, `ny`, `nz` properties of one vertex record.
    pub fn read_normal(&self, record: &[u8]) -> [f64; 3] {
        [
            self.read_f64(record, "nx"),
            self.read_f64(record, "ny"),
            self.read_f64(record, "nz"),
        ]
    }
}
