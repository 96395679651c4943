use crate::{ids::global_to_local, labels::id2label};

/// The qualitative `Set1` palette used for instances and timestamps.
pub const SET1: [[u8; 3]; 9] = [
    [0xe4, 0x1a, 0x1c],
    [0x37, 0x7e, 0xb8],
    [0x4d, 0xaf, 0x4a],
    [0x98, 0x4e, 0xa3],
    [0xff, 0x7f, 0x00],
    [0xff, 0xff, 0x33],
    [0xa6, 0x56, 0x28],
    [0xf7, 0x81, 0xbf],
    [0x99, 0x99, 0x99],
];

/// Color of "stuff" classes, which have no instances, in instance mode.
pub const STUFF_GRAY: [u8; 3] = [96, 96, 96];

/// How labeled points are colorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// One color per semantic class.
    Semantic,
    /// One palette color per instance.
    Instance,
}

fn to_unit(color: [u8; 3]) -> [f64; 3] {
    color.map(|c| c as f64 / 255.0)
}

/// Deterministic mapping from ids to colors in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ColorTable {
    palette: Vec<[u8; 3]>,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self {
            palette: SET1.to_vec(),
        }
    }
}

impl ColorTable {
    /// Create a table cycling through a custom palette.
    ///
    /// An empty palette falls back to [`SET1`].
    pub fn with_palette(palette: Vec<[u8; 3]>) -> Self {
        if palette.is_empty() {
            return Self::default();
        }
        Self { palette }
    }

    /// The palette color of an index, black for 0.
    pub fn palette_color(&self, idx: i32) -> [f64; 3] {
        if idx == 0 {
            return [0.0; 3];
        }
        let len = self.palette.len() as i32;
        to_unit(self.palette[idx.rem_euclid(len) as usize])
    }

    /// The color of a global id.
    pub fn color(&self, global_id: i32, mode: ColorMode) -> [f64; 3] {
        if global_id == 0 {
            return [0.0; 3];
        }
        let (semantic_id, instance_id) = global_to_local(global_id);
        match mode {
            ColorMode::Semantic => id2label(semantic_id).map_or([0.0; 3], |l| to_unit(l.color)),
            ColorMode::Instance if instance_id > 0 => self.palette_color(instance_id),
            ColorMode::Instance => to_unit(STUFF_GRAY),
        }
    }

    /// The colors of a list of global ids, in the same order.
    pub fn assign_colors(&self, global_ids: &[i32], mode: ColorMode) -> Vec<[f64; 3]> {
        global_ids.iter().map(|&id| self.color(id, mode)).collect()
    }

    /// The colors of dynamic points keyed by their timestamp.
    pub fn timestamp_colors(&self, timestamps: &[i32]) -> Vec<[f64; 3]> {
        timestamps.iter().map(|&t| self.palette_color(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::local_to_global;
    use approx::assert_relative_eq;

    #[test]
    fn test_background_is_black() {
        let table = ColorTable::default();
        assert_eq!(table.color(0, ColorMode::Semantic), [0.0; 3]);
        assert_eq!(table.color(0, ColorMode::Instance), [0.0; 3]);
    }

    #[test]
    fn test_semantic_color() {
        let table = ColorTable::default();
        let color = table.color(local_to_global(26, 3), ColorMode::Semantic);
        assert_relative_eq!(color[2], 142.0 / 255.0);
        assert_eq!(color[0], 0.0);
        // unknown classes render black
        assert_eq!(table.color(local_to_global(99, 1), ColorMode::Semantic), [0.0; 3]);
    }

    #[test]
    fn test_instance_color_cycles() {
        let table = ColorTable::default();
        let a = table.color(local_to_global(26, 1), ColorMode::Instance);
        let b = table.color(local_to_global(11, 10), ColorMode::Instance);
        assert_eq!(a, b);
        assert_eq!(a, to_unit(SET1[1]));
        let stuff = table.color(local_to_global(7, 0), ColorMode::Instance);
        assert_relative_eq!(stuff[0], 96.0 / 255.0);
    }

    #[test]
    fn test_assign_colors_is_deterministic() {
        let table = ColorTable::default();
        let ids = [26001, 0, 26001, 7000, 11004];
        let first = table.assign_colors(&ids, ColorMode::Instance);
        let second = table.assign_colors(&ids, ColorMode::Instance);
        assert_eq!(first, second);
        assert_eq!(first[0], first[2]);
        assert_eq!(first[1], [0.0; 3]);
    }

    #[test]
    fn test_timestamp_colors() {
        let table = ColorTable::default();
        let colors = table.timestamp_colors(&[0, 9, 4]);
        assert_eq!(colors[0], [0.0; 3]);
        assert_eq!(colors[1], to_unit(SET1[0]));
        assert_eq!(colors[2], to_unit(SET1[4]));
    }
}
