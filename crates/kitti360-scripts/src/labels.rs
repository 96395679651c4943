/// A semantic class of the KITTI-360 annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    /// Class name, e.g. `car`.
    pub name: &'static str,
    /// Id stored in the point cloud records.
    pub id: i32,
    /// Id stored in the bounding box annotations, -1 when absent.
    pub kitti_id: i32,
    /// Id used for training, 255 when ignored.
    pub train_id: i32,
    /// Coarse category name.
    pub category: &'static str,
    /// Coarse category id.
    pub category_id: i32,
    /// Whether the class has instance annotations.
    pub has_instances: bool,
    /// Whether the class is ignored in the semantic evaluation.
    pub ignore_in_eval: bool,
    /// Whether the class is ignored in the instance evaluation.
    pub ignore_in_inst: bool,
    /// Display color.
    pub color: [u8; 3],
}

#[allow(clippy::too_many_arguments)]
const fn label(
    name: &'static str,
    id: i32,
    kitti_id: i32,
    train_id: i32,
    category: &'static str,
    category_id: i32,
    flags: [bool; 3],
    color: [u8; 3],
) -> Label {
    Label {
        name,
        id,
        kitti_id,
        train_id,
        category,
        category_id,
        has_instances: flags[0],
        ignore_in_eval: flags[1],
        ignore_in_inst: flags[2],
        color,
    }
}

const F: bool = false;
const T: bool = true;

/// All the labels, ordered by id with the license plate last.
#[rustfmt::skip]
pub static LABELS: [Label; 46] = [
    //     name                    id  kitti train category        cat  inst eval inst  color
    label("unlabeled",              0, -1, 255, "void",         0, [F, T, T], [0, 0, 0]),
    label("ego vehicle",            1, -1, 255, "void",         0, [F, T, T], [0, 0, 0]),
    label("rectification border",   2, -1, 255, "void",         0, [F, T, T], [0, 0, 0]),
    label("out of roi",             3, -1, 255, "void",         0, [F, T, T], [0, 0, 0]),
    label("static",                 4, -1, 255, "void",         0, [F, T, T], [0, 0, 0]),
    label("dynamic",                5, -1, 255, "void",         0, [F, T, T], [111, 74, 0]),
    label("ground",                 6, -1, 255, "void",         0, [F, T, T], [81, 0, 81]),
    label("road",                   7,  1,   0, "flat",         1, [F, F, F], [128, 64, 128]),
    label("sidewalk",               8,  3,   1, "flat",         1, [F, F, F], [244, 35, 232]),
    label("parking",                9,  2, 255, "flat",         1, [F, T, T], [250, 170, 160]),
    label("rail track",            10, 10, 255, "flat",         1, [F, T, T], [230, 150, 140]),
    label("building",              11, 11,   2, "construction", 2, [T, F, F], [70, 70, 70]),
    label("wall",                  12,  7,   3, "construction", 2, [F, F, F], [102, 102, 156]),
    label("fence",                 13,  8,   4, "construction", 2, [F, F, F], [190, 153, 153]),
    label("guard rail",            14, 30, 255, "construction", 2, [F, T, T], [180, 165, 180]),
    label("bridge",                15, 31, 255, "construction", 2, [F, T, T], [150, 100, 100]),
    label("tunnel",                16, 32, 255, "construction", 2, [F, T, T], [150, 120, 90]),
    label("pole",                  17, 21,   5, "object",       3, [T, F, T], [153, 153, 153]),
    label("polegroup",             18, -1, 255, "object",       3, [F, T, T], [153, 153, 153]),
    label("traffic light",         19, 23,   6, "object",       3, [T, F, T], [250, 170, 30]),
    label("traffic sign",          20, 24,   7, "object",       3, [T, F, T], [220, 220, 0]),
    label("vegetation",            21,  5,   8, "nature",       4, [F, F, F], [107, 142, 35]),
    label("terrain",               22,  4,   9, "nature",       4, [F, F, F], [152, 251, 152]),
    label("sky",                   23,  9,  10, "sky",          5, [F, F, F], [70, 130, 180]),
    label("person",                24, 19,  11, "human",        6, [T, F, F], [220, 20, 60]),
    label("rider",                 25, 20,  12, "human",        6, [T, F, F], [255, 0, 0]),
    label("car",                   26, 13,  13, "vehicle",      7, [T, F, F], [0, 0, 142]),
    label("truck",                 27, 14,  14, "vehicle",      7, [T, F, F], [0, 0, 70]),
    label("bus",                   28, 34,  15, "vehicle",      7, [T, F, F], [0, 60, 100]),
    label("caravan",               29, 16, 255, "vehicle",      7, [T, T, T], [0, 0, 90]),
    label("trailer",               30, 15, 255, "vehicle",      7, [T, T, T], [0, 0, 110]),
    label("train",                 31, 33,  16, "vehicle",      7, [T, F, F], [0, 80, 100]),
    label("motorcycle",            32, 17,  17, "vehicle",      7, [T, F, F], [0, 0, 230]),
    label("bicycle",               33, 18,  18, "vehicle",      7, [T, F, F], [119, 11, 32]),
    label("garage",                34, 12,   2, "construction", 2, [T, T, T], [64, 128, 128]),
    label("gate",                  35,  6,   4, "construction", 2, [F, T, T], [190, 153, 153]),
    label("stop",                  36, 29, 255, "construction", 2, [T, T, T], [150, 120, 90]),
    label("smallpole",             37, 22,   5, "object",       3, [T, T, T], [153, 153, 153]),
    label("lamp",                  38, 25, 255, "object",       3, [T, T, T], [0, 64, 64]),
    label("trash bin",             39, 26, 255, "object",       3, [T, T, T], [0, 128, 192]),
    label("vending machine",       40, 27, 255, "object",       3, [T, T, T], [128, 64, 0]),
    label("box",                   41, 28, 255, "object",       3, [T, T, T], [64, 64, 128]),
    label("unknown construction",  42, 35, 255, "void",         0, [F, T, T], [102, 0, 0]),
    label("unknown vehicle",       43, 36, 255, "void",         0, [F, T, T], [51, 0, 51]),
    label("unknown object",        44, 37, 255, "void",         0, [F, T, T], [32, 32, 32]),
    label("license plate",         -1, -1,  -1, "vehicle",      7, [F, T, T], [0, 0, 142]),
];

/// Look up a label by its point cloud id.
pub fn id2label(id: i32) -> Option<&'static Label> {
    LABELS.iter().find(|l| l.id == id)
}

/// Look up a label by name.
pub fn name2label(name: &str) -> Option<&'static Label> {
    LABELS.iter().find(|l| l.name == name)
}

/// Look up a label by the id used in the bounding box annotations.
///
/// Several void classes share the kitti id -1, so negative ids never match.
pub fn kitti_id2label(kitti_id: i32) -> Option<&'static Label> {
    if kitti_id < 0 {
        return None;
    }
    LABELS.iter().find(|l| l.kitti_id == kitti_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_car_lookups() {
        let car = name2label("car").unwrap();
        assert_eq!(car.id, 26);
        assert_eq!(car.kitti_id, 13);
        assert_eq!(car.color, [0, 0, 142]);
        assert_eq!(id2label(26), Some(car));
        assert_eq!(kitti_id2label(13), Some(car));
    }

    #[test]
    fn test_ids_are_unique() {
        for (i, a) in LABELS.iter().enumerate() {
            for b in LABELS.iter().skip(i + 1) {
                assert_ne!(a.id, b.id, "{} and {}", a.name, b.name);
                assert_ne!(a.name, b.name);
                if a.kitti_id >= 0 {
                    assert_ne!(a.kitti_id, b.kitti_id, "{} and {}", a.name, b.name);
                }
            }
        }
    }

    #[test]
    fn test_unknown_ids() {
        assert!(id2label(45).is_none());
        assert!(kitti_id2label(-1).is_none());
        assert!(name2label("spaceship").is_none());
    }
}
