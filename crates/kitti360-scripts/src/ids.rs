/// Multiplier separating the semantic id from the instance id.
pub const MAX_INSTANCES: i32 = 1000;

/// Combine a semantic id and a local instance id into a global id.
///
/// Example:
///
/// ```
/// use kitti360_scripts::ids::{global_to_local, local_to_global};
///
/// let global_id = local_to_global(26, 5);
/// assert_eq!(global_id, 26005);
/// assert_eq!(global_to_local(global_id), (26, 5));
/// ```
#[inline]
pub fn local_to_global(semantic_id: i32, instance_id: i32) -> i32 {
    semantic_id * MAX_INSTANCES + instance_id
}

/// Split a global id into `(semantic_id, instance_id)`.
#[inline]
pub fn global_to_local(global_id: i32) -> (i32, i32) {
    (global_id / MAX_INSTANCES, global_id % MAX_INSTANCES)
}

/// The local instance id of a global id.
#[inline]
pub fn instance_of(global_id: i32) -> i32 {
    global_id % MAX_INSTANCES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for semantic_id in [0, 7, 11, 26, 44] {
            for instance_id in [0, 1, 42, 999] {
                let global_id = local_to_global(semantic_id, instance_id);
                assert_eq!(global_to_local(global_id), (semantic_id, instance_id));
                assert_eq!(instance_of(global_id), instance_id);
            }
        }
    }

    #[test]
    fn test_background() {
        assert_eq!(global_to_local(0), (0, 0));
    }
}
