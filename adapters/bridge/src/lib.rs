#![deny(
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Flat integer boundary over the grid engine for foreign callers.
//!
//! [`GridBridge`] translates raw integers into the engine's typed API and
//! degrades every failed query to the empty state. The `pinball_grid_*`
//! functions expose the same operations over the C ABI behind an opaque
//! pointer.

use std::{ptr, slice};

use pinball_panic_core::{CellType, ObjectKind, Orientation};
use pinball_panic_system_generation::GridEngine;
use tracing::warn;

/// Status returned when a grid was generated.
pub const STATUS_OK: i32 = 0;
/// Status returned when every generation attempt failed.
pub const STATUS_GENERATION_FAILED: i32 = 1;
/// Status returned when the handle is null.
pub const STATUS_NULL_HANDLE: i32 = 2;

/// Engine reachable through plain integers.
#[derive(Debug)]
pub struct GridBridge {
    engine: GridEngine,
}

impl GridBridge {
    /// Builds an engine from raw parameters.
    ///
    /// `allowed` holds cell type ordinals `4..=8`. Negative numbers, unknown
    /// ordinals and invalid configurations yield `None`.
    #[must_use]
    pub fn create(size: i32, min_objects: i32, max_objects: i32, allowed: &[i32]) -> Option<Self> {
        let (Ok(size), Ok(min_objects), Ok(max_objects)) = (
            u32::try_from(size),
            u32::try_from(min_objects),
            u32::try_from(max_objects),
        ) else {
            warn!(size, min_objects, max_objects, "negative grid parameter");
            return None;
        };

        let mut kinds = Vec::with_capacity(allowed.len());
        for ordinal in allowed {
            let Some(kind) = ObjectKind::from_ordinal(*ordinal) else {
                warn!(ordinal, "unknown object type ordinal");
                return None;
            };
            kinds.push(kind);
        }

        match GridEngine::create(size, min_objects, max_objects, kinds) {
            Ok(engine) => Some(Self { engine }),
            Err(error) => {
                warn!(%error, "grid not created");
                None
            }
        }
    }

    /// Regenerates the grid, returning [`STATUS_OK`] or [`STATUS_GENERATION_FAILED`].
    pub fn generate(&mut self) -> i32 {
        match self.engine.generate() {
            Ok(()) => STATUS_OK,
            Err(error) => {
                warn!(%error, "grid generation failed");
                STATUS_GENERATION_FAILED
            }
        }
    }

    /// Cell type ordinal at `(row, column)`, empty when out of range.
    #[must_use]
    pub fn cell_type(&self, row: i32, column: i32) -> i32 {
        coordinates(row, column)
            .and_then(|(row, column)| self.engine.cell_type(row, column).ok())
            .unwrap_or(CellType::Empty)
            .ordinal()
    }

    /// Orientation ordinal at `(row, column)`, none when out of range.
    #[must_use]
    pub fn orientation(&self, row: i32, column: i32) -> i32 {
        coordinates(row, column)
            .and_then(|(row, column)| self.engine.orientation(row, column).ok())
            .unwrap_or(Orientation::None)
            .ordinal()
    }

    /// Teleporter pairing index at `(row, column)`, zero when absent.
    #[must_use]
    pub fn teleporter_index(&self, row: i32, column: i32) -> i32 {
        coordinates(row, column)
            .and_then(|(row, column)| self.engine.teleporter_index(row, column).ok())
            .and_then(|index| i32::try_from(index).ok())
            .unwrap_or(0)
    }
}

fn coordinates(row: i32, column: i32) -> Option<(u32, u32)> {
    Some((u32::try_from(row).ok()?, u32::try_from(column).ok()?))
}

/// Creates a grid, returning null when the configuration is invalid.
///
/// # Safety
///
/// `allowed` must point to `allowed_len` readable `i32` values, or be null
/// when `allowed_len` is zero. The returned pointer must be released with
/// [`pinball_grid_destroy`].
#[no_mangle]
pub unsafe extern "C" fn pinball_grid_create(
    size: i32,
    min_objects: i32,
    max_objects: i32,
    allowed: *const i32,
    allowed_len: usize,
) -> *mut GridBridge {
    let allowed = if allowed_len == 0 {
        &[][..]
    } else if allowed.is_null() {
        return ptr::null_mut();
    } else {
        // SAFETY: the caller guarantees `allowed_len` readable values.
        unsafe { slice::from_raw_parts(allowed, allowed_len) }
    };

    GridBridge::create(size, min_objects, max_objects, allowed)
        .map_or(ptr::null_mut(), |bridge| Box::into_raw(Box::new(bridge)))
}

/// Releases a grid created by [`pinball_grid_create`]. Null is ignored.
///
/// # Safety
///
/// `handle` must be null or a pointer returned by [`pinball_grid_create`]
/// that has not been destroyed yet.
#[no_mangle]
pub unsafe extern "C" fn pinball_grid_destroy(handle: *mut GridBridge) {
    if !handle.is_null() {
        // SAFETY: the pointer came from `Box::into_raw` and is released once.
        drop(unsafe { Box::from_raw(handle) });
    }
}

/// Regenerates the grid and reports a status code.
///
/// # Safety
///
/// `handle` must be null or a live pointer returned by [`pinball_grid_create`].
#[no_mangle]
pub unsafe extern "C" fn pinball_grid_generate(handle: *mut GridBridge) -> i32 {
    // SAFETY: the caller guarantees the handle is null or live and unaliased.
    match unsafe { handle.as_mut() } {
        Some(bridge) => bridge.generate(),
        None => STATUS_NULL_HANDLE,
    }
}

/// Cell type ordinal at `(row, column)`.
///
/// # Safety
///
/// `handle` must be null or a live pointer returned by [`pinball_grid_create`].
#[no_mangle]
pub unsafe extern "C" fn pinball_grid_cell_type(
    handle: *const GridBridge,
    row: i32,
    column: i32,
) -> i32 {
    // SAFETY: the caller guarantees the handle is null or live.
    unsafe { handle.as_ref() }.map_or(CellType::Empty.ordinal(), |bridge| {
        bridge.cell_type(row, column)
    })
}

/// Orientation ordinal at `(row, column)`.
///
/// # Safety
///
/// `handle` must be null or a live pointer returned by [`pinball_grid_create`].
#[no_mangle]
pub unsafe extern "C" fn pinball_grid_cell_orientation(
    handle: *const GridBridge,
    row: i32,
    column: i32,
) -> i32 {
    // SAFETY: the caller guarantees the handle is null or live.
    unsafe { handle.as_ref() }.map_or(Orientation::None.ordinal(), |bridge| {
        bridge.orientation(row, column)
    })
}

/// Teleporter pairing index at `(row, column)`.
///
/// # Safety
///
/// `handle` must be null or a live pointer returned by [`pinball_grid_create`].
#[no_mangle]
pub unsafe extern "C" fn pinball_grid_teleporter_index(
    handle: *const GridBridge,
    row: i32,
    column: i32,
) -> i32 {
    // SAFETY: the caller guarantees the handle is null or live.
    unsafe { handle.as_ref() }.map_or(0, |bridge| bridge.teleporter_index(row, column))
}

#[cfg(test)]
mod tests {
    use super::{coordinates, GridBridge};

    #[test]
    fn negative_coordinates_are_rejected() {
        assert_eq!(coordinates(-1, 0), None);
        assert_eq!(coordinates(2, 3), Some((2, 3)));
    }

    #[test]
    fn unknown_ordinals_reject_creation() {
        assert!(GridBridge::create(5, 1, 1, &[3]).is_none());
        assert!(GridBridge::create(5, 1, 1, &[9]).is_none());
        assert!(GridBridge::create(-5, 1, 1, &[4]).is_none());
        assert!(GridBridge::create(5, 1, 1, &[4]).is_some());
    }
}
