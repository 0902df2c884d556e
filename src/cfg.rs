//! Compile-time configuration: load factor selection and trace events.

cfg_if::cfg_if! {
    if #[cfg(feature = "density-eighty-seven-point-five")] {
        const DENSITY_NUMERATOR: u128 = 7;
        const DENSITY_DENOMINATOR: u128 = 8;
    } else if #[cfg(feature = "density-seventy-five")] {
        const DENSITY_NUMERATOR: u128 = 3;
        const DENSITY_DENOMINATOR: u128 = 4;
    } else {
        const DENSITY_NUMERATOR: u128 = 1;
        const DENSITY_DENOMINATOR: u128 = 2;
    }
}

/// Largest number of entries a table of `table_size` home slots may hold.
#[inline(always)]
pub(crate) fn target_load_factor(table_size: usize) -> usize {
    ((table_size as u128 * DENSITY_NUMERATOR) / DENSITY_DENOMINATOR) as usize
}

/// The configured maximum ratio of entries to home slots.
#[inline(always)]
pub(crate) fn max_load_factor() -> f32 {
    DENSITY_NUMERATOR as f32 / DENSITY_DENOMINATOR as f32
}

macro_rules! trace {
    ($($tt:tt)*) => {
        #[cfg(feature = "tracing")] {
            tracing::trace!($($tt)*)
        }
    }
}

macro_rules! debug {
    ($($tt:tt)*) => {
        #[cfg(feature = "tracing")] {
            tracing::debug!($($tt)*)
        }
    }
}

pub(crate) use debug;
pub(crate) use trace;
