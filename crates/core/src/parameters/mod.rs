//! Parameter management types
//!
//! A fixed-capacity `ParameterStore` plus the parameter groups of the
//! autopilot. Each group registers its defaults and reads itself back from
//! the store.

pub mod error;
pub mod failsafe;
pub mod follow;
pub mod storage;
pub mod track;

pub use error::ParameterError;
pub use failsafe::FailsafeParams;
pub use follow::FollowParams;
pub use storage::{ParamFlags, ParamMetadata, ParamValue, ParameterStore};
pub use storage::{MAX_PARAMS, PARAM_NAME_LEN};
pub use track::TrackParams;

/// Register every parameter group's defaults.
pub fn register_all(store: &mut ParameterStore) -> Result<(), ParameterError> {
    FollowParams::register_defaults(store)?;
    TrackParams::register_defaults(store)?;
    FailsafeParams::register_defaults(store)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_fits_the_store() {
        let mut store = ParameterStore::new();
        register_all(&mut store).unwrap();
        assert_eq!(store.len(), 11 + 10 + 4);
        assert!(store.len() <= MAX_PARAMS);
    }
}
