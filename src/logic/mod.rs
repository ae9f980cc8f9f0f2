//! Pure transformations used by the gated surface

pub mod entropy_selection;
pub mod normalize;
