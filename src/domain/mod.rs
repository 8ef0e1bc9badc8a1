//! Pure game rules: cell values, the serpent, windmill geometry and gate exits.

pub mod cell;
pub mod rules;
pub mod serpent;
pub mod windmill;
