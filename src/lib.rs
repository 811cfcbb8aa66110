//! Steel Commander - Tactical Tank Encounter Engine

pub mod combat;
pub mod core;
pub mod damage;
pub mod encounter;
pub mod hostile;
pub mod map;
pub mod vehicle;
