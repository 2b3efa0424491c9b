//! SeaORM entities for the volunteer tracking database.

pub mod entities;
