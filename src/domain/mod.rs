// Domain layer: entities, form state and ports. No HTTP or filesystem code here.

pub mod auth;
pub mod form;
pub mod model;
pub mod ports;
