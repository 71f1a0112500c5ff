// Domain layer: entity model and ports (interfaces to the content repository and configuration).

pub mod model;
pub mod ports;
