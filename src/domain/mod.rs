// Domain layer: node records, flattened rows and the ports the engine talks to.

pub mod model;
pub mod ports;
