// Domain layer: release models and the ports the watcher talks to.

pub mod model;
pub mod ports;
