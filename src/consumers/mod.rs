// Bus consumers: each polls its own subscription on its own cadence and
// never blocks the producer or the other consumers.

pub mod dashboard;
pub mod scoring;
