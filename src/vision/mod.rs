mod describer;

pub use describer::VisionDescriber;
