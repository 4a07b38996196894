pub mod camera;
pub mod headless;
pub mod marker;
pub mod surface;

pub use camera::*;
pub use headless::*;
pub use marker::*;
pub use surface::*;
