pub mod composite;
pub mod noise;
pub mod raster;
pub mod snapshot;
pub mod surface;
