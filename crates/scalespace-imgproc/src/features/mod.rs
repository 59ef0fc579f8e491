mod blob;
pub use blob::*;

mod laplacian;
pub use laplacian::*;
