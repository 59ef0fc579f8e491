#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use scalespace_image as image;

#[doc(inline)]
pub use scalespace_imgproc as imgproc;

#[doc(inline)]
pub use scalespace_io as io;
