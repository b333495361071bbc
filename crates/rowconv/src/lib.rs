#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use rowconv_image as image;

#[doc(inline)]
pub use rowconv_imgproc as imgproc;

#[doc(inline)]
pub use rowconv_io as io;
