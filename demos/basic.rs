//! This example demonstrates memoization keyed on the instances a function
//! reads. Replacing a field that is read invalidates the result, touching a
//! field that is not read does not.

use std::sync::Arc;

use attrcache::{Identity, Token, cache, cached_property};

fn main() {
    let mut image = Image::new(20, 40);

    // [Miss] The cache is empty.
    describe(&image);

    // [Hit] Nothing was replaced.
    describe(&image);

    image.width = 80;

    // [Miss] The image's width is different.
    describe(&image);

    image.pixels = Arc::new(vec![255; 80 * 40]);

    // [Hit] `describe` never reads the pixels.
    describe(&image);

    // [Miss] The first read of the property.
    image.area();

    // [Hit] The width and height stayed the same.
    image.area();

    // [Miss] A clone is a different instance.
    image.clone().area();
}

/// Format the image's size humanly readable.
#[cache]
fn describe(image: &Image) -> &'static str {
    if image.width > 50 || image.height > 50 {
        "The image is big!"
    } else {
        "The image is small!"
    }
}

/// A raster image.
#[derive(Clone, Identity)]
struct Image {
    token: Token,
    width: u32,
    height: u32,
    pixels: Arc<Vec<u8>>,
}

impl Image {
    fn new(width: u32, height: u32) -> Self {
        Self {
            token: Token::new(),
            width,
            height,
            pixels: Arc::new(vec![0; (width * height) as usize]),
        }
    }

    /// The number of pixels.
    #[cached_property]
    fn area(&self) -> u32 {
        self.width * self.height
    }
}
