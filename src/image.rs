use crate::error::LayoutError;
use crate::geom::{Coord, Dim, DimAndPageNums};
use crate::page::RenderTarget;
use crate::refs::{ObjectReferences, RefType};
use crate::units::{Pt, UNITS_PER_INCH};
use image::{ColorType, DynamicImage};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Pdf};
use std::path::Path;
use std::rc::Rc;

const ASSUMED_IMAGE_DPI: f32 = 300.0;

/// The default scaling factor for images: assumes an image is normally seen
/// at 300dpi while the output document uses 72 units per inch.
pub const IMAGE_SCALE: f32 = UNITS_PER_INCH / ASSUMED_IMAGE_DPI;

enum ImageKind {
    /// An RGB JPEG whose bytes can be embedded in the PDF untouched
    Jpeg(Vec<u8>),
    /// Anything else gets re-encoded as flate-compressed RGB
    Raster(DynamicImage),
}

/// A decoded image ready for embedding. Place it on a page through a
/// [ScaledImage]; the same `Rc<Image>` placed many times is embedded in the
/// document only once.
pub struct Image {
    kind: ImageKind,
    px_width: u32,
    px_height: u32,
}

struct EncodeOutput {
    filter: Filter,
    bytes: Vec<u8>,
    mask: Option<Vec<u8>>,
}

impl Image {
    pub fn new_from_disk<P: AsRef<Path>>(path: P) -> Result<Image, LayoutError> {
        let data = std::fs::read(path)?;
        Self::new_from_bytes(data)
    }

    pub fn new_from_bytes(data: Vec<u8>) -> Result<Image, LayoutError> {
        let format = image::guess_format(&data)?;
        let image = image::load_from_memory_with_format(&data, format)?;

        match (format, image.color()) {
            (image::ImageFormat::Jpeg, ColorType::Rgb8) => {
                // we can embed it directly!
                Ok(Image {
                    px_width: image.width(),
                    px_height: image.height(),
                    kind: ImageKind::Jpeg(data),
                })
            }
            _ => Ok(Self::new_raster(image)),
        }
    }

    pub fn new_raster(image: DynamicImage) -> Image {
        Image {
            px_width: image.width(),
            px_height: image.height(),
            kind: ImageKind::Raster(image),
        }
    }

    pub fn px_width(&self) -> u32 {
        self.px_width
    }

    pub fn px_height(&self) -> u32 {
        self.px_height
    }

    /// The size this image prints at [ASSUMED_IMAGE_DPI].
    pub fn natural_dim(&self) -> Dim {
        Dim {
            width: Pt(self.px_width as f32 * IMAGE_SCALE),
            height: Pt(self.px_height as f32 * IMAGE_SCALE),
        }
    }

    fn encode_raster(&self) -> EncodeOutput {
        match &self.kind {
            ImageKind::Jpeg(bytes) => EncodeOutput {
                filter: Filter::DctDecode,
                bytes: bytes.clone(),
                mask: None,
            },
            ImageKind::Raster(image) => {
                use image::GenericImageView;
                let level = CompressionLevel::DefaultLevel as u8;

                let mask = image.color().has_alpha().then(|| {
                    let alphas: Vec<_> = image.pixels().map(|p| (p.2).0[3]).collect();
                    compress_to_vec_zlib(&alphas, level)
                });

                let bytes = compress_to_vec_zlib(image.to_rgb8().as_raw(), level);

                EncodeOutput {
                    filter: Filter::FlateDecode,
                    bytes,
                    mask,
                }
            }
        }
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, image_index: usize, writer: &mut Pdf) {
        let id = refs.gen(RefType::Image(image_index));

        let encoded = self.encode_raster();

        let mut image = writer.image_xobject(id, encoded.bytes.as_slice());
        image.filter(encoded.filter);
        image.width(self.px_width as i32);
        image.height(self.px_height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);

        let mask_id = encoded
            .mask
            .as_ref()
            .map(|_| refs.gen(RefType::ImageMask(image_index)));
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }

        image.finish();

        // add a transparency mask if we have one
        if let Some(mask_id) = mask_id {
            let mut s_mask =
                writer.image_xobject(mask_id, encoded.mask.as_ref().unwrap().as_slice());
            s_mask.width(self.px_width as i32);
            s_mask.height(self.px_height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(8);
        }
    }
}

/// An image and the document-unit size to draw it at. The same underlying
/// [Image] may appear in any number of `ScaledImage`s; only the position and
/// scale are repeated in the document.
#[derive(Clone)]
pub struct ScaledImage {
    pub image: Rc<Image>,
    pub dim: Dim,
}

impl ScaledImage {
    /// Scale the image to its natural size at 300dpi.
    pub fn new(image: Rc<Image>) -> ScaledImage {
        let dim = image.natural_dim();
        ScaledImage { image, dim }
    }

    pub fn with_dim(image: Rc<Image>, dim: Dim) -> ScaledImage {
        ScaledImage { image, dim }
    }

    pub fn wrap(&self) -> WrappedImage {
        WrappedImage {
            image: self.image.clone(),
            dim: self.dim,
        }
    }
}

/// An image fixed at a size, ready to render. Sits on the text baseline, so
/// its ascent is its full height.
#[derive(Clone)]
pub struct WrappedImage {
    pub image: Rc<Image>,
    pub dim: Dim,
}

impl WrappedImage {
    pub fn ascent(&self) -> Pt {
        self.dim.height
    }

    pub(crate) fn render(
        &self,
        lp: &mut dyn RenderTarget,
        top_left: Coord,
        really_render: bool,
    ) -> DimAndPageNums {
        lp.draw_image(top_left.minus_y(self.dim.height), self, really_render)
            .dim_and_pages_from_width(self.dim.width)
    }
}
