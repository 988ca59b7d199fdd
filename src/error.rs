use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("dimensions must be non-negative, got {width} x {height}")]
    InvalidDimensions { width: f32, height: f32 },

    #[error("padding values must be non-negative")]
    InvalidPadding,

    #[error("line thickness must be non-negative, got {0}")]
    InvalidLineThickness(f32),

    #[error("cell width must be non-negative, got {0}")]
    InvalidCellWidth(f32),

    #[error("wrapping width must be positive for non-empty content, got {0}")]
    InvalidWrapWidth(f32),

    #[error("page body must have positive dimensions, got {width} x {height}")]
    DegenerateBody { width: f32, height: f32 },

    #[error("the table only has {widths} column widths and the row already has that many cells")]
    TooManyCells { widths: usize },

    #[error("tried to add a text cell without a default text style")]
    MissingTextStyle,

    #[error("text was drawn with a font that was never added to the document")]
    UnregisteredFont,

    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// [image] failed to parse the image
    Image(#[from] image::ImageError),
}
