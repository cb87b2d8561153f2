use std::path::PathBuf;

use crate::geometry::RectF;

#[derive(Debug, thiserror::Error)]
pub enum RingError {
    #[error("arc bounds {0:?} have no area")]
    DegenerateArc(RectF),
    #[error("`{0}` is not an RRGGBB color")]
    InvalidColor(String),
    #[error("failed to read font file {path}")]
    FontIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("font data is not a valid TrueType/OpenType font")]
    InvalidFont,
    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error(transparent)]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Pixels(#[from] pixels::Error),
}
