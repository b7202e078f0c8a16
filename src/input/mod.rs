//! Player input as the engine sees it: symbols already normalised and
//! bound to concepts by the input layer.

pub mod buffer;

pub use buffer::{EventSeq, InputEvent, InputSequenceBuffer, InputWindow};
