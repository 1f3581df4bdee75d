pub mod action;
pub mod canvas;
pub mod page;

pub use action::{Color, DrawingAction, Point, ShapeTool, StrokeTool};
pub use canvas::Canvas;
pub use page::Page;
