pub mod display_list;
pub mod grid;
pub mod hit;
pub mod paint;
pub mod scene;
pub mod sketch;
pub mod surface;

pub use display_list::{DisplayList, DrawCmd};
pub use grid::{GridLine, GridLineKind, MIN_TILE_SIZE, draw_grid_from_rect, grid_lines, is_drawable};
pub use hit::{PointHit, hit_handle, hit_pose_point, hit_square};
pub use paint::{RenderReport, RenderState, composite};
pub use scene::SceneSurface;
pub use sketch::{FilterError, SketchCache, pencil_sketch};
pub use surface::{DrawSurface, Rgba, StrokeStyle};
