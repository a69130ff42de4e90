pub mod render;

pub use render::{FrameStats, RenderTimes, Scene, SceneRenderer, Sprite};
