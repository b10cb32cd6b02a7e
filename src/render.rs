pub mod headless;
pub mod layers;
pub mod markers;
pub mod surface;

pub use self::headless::HeadlessSurface;
pub use self::layers::LayerBindings;
pub use self::markers::MarkerRegistry;
pub use self::surface::{
    Cursor, LayerHit, LayerSpec, LayerType, MapEvent, MapSurface, MarkerHandle, MarkerSpec,
    ScreenPoint,
};
