mod feature;
mod geojson;
mod geometry_type;
mod properties;
mod value;

pub use feature::*;
pub use geojson::*;
pub use geometry_type::*;
pub use properties::*;
pub use value::*;
