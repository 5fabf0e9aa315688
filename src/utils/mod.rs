pub mod color;
pub mod url;

pub use color::{HslColor, color_for_domain};
pub use url::UrlUtils;
