pub mod logging;
pub mod mask;
pub mod scroll;
pub mod url;
