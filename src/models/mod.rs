pub mod enums;
pub mod evidence;
pub mod profile;
pub mod summary;

pub use enums::*;
pub use evidence::*;
pub use profile::*;
pub use summary::*;
