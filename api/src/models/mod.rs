pub mod category;
pub mod poster;

pub use category::{Category, UnknownCategory};
pub use poster::{NewPoster, Poster, PosterChanges};
