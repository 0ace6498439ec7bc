//! Data models for the band site
//!
//! Stored entities plus the shapes returned for external services.

mod playlist;
mod show;
mod spotify;
mod text;
mod user;

pub use playlist::{Playlist, PlaylistRef, PlaylistSource};
pub use show::{partition_shows, Show};
pub use spotify::{Album, AlbumCover, AlbumImages, ArtistRef, PlaylistDetails, SpotifyToken, Track};
pub use text::TextBlock;
pub use user::{PublicUser, User, UserPayload};
