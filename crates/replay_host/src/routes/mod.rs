pub mod clips;
pub mod health;
pub mod media;
pub mod timeline;
