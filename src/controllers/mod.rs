pub mod create_picture;
pub mod create_user;
pub mod delete_user;
pub mod embed_image;
pub mod get_user;
pub mod health_check;

pub use create_picture::*;
pub use create_user::*;
pub use delete_user::*;
pub use embed_image::*;
pub use get_user::*;
pub use health_check::*;
