mod create_picture;
mod helpers;
