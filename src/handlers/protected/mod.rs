// Routes behind the session middleware. Every handler may take
// `Extension<Principal>` for the signed-in operator.
pub mod blocks;
pub mod cities;
pub mod hostels;
pub mod organisations;
pub mod profiles;
pub mod room_components;
pub mod room_types;
pub mod scope;
pub mod upload;

pub use upload::delete as upload_delete;
pub use upload::post as upload_post;
