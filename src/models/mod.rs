pub mod bookmark;
pub mod category;
pub mod like;
pub mod post;
pub mod post_with_profile;
pub mod profile;
pub mod reply;
pub mod reply_with_profile;
pub mod user;

pub use bookmark::Entity as Bookmark;
pub use category::Category;
pub use like::Entity as Like;
pub use post::{Entity as Post, Model as PostModel};
pub use post_with_profile::{Entity as PostWithProfile, Model as PostWithProfileModel};
pub use profile::{Entity as Profile, Model as ProfileModel};
pub use reply::{Entity as Reply, Model as ReplyModel};
pub use reply_with_profile::{Entity as ReplyWithProfile, Model as ReplyWithProfileModel};
pub use user::{Entity as User, Model as UserModel};
