//! Client-side controllers for the bulletin board.
//!
//! Every controller is built from a shared [`RemoteHandle`], a [`SessionWatch`]
//! fed by [`Session`], and a [`Notifier`] for user-visible messages.

pub mod account;
pub mod composer;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod login;
pub mod notice;
pub mod profile;
pub mod reaction;
pub mod remote;
pub mod replies;
pub mod session;
pub mod sse;
pub mod task;
pub mod types;

pub use account::{AccountStatus, AccountView};
pub use composer::{ComposerForm, PostComposer};
pub use config::{ClientConfig, MergePolicy};
pub use error::{ClientError, ClientResult};
pub use feed::FeedController;
pub use http::HttpRemote;
pub use login::{AuthForm, AuthMode};
pub use notice::{Confirm, Notice, NoticeLevel, Notifier};
pub use profile::{ProfilePage, ProfileStatus};
pub use reaction::{ReactionCommand, ReactionControl, ReactionKind};
pub use remote::{PostInsertStream, Remote, RemoteHandle};
pub use replies::ReplyThread;
pub use session::{Session, SessionSnapshot, SessionWatch};
pub use task::Subscription;
pub use types::{
    CategoryFilter, FeedQuery, LoadState, NewPost, NewReply, Post, PostRow, Profile, Reply,
    SessionUser, ANONYMOUS_NAME,
};
